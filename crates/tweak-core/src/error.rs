use std::io;
use std::path::PathBuf;

/// Errors surfaced by command dispatch, configuration and file handling.
///
/// Most commands cannot fail: out-of-range offsets are clamped and empty
/// selection sets turn a command into a no-op. What remains is I/O, bad
/// configuration, and commands that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    SerializeConfig(#[from] toml::ser::Error),

    #[error("invalid command: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("invalid value for {name}: {value}")]
    InvalidSettingValue { name: String, value: String },

    #[error("no active view")]
    NoActiveView,

    #[error("view has no file path")]
    NoFilePath,

    #[error("{0} has unsaved changes")]
    Unsaved(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

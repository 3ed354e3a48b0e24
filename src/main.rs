// SPDX-License-Identifier: MIT
//
// tweak — run editor commands against files from the command line.
//
// The binary wires tweak-core's in-memory host to a small CLI:
//
//   tweak run FILE --sel 4:9 --command JSON   → load FILE into a view, run
//                                               commands, print selections
//   tweak complete TEXT --caret N             → "Where:" field completions
//   tweak font-size increase|decrease         → step a font size in settings
//
// Settings flow:
//
//   settings.toml → Settings::load → --set overrides → Window
//                                                    ↓
//   settings.toml ← syntax settings ← settings_changed()
//
// Overrides given with --set apply to this run only. When a command
// changes font sizes or syntax extensions, those are merged into the file
// as it is on disk.

mod logging;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use tweak_core::Command;
use tweak_core::commands::{self, font_size};
use tweak_core::host::{Element, TextView};
use tweak_core::location;
use tweak_core::region::Region;
use tweak_core::settings::Settings;
use tweak_core::view::View;
use tweak_core::window::{ProjectFolder, Window};

// ─── CLI ────────────────────────────────────────────────────────────────────

/// Small editor commands, run from the shell.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/tweak/settings.toml).
    #[arg(long, global = true, env = "TWEAK_CONFIG")]
    config: Option<PathBuf>,

    /// Override a setting for this run: `key=value`, `key`, `nokey`, `key!`.
    #[arg(long = "set", global = true, value_name = "SETTING")]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Load a file and run commands on it.
    Run {
        file: PathBuf,

        /// Selection as `A` (caret) or `A:B` (anchor:active), in chars.
        #[arg(long = "sel", value_name = "A[:B]")]
        selections: Vec<String>,

        /// Command as `{"command": ..., "args": ...}`. Repeat to run several.
        #[arg(long = "command", value_name = "JSON", required = true)]
        invocations: Vec<String>,

        /// Print the buffer after the commands ran.
        #[arg(long)]
        print: bool,

        /// Save the buffer back to the file.
        #[arg(long)]
        write: bool,
    },

    /// List completions for a find-in-files location field.
    Complete {
        text: String,

        /// Caret offset in chars (defaults to the end of the text).
        #[arg(long)]
        caret: Option<usize>,

        /// Project folder. Repeat for several.
        #[arg(long = "folder", value_name = "DIR")]
        folders: Vec<PathBuf>,
    },

    /// Step the font size, per syntax when one is given.
    FontSize {
        step: Step,

        #[arg(long)]
        syntax: Option<String>,

        /// Write the syntax size even if the syntax has none yet.
        #[arg(long, requires = "syntax")]
        syntax_only: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Step {
    Increase,
    Decrease,
}

impl From<Step> for font_size::FontStep {
    fn from(step: Step) -> Self {
        match step {
            Step::Increase => Self::Increase,
            Step::Decrease => Self::Decrease,
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("tweak: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.or_else(Settings::default_path);
    let mut settings = match &config {
        Some(path) => Settings::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Settings::default(),
    };
    for arg in &cli.overrides {
        settings
            .apply_overrides(arg)
            .with_context(|| format!("--set {arg}"))?;
    }

    let mut window = Window::new(settings);
    match cli.command {
        Cmd::Run {
            file,
            selections,
            invocations,
            print,
            write,
        } => run_commands(&mut window, &file, &selections, &invocations, print, write)?,
        Cmd::Complete { text, caret, folders } => complete(&mut window, &text, caret, folders),
        Cmd::FontSize {
            step,
            syntax,
            syntax_only,
        } => {
            let size = font_size::change_font_size(
                window.settings_mut(),
                syntax.as_deref(),
                syntax_only,
                step.into(),
            );
            match size {
                Some(size) => {
                    window.mark_settings_changed();
                    println!("{size}");
                }
                None => println!("{}", current_size(window.settings(), syntax.as_deref())),
            }
        }
    }

    if window.settings_changed() {
        let Some(path) = config else {
            bail!("no settings file to save to; pass --config");
        };
        persist_syntax_settings(&path, window.settings())?;
    }
    Ok(())
}

// ─── Subcommands ────────────────────────────────────────────────────────────

fn run_commands(
    window: &mut Window,
    file: &Path,
    selections: &[String],
    invocations: &[String],
    print: bool,
    write: bool,
) -> Result<()> {
    let spec = file.to_string_lossy();
    let index = window
        .open_file(&spec, false)
        .with_context(|| format!("opening {}", file.display()))?;

    if !selections.is_empty() {
        let regions = selections
            .iter()
            .map(|s| parse_selection(s))
            .collect::<Result<Vec<_>>>()?;
        if let Some(view) = window.view_mut(index) {
            view.sel_mut().set(regions);
        }
    }

    for json in invocations {
        let command = Command::from_json(json).with_context(|| format!("parsing {json}"))?;
        commands::run(window, &command).with_context(|| format!("running {}", command.name()))?;
    }

    if write {
        let index = window
            .active_index()
            .context("no view left to save")?;
        window.save_view(index).context("saving")?;
    }

    if let Some(message) = window.status_message() {
        eprintln!("{message}");
    }
    if let Some(view) = window.active_view() {
        for sel in view.sel().iter() {
            println!("{}", format_selection(sel));
        }
        if print {
            print!("{}", view.buffer().contents());
        }
    }
    Ok(())
}

fn complete(window: &mut Window, text: &str, caret: Option<usize>, folders: Vec<PathBuf>) {
    for folder in folders {
        window.add_folder(ProjectFolder::new(folder));
    }
    let view = View::from_text(text)
        .with_element(Element::LocationInput)
        .with_settings(window.settings().clone());
    let caret = caret.unwrap_or_else(|| view.size());

    let Some(list) = location::query_completions(&view, &window.location_context(), caret) else {
        tracing::info!("no completions");
        return;
    };
    for item in &list.items {
        println!("{}\t{}\t{}", item.trigger, item.kind.label(), item.details);
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// `A` is a caret, `A:B` a selection from anchor `A` to active end `B`.
fn parse_selection(s: &str) -> Result<Region> {
    let parse = |n: &str| {
        n.trim()
            .parse::<usize>()
            .with_context(|| format!("invalid selection offset {n:?}"))
    };
    match s.split_once(':') {
        Some((a, b)) => Ok(Region::new(parse(a)?, parse(b)?)),
        None => Ok(Region::point(parse(s)?)),
    }
}

fn format_selection(sel: Region) -> String {
    if sel.is_empty() {
        sel.b.to_string()
    } else {
        format!("{}:{}", sel.a, sel.b)
    }
}

fn current_size(settings: &Settings, syntax: Option<&str>) -> u32 {
    syntax
        .and_then(|s| settings.syntax(s))
        .and_then(|s| s.font_size)
        .unwrap_or(settings.font_size)
}

/// Write font sizes and syntax extensions from `changed` into the settings
/// file, leaving every other key as it is on disk.
fn persist_syntax_settings(path: &Path, changed: &Settings) -> Result<()> {
    let mut on_disk = Settings::load(path).with_context(|| format!("loading {}", path.display()))?;
    on_disk.font_size = changed.font_size;
    for (name, syntax) in &changed.syntax {
        let entry = on_disk.syntax_mut(name);
        entry.font_size = syntax.font_size;
        entry.extensions.clone_from(&syntax.extensions);
    }
    on_disk
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved settings");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn cli_parses_run() {
        let cli = Cli::try_parse_from([
            "tweak",
            "--set",
            "translate_tabs_to_spaces",
            "run",
            "notes.txt",
            "--sel",
            "3",
            "--sel",
            "4:9",
            "--command",
            r#"{"command": "single_last_selection"}"#,
            "--print",
        ])
        .unwrap();

        assert_eq!(cli.overrides, ["translate_tabs_to_spaces"]);
        let Cmd::Run { file, selections, print, write, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(file, PathBuf::from("notes.txt"));
        assert_eq!(selections, ["3", "4:9"]);
        assert!(print);
        assert!(!write);
    }

    #[test]
    fn run_requires_a_command() {
        assert!(Cli::try_parse_from(["tweak", "run", "notes.txt"]).is_err());
    }

    #[test]
    fn selections_parse() {
        assert_eq!(parse_selection("7").unwrap(), Region::point(7));
        assert_eq!(parse_selection("9:4").unwrap(), Region::new(9, 4));
        assert!(parse_selection("x:4").is_err());
    }

    #[test]
    fn selections_format() {
        assert_eq!(format_selection(Region::point(3)), "3");
        assert_eq!(format_selection(Region::new(5, 2)), "5:2");
    }

    #[test]
    fn run_commands_edits_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "one\n\ntwo\n").unwrap();

        let mut window = Window::default();
        run_commands(
            &mut window,
            &path,
            &["0".into()],
            &[
                r#"{"command": "move_by_paragraph", "args": {"forward": true}}"#.into(),
                r#"{"command": "insert", "args": {"characters": "> "}}"#.into(),
            ],
            false,
            true,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\n\n> two\n");
    }

    #[test]
    fn syntax_settings_merge_into_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "tab_size = 2\n").unwrap();

        let mut changed = Settings::load(&path).unwrap();
        changed.tab_size = 8;
        font_size::change_font_size(&mut changed, Some("Rust"), true, font_size::FontStep::Increase);
        changed.syntax_mut("Rust").extensions = vec!["rs".into()];
        persist_syntax_settings(&path, &changed).unwrap();

        let saved = Settings::load(&path).unwrap();
        assert_eq!(saved.tab_size, 2);
        assert_eq!(saved.syntax("Rust").unwrap().font_size, Some(11));
        assert_eq!(saved.syntax("Rust").unwrap().extensions, ["rs"]);
    }
}

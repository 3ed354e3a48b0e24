// SPDX-License-Identifier: MIT
//
// Logging setup: a fmt subscriber on stderr, so stdout stays free for
// command output.
//
// Filter priority:
//
//   TWEAK_LOG  → a bare level ("debug") applies to the tweak crates only;
//                anything with '=', ':' or ',' is used as a full directive
//   RUST_LOG   → used as-is
//   default    → "warn"

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call twice; the second call is a
/// no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive(
            env::var("TWEAK_LOG").ok(),
            env::var("RUST_LOG").ok(),
        )))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn directive(tweak_log: Option<String>, rust_log: Option<String>) -> String {
    match (tweak_log, rust_log) {
        (Some(level), _) if level.contains(['=', ':', ',']) => level,
        (Some(level), _) => format!("warn,tweak={level},tweak_core={level}"),
        (None, Some(rust_log)) => rust_log,
        (None, None) => "warn".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_level_targets_tweak_crates() {
        assert_eq!(
            directive(Some("debug".into()), Some("trace".into())),
            "warn,tweak=debug,tweak_core=debug"
        );
    }

    #[test]
    fn full_directives_pass_through() {
        assert_eq!(
            directive(Some("tweak_core::paragraph=trace".into()), None),
            "tweak_core::paragraph=trace"
        );
        assert_eq!(directive(None, Some("info".into())), "info");
        assert_eq!(directive(None, None), "warn");
    }
}

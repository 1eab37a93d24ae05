//! Logging setup
//!
//! Configure console output via the RUST_LOG environment variable, or pass
//! `--verbose` for per-mod detail:
//! - `RUST_LOG=debug` - per-mod and per-entry decisions
//! - `RUST_LOG=keybinder::scanner=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are also written to `~/.config/keybinder/logs/keybinder.log` with daily
//! rotation, always at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default console filter when `RUST_LOG` is unset
pub fn console_directive(verbose: bool) -> &'static str {
    if verbose {
        "keybinder=debug,info"
    } else {
        "info"
    }
}

/// Initialize tracing subscriber with console and file logging
///
/// The console shows plain run messages; targets and line numbers only go to
/// the log file.
pub fn init(verbose: bool) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(verbose)));

    let console_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "keybinder.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_directives_parse() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(console_directive(verbose)).is_ok());
        }
        assert!(console_directive(true).contains("keybinder=debug"));
    }
}

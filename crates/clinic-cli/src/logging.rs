//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,clinic=debug";

/// Filter used when `RUST_LOG` is unset and `--verbose` is given.
pub const VERBOSE_FILTER: &str = "debug,sqlx=info,hyper=info";

/// Chooses the filter directives: `RUST_LOG` wins, then `--verbose`.
pub fn filter_directives(rust_log: Option<String>, verbose: bool) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Installs the global fmt subscriber.
pub fn init(verbose: bool) {
    let directives = filter_directives(std::env::var("RUST_LOG").ok(), verbose);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directives}': {e}; using '{DEFAULT_FILTER}'");
        EnvFilter::new(DEFAULT_FILTER)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

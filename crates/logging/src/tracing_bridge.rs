use tracing_subscriber::EnvFilter;

use crate::VerbosityConfig;

/// Builds the event filter for `config`.
///
/// A non-empty `rust_log` value (normally the `RUST_LOG` environment
/// variable) takes precedence. Invalid `rust_log` directives fall back to the
/// configured verbosity instead of silencing output.
#[must_use]
pub fn build_filter(config: &VerbosityConfig, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|value| !value.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::new(config.directive())
}

/// Installs the global `fmt` subscriber writing to stderr.
///
/// Returns `false` when a global subscriber was already installed, which
/// makes repeated calls (tests, embedded use) harmless.
pub fn init_tracing(config: &VerbosityConfig) -> bool {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(config, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi())
        .with_target(config.verbosity() >= crate::Verbosity::Verbose)
        .without_time()
        .try_init()
        .is_ok()
}

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter, e.g. `FOLDERSORT_LOG=debug`.
pub const LOG_ENV_VAR: &str = "FOLDERSORT_LOG";

/// Maps the number of `-v` flags to a default filter.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// the human-readable output on stdout.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

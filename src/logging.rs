//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `tracing` subscriber filtered by `filter`.
///
/// Falls back to the default level when the directive does not parse, and
/// leaves an already-installed subscriber in place.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|error| {
        eprintln!("invalid log filter '{filter}': {error}");
        EnvFilter::new(crate::config::DEFAULT_LOG_FILTER)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn repeated_init_is_harmless() {
        init("sage_chat=debug");
        init("not a [valid filter");
        tracing::debug!("logging initialized twice");
    }
}

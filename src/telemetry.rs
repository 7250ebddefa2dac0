use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber. RUST_LOG wins over the configured
/// default filter. Logs go to stderr: stdout carries protocol frames.
pub fn init(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

use tracing_subscriber::EnvFilter;

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Human-readable logs for the long-running server.
pub fn init(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(log_level))
        .init();
}

/// One JSON object per line, for function platforms that collect stdout.
pub fn init_json(log_level: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(log_level))
        .without_time()
        .init();
}

// src/logging.rs

use tracing_subscriber::EnvFilter;

// Installs the global subscriber on stderr. Level comes from RUST_LOG, INFO otherwise.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

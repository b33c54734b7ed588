#![cfg(not(tarpaulin_include))]

use dashboard::app;
use dashboard::config::Config;

/// Main entry point for the dashboard server
///
/// Reads its configuration from the environment (`PG_CONN`, `MAX_CONNS`,
/// `TIMEOUT`, `VIEWS_DIR`, `BIND_ADDR`, ...) and serves table and chart
/// fragments until stopped. Log output is controlled through `RUST_LOG`.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    app::run(config).await
}

use llamainsight::{logging, server, Config};
use tracing::error;

#[tokio::main]
async fn main() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    if let Err(e) = logging::init(&level) {
        eprintln!("{}", e);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

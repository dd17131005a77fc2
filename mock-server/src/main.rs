use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let latency_ms: u64 = std::env::var("MOCK_LATENCY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let config = mock_server::MockConfig {
        latency: Duration::from_millis(latency_ms),
        ..Default::default()
    };

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    mock_server::run_with(listener, mock_server::app_with(mock_server::Store::seeded(), config)).await
}

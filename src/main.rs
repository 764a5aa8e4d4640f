/// API сервер для очистки данных и генерации признаков

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use housing_prep::{api, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()
        .with_context(|| format!("Invalid {}", housing_prep::config::ADDR_ENV))?;

    let app = api::router();

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!("Server listening on http://{}", config.addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

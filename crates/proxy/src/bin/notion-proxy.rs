//! Notion proxy server binary.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use notion_proxy::{build_router, AppState, Config, NotionClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notion_proxy=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::default();

    let api_token = config
        .api_token
        .clone()
        .context("NOTION_API_TOKEN is not set")?;
    if config.parent_page_id.is_none() {
        warn!("NOTION_PAGE_ID is not set; database creation will be rejected");
    }

    let notion = NotionClient::new(&api_token)?;
    let app = build_router(AppState {
        config: config.clone(),
        notion,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Notion proxy listening");

    axum::serve(listener, app).await?;

    Ok(())
}

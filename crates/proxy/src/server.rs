//! HTTP server exposing the simplified database and page operations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::{require_id, NotionClient, Upstream};
use crate::config::Config;
use crate::error::ProxyError;
use crate::models::{CreateDatabaseRequest, PageFields};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// Upstream API client.
    pub notion: NotionClient,
}

impl IntoResponse for Upstream {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.body)).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/database", post(create_database))
        .route("/api/database/{database_id}", get(get_database))
        .route("/api/database/{database_id}/pages", post(list_pages))
        .route("/api/database/{database_id}/page", post(create_page))
        .route(
            "/api/database/{database_id}/page/{page_id}",
            patch(update_page),
        )
        .route(
            "/api/database/page/{page_id}",
            get(get_page).delete(archive_page),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn ready() -> impl IntoResponse {
    Json(json!({ "status": "ready" }))
}

async fn create_database(
    State(state): State<AppState>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Result<Upstream, ProxyError> {
    let name = request.name.unwrap_or_default();
    let parent_page_id = state
        .config
        .parent_page_id
        .as_deref()
        .ok_or_else(|| ProxyError::Configuration("NOTION_PAGE_ID is not set".to_string()))?;

    info!(%name, "creating database");
    state.notion.create_database(parent_page_id, &name).await
}

async fn get_database(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
) -> Result<Upstream, ProxyError> {
    state.notion.get_database(&database_id).await
}

async fn list_pages(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
) -> Result<Upstream, ProxyError> {
    state.notion.query_pages(&database_id).await
}

async fn create_page(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
    Json(fields): Json<PageFields>,
) -> Result<Upstream, ProxyError> {
    info!(%database_id, "creating page");
    state.notion.create_page(&database_id, fields).await
}

async fn get_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Response, ProxyError> {
    let envelope = state.notion.get_page(&page_id).await?;
    Ok(Json(envelope).into_response())
}

async fn update_page(
    State(state): State<AppState>,
    Path((database_id, page_id)): Path<(String, String)>,
    Json(fields): Json<PageFields>,
) -> Result<Upstream, ProxyError> {
    require_id("database ID", &database_id)?;

    info!(%database_id, %page_id, "updating page");
    let outcome = state.notion.update_page(&page_id, &fields).await?;
    Ok(outcome.patch)
}

async fn archive_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Upstream, ProxyError> {
    info!(%page_id, "archiving page");
    state.notion.archive_page(&page_id).await
}

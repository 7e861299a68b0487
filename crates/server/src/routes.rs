use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{BackendKind, SaveService};

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub save: Arc<SaveService>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Deserialize)]
pub struct SaveJsonRequest {
    #[serde(default)]
    pub filename: String,
    /// Absent and JSON `null` both land here as `None`; any other value,
    /// falsy ones included, is a valid payload.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub username: String,
}

async fn save_json(
    State(state): State<ServerState>,
    Json(req): Json<SaveJsonRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(data) = req.data else {
        return Err(ApiError::MissingFields);
    };
    if req.filename.trim().is_empty() {
        return Err(ApiError::MissingFields);
    }

    let outcome = state.save.save(&req.username, &req.filename, &data).await?;
    let message = match outcome.backend {
        BackendKind::Durable => format!(
            "File saved to the data directory. Removed {} old file(s).",
            outcome.removed
        ),
        BackendKind::Volatile => "File saved successfully (in-memory storage)".to_string(),
    };
    Ok(Json(json!({
        "success": true,
        "filename": outcome.filename,
        "savedTo": outcome.backend.as_str(),
        "message": message,
    })))
}

async fn get_saved_files(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    let listing = state.save.list_saved().await?;
    Ok(Json(json!({
        "success": true,
        "storage": listing.backend.as_str(),
        "files": listing.names,
        "count": listing.names.len(),
    })))
}

/// Build the full application router: static assets plus the JSON API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Public routes (static + health)
    let public = Router::new()
        .nest_service("/", static_dir)
        .route("/health", get(health));

    // Save API
    let api = Router::new()
        .route("/save-json", post(save_json))
        .route("/get-saved-files", get(get_saved_files));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

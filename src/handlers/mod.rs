/// Web API Handlers
///
/// This module contains the handlers for the public and admin API
/// endpoints. Each handler extracts what it needs from the request,
/// calls the store, the form normalizer or the upload pipeline, and
/// returns JSON.

mod listing_handlers;
mod note_handlers;
mod lead_handlers;
mod upload_handlers;
mod auth_handlers;
mod form_handlers;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

// Re-export all handlers
pub use listing_handlers::*;
pub use note_handlers::*;
pub use lead_handlers::*;
pub use upload_handlers::upload_images_handler;
pub use auth_handlers::*;
pub use form_handlers::*;

/// Handler for `GET /api/health`, naming the active store backend
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.store.backend_name(),
    }))
}

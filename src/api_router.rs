//! Combines the feature routers into the service's REST surface.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::shared::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "HealthDesk Support API" }))
}

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health))
        .merge(crate::tickets::configure_tickets_routes())
        .merge(crate::chat::configure_chat_routes())
}

//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{chat, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::root))
        .route("/chat", post(chat::chat_handler))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
}

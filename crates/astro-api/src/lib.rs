//! AstroGuide API - REST server
//!
//! Provides the `/chat` endpoint answering astronomy questions, plus
//! status, health and OpenAPI routes.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod testing;

use astro_core::{AppConfig, CompletionClient};
use axum::{middleware as axum_middleware, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "AstroGuide API", description = "Astronomy Q&A backend"),
    paths(handlers::health::root, handlers::chat::chat_handler),
    components(schemas(
        handlers::health::RootResponse,
        handlers::chat::ChatPayload,
        handlers::chat::ChatResponse,
        error::ApiError
    )),
    tags(
        (name = "chat", description = "Question answering"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Build the application router around shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = middleware::cors_layer(&state.config.server.cors_origins);

    Router::new()
        .merge(routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the router with an explicit completion client
pub fn create_router_with_client(config: AppConfig, client: Arc<dyn CompletionClient>) -> Router {
    create_router(Arc::new(AppState::new(config, client)))
}

/// Router backed by a mock client returning a fixed astronomy answer
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    create_router_with_client(
        AppConfig::default(),
        Arc::new(testing::MockCompletionClient::default()),
    )
}

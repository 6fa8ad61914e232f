//! HTTP routes for the messaging endpoint.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, post_message, MessageHandlers};

/// Creates the channel router.
pub fn message_routes(handlers: MessageHandlers) -> Router {
    Router::new()
        .route("/api/messages", post(post_message))
        .route("/health", get(health))
        .with_state(handlers)
}

//! HTTP adapters - The channel endpoint that feeds the dispatcher.
//!
//! The router is wrapped in request tracing and a per-request timeout. A
//! turn cut off by the timeout is dropped before its save, so the previous
//! durable state stays in place.

pub mod messages;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::Dispatcher;

pub use messages::{message_routes, MessageHandlers};

/// Builds the full application router.
pub fn app_router(dispatcher: Arc<Dispatcher>, request_timeout: Duration) -> Router {
    message_routes(MessageHandlers::new(dispatcher))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

//! HTTP adapter for the channel messaging endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, MessagesResponse};
pub use handlers::MessageHandlers;
pub use routes::message_routes;

//! HTTP handlers for the messaging endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::application::{DispatchError, Dispatcher, ProcessTurnCommand};
use crate::domain::dialog::Activity;
use crate::domain::foundation::{ConversationId, UserId, ValidationError};

use super::dto::{ErrorResponse, HealthResponse, MessagesResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MessageHandlers {
    dispatcher: Arc<Dispatcher>,
}

impl MessageHandlers {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/messages - Run one inbound activity as a turn
pub async fn post_message(
    State(handlers): State<MessageHandlers>,
    Json(activity): Json<Activity>,
) -> Response {
    if let Err(e) = check_addressing(&activity) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_activity(e.to_string())),
        )
            .into_response();
    }

    match handlers
        .dispatcher
        .handle(ProcessTurnCommand { activity })
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(MessagesResponse {
                activities: result.activities,
            }),
        )
            .into_response(),
        Err(e) => handle_dispatch_error(e),
    }
}

/// GET /health - Liveness check
pub async fn health(State(handlers): State<MessageHandlers>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active_conversations: handlers.dispatcher.active_conversations(),
    })
}

/// Both ids must be present and non-blank.
fn check_addressing(activity: &Activity) -> Result<(), ValidationError> {
    let conversation_id = activity
        .conversation_id
        .as_ref()
        .ok_or_else(|| ValidationError::empty_field("conversationId"))?;
    ConversationId::new(conversation_id.as_str())?;

    let from_id = activity
        .from_id
        .as_ref()
        .ok_or_else(|| ValidationError::empty_field("fromId"))?;
    UserId::new(from_id.as_str())?;
    Ok(())
}

fn handle_dispatch_error(error: DispatchError) -> Response {
    warn!(error = %error, "Rejected inbound activity");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(error.to_string())),
    )
        .into_response()
}

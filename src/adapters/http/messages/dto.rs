//! HTTP DTOs for the messaging endpoint.

use serde::Serialize;

use crate::domain::dialog::Activity;
use crate::domain::foundation::ErrorCode;

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Replies produced by one turn.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub activities: Vec<Activity>,
}

/// Liveness check body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_conversations: usize,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_activity(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidActivity.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

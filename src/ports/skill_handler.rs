//! Skill Handler Port - Interface for delegating turns to external skills.
//!
//! A skill is an independent conversational capability reached over the
//! network. While a skill frame is on the stack, every user message is
//! relayed to it, and its replies are relayed back to the user, until the
//! skill reports that it is done.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::dialog::Activity;
use crate::domain::foundation::{ConversationId, UserId};

/// What a skill is told about the current turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTurn {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub locale: String,
    pub activity: Activity,
}

/// A skill's answer to one relayed turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReply {
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// The skill has finished the conversation it was handed.
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl SkillReply {
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            activities: vec![Activity::message(text)],
            ..Default::default()
        }
    }

    pub fn finished(mut self) -> Self {
        self.done = true;
        self
    }
}

/// Port for external skill invocation
#[async_trait]
pub trait SkillHandler: Send + Sync {
    /// Start a skill on the turn that selected it.
    async fn begin(&self, skill_id: &str, turn: &SkillTurn) -> Result<SkillReply, SkillError>;

    /// Relay a follow-up turn to a skill that is already running.
    async fn continue_skill(
        &self,
        skill_id: &str,
        turn: &SkillTurn,
    ) -> Result<SkillReply, SkillError>;
}

/// Errors from a skill endpoint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("skill '{0}' is not configured")]
    UnknownSkill(String),

    #[error("skill unavailable: {0}")]
    Unavailable(String),

    #[error("skill timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("invalid skill response: {0}")]
    InvalidResponse(String),
}

impl SkillError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SkillError::Unavailable(_) | SkillError::Timeout { .. })
    }
}

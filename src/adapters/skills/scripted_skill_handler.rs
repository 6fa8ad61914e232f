//! Scripted Skill Handler for testing.
//!
//! Replies are queued per skill and consumed in order. When a skill's queue
//! is empty it echoes the user's text, which keeps relay loops observable
//! without scripting every turn.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::{SkillError, SkillHandler, SkillReply, SkillTurn};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCall {
    pub skill_id: String,
    pub operation: &'static str,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedSkillHandler {
    replies: Arc<Mutex<HashMap<String, VecDeque<Result<SkillReply, SkillError>>>>>,
    calls: Arc<Mutex<Vec<SkillCall>>>,
}

impl ScriptedSkillHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for `skill_id`.
    pub fn with_reply(self, skill_id: &str, reply: SkillReply) -> Self {
        self.push(skill_id, Ok(reply));
        self
    }

    /// Queues a failure for `skill_id`.
    pub fn with_error(self, skill_id: &str, error: SkillError) -> Self {
        self.push(skill_id, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<SkillCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, skill_id: &str, reply: Result<SkillReply, SkillError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(skill_id.to_string())
            .or_default()
            .push_back(reply);
    }

    fn answer(
        &self,
        skill_id: &str,
        operation: &'static str,
        turn: &SkillTurn,
    ) -> Result<SkillReply, SkillError> {
        let text = turn.activity.trimmed_text().map(str::to_string);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SkillCall {
                skill_id: skill_id.to_string(),
                operation,
                text: text.clone(),
            });

        let queued = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(skill_id)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(reply) => reply,
            None => Ok(SkillReply::say(format!(
                "[{}] {}",
                skill_id,
                text.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl SkillHandler for ScriptedSkillHandler {
    async fn begin(&self, skill_id: &str, turn: &SkillTurn) -> Result<SkillReply, SkillError> {
        self.answer(skill_id, "begin", turn)
    }

    async fn continue_skill(
        &self,
        skill_id: &str,
        turn: &SkillTurn,
    ) -> Result<SkillReply, SkillError> {
        self.answer(skill_id, "continue", turn)
    }
}

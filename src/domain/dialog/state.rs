//! Per-conversation state persisted between turns.

use serde::{Deserialize, Serialize};

use super::activity::Activity;
use super::instance::DialogStack;
use crate::domain::foundation::ActivityId;

/// Transient markers for the current turn. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnFlags {
    /// Name of the global command that interrupted this turn, if any.
    pub interrupted_by: Option<String>,
    /// The turn replayed earlier replies instead of producing new ones.
    pub replayed: bool,
}

/// Conversation-scoped state: the dialog stack plus the replay buffer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub dialog_stack: DialogStack,
    #[serde(default)]
    pub previous_outgoing_activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_id: Option<ActivityId>,
    #[serde(skip)]
    pub turn_flags: TurnFlags,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_turn(&mut self) {
        self.turn_flags = TurnFlags::default();
    }

    /// Replies to the last user message, ready to be resent.
    pub fn replayable_activities(&self) -> Vec<Activity> {
        self.previous_outgoing_activities
            .iter()
            .filter(|activity| {
                self.last_activity_id.is_some() && activity.reply_to_id == self.last_activity_id
            })
            .map(Activity::for_replay)
            .collect()
    }

    /// Folds this turn's outgoing messages into the replay buffer.
    ///
    /// Only activities replying to `activity_id` survive, so the buffer always
    /// holds the replies to the latest user message.
    pub fn record_outgoing(&mut self, activity_id: &ActivityId, sent: &[Activity]) {
        let mut merged = std::mem::take(&mut self.previous_outgoing_activities);
        merged.extend(sent.iter().filter(|a| a.is_message()).cloned());
        self.previous_outgoing_activities = merged
            .into_iter()
            .filter(|a| a.reply_to_id.as_ref() == Some(activity_id))
            .collect();
        self.last_activity_id = Some(activity_id.clone());
    }
}

//! Per-invocation turn context.

use chrono::{DateTime, Utc};

use super::activity::Activity;
use crate::domain::foundation::{ActivityId, ConversationId, UserId};
use crate::domain::interruption::Recognition;
use crate::domain::user::UserState;

/// The incoming activity, who it belongs to, and what the turn has sent.
///
/// User state is loaded before the turn and saved after it; steps mutate it
/// through `user_mut`.
#[derive(Debug, Clone)]
pub struct TurnContext {
    activity: Activity,
    activity_id: ActivityId,
    conversation_id: ConversationId,
    user_id: UserId,
    locale: String,
    received_at: DateTime<Utc>,
    user: UserState,
    recognition: Recognition,
    outbox: Vec<Activity>,
}

impl TurnContext {
    /// Builds a context; an inbound activity without an id gets one.
    pub fn new(
        mut activity: Activity,
        conversation_id: ConversationId,
        user_id: UserId,
        user: UserState,
        default_locale: &str,
    ) -> Self {
        let activity_id = activity
            .id
            .get_or_insert_with(ActivityId::generate)
            .clone();
        let locale = activity
            .locale
            .clone()
            .unwrap_or_else(|| default_locale.to_string());
        Self {
            activity,
            activity_id,
            conversation_id,
            user_id,
            locale,
            received_at: Utc::now(),
            user,
            recognition: Recognition::default(),
            outbox: Vec::new(),
        }
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn activity_id(&self) -> &ActivityId {
        &self.activity_id
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn text(&self) -> Option<&str> {
        self.activity.trimmed_text()
    }

    pub fn user(&self) -> &UserState {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut UserState {
        &mut self.user
    }

    pub fn into_user(self) -> UserState {
        self.user
    }

    pub fn recognition(&self) -> &Recognition {
        &self.recognition
    }

    pub fn set_recognition(&mut self, recognition: Recognition) {
        self.recognition = recognition;
    }

    /// Queues an activity as a reply to the incoming one.
    pub fn send(&mut self, mut activity: Activity) {
        if activity.id.is_none() {
            activity.id = Some(ActivityId::generate());
        }
        activity.reply_to_id = Some(self.activity_id.clone());
        self.outbox.push(activity);
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.send(Activity::message(text));
    }

    /// Queues previously sent activities unchanged.
    pub fn replay(&mut self, activities: Vec<Activity>) {
        self.outbox.extend(activities);
    }

    pub fn outbox(&self) -> &[Activity] {
        &self.outbox
    }

    /// Replaces everything queued so far, used when a turn fails.
    pub fn reset_outbox(&mut self, activities: Vec<Activity>) {
        self.outbox = activities;
    }

    pub fn take_outbox(&mut self) -> Vec<Activity> {
        std::mem::take(&mut self.outbox)
    }
}

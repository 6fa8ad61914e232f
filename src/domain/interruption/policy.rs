//! Decides whether a turn preempts the active dialog.
//!
//! The policy is pure: it sees the classifier results and the shape of the
//! top frame, and returns a verdict. The dispatcher applies the verdict.

use std::collections::BTreeMap;

use super::catalog::SkillCatalog;
use super::intents::{GlobalIntent, Recognition};

/// What the dispatcher should do instead of continuing the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interruption {
    /// Let the active dialog consume the message.
    None,
    /// Ask before leaving the active skill for another one.
    ConfirmSkillSwitch { skill_id: String },
    /// Clear the stack and start the root dialog again.
    Restart { intent: GlobalIntent },
    /// Revoke the credential, then restart.
    Logout,
    /// Send help and re-issue the pending prompt.
    Help,
    /// Send escalation details and re-issue the pending prompt.
    Escalate,
    /// Resend the replies to the last user message.
    Repeat,
    /// Push a dialog over the current stack.
    Shortcut {
        intent: GlobalIntent,
        dialog_id: String,
    },
}

impl Interruption {
    pub fn is_interrupted(&self) -> bool {
        !matches!(self, Interruption::None)
    }

    /// Label recorded in turn flags and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Interruption::None => "none",
            Interruption::ConfirmSkillSwitch { .. } => "skill_switch",
            Interruption::Restart { intent } if *intent == GlobalIntent::StartOver => "start_over",
            Interruption::Restart { .. } => "cancel",
            Interruption::Logout => "logout",
            Interruption::Help => "help",
            Interruption::Escalate => "escalate",
            Interruption::Repeat => "repeat",
            Interruption::Shortcut { .. } => "shortcut",
        }
    }
}

/// The top frame as the policy sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFrame {
    pub dialog_id: String,
    pub is_skill: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterruptionPolicy {
    skill_switch_threshold: f32,
    global_intent_threshold: f32,
    shortcuts: BTreeMap<GlobalIntent, String>,
}

impl InterruptionPolicy {
    pub fn new(skill_switch_threshold: f32, global_intent_threshold: f32) -> Self {
        Self {
            skill_switch_threshold,
            global_intent_threshold,
            shortcuts: BTreeMap::new(),
        }
    }

    /// Maps a global intent to a dialog pushed over the current stack.
    pub fn with_shortcut(mut self, intent: GlobalIntent, dialog_id: impl Into<String>) -> Self {
        self.shortcuts.insert(intent, dialog_id.into());
        self
    }

    pub fn skill_switch_threshold(&self) -> f32 {
        self.skill_switch_threshold
    }

    pub fn global_intent_threshold(&self) -> f32 {
        self.global_intent_threshold
    }

    /// Evaluates the rules in priority order.
    pub fn evaluate(
        &self,
        recognition: &Recognition,
        active: Option<&ActiveFrame>,
        skills: &SkillCatalog,
    ) -> Interruption {
        if let (Some(active), Some(dispatch)) = (active, recognition.dispatch.as_ref()) {
            if active.is_skill
                && dispatch.confidence > self.skill_switch_threshold
                && !dispatch.label.eq_ignore_ascii_case(&active.dialog_id)
            {
                if let Some(skill) = skills.get(&dispatch.label) {
                    return Interruption::ConfirmSkillSwitch {
                        skill_id: skill.id.clone(),
                    };
                }
            }
        }

        let Some((intent, confidence)) = recognition.general_intent() else {
            return Interruption::None;
        };
        if confidence <= self.global_intent_threshold {
            return Interruption::None;
        }

        let in_skill = active.is_some_and(|frame| frame.is_skill);
        match intent {
            GlobalIntent::Cancel | GlobalIntent::StartOver => Interruption::Restart { intent },
            GlobalIntent::Logout => Interruption::Logout,
            GlobalIntent::Help if in_skill => Interruption::None,
            GlobalIntent::Help => Interruption::Help,
            GlobalIntent::Escalate => Interruption::Escalate,
            GlobalIntent::Repeat => Interruption::Repeat,
            other => match self.shortcuts.get(&other) {
                Some(dialog_id) => Interruption::Shortcut {
                    intent: other,
                    dialog_id: dialog_id.clone(),
                },
                None => Interruption::None,
            },
        }
    }
}

impl Default for InterruptionPolicy {
    fn default() -> Self {
        Self::new(0.9, 0.5)
    }
}

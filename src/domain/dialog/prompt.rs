//! Prompts emitted on suspension and recognition of the answers to them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::activity::{Activity, InputHint};
use super::values::{FoundChoice, StepInput};

static AFFIRMATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "true", "of course",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["no", "n", "nope", "nah", "false", "no thanks", "not really"]
        .into_iter()
        .collect()
});

/// Shape of the answer a prompt expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptKind {
    /// Any non-empty text.
    Text,
    /// A yes/no answer.
    Confirm,
    /// One of a fixed list of choices.
    Choice {
        choices: Vec<String>,
        #[serde(default)]
        allow_free_text: bool,
    },
    /// Anything at all, including a child dialog's result.
    Open,
}

/// A prompt awaiting the user's next message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub id: String,
    pub kind: PromptKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<Activity>,
}

impl PromptSpec {
    pub fn text(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::with_kind(id, PromptKind::Text, Some(prompt.into()))
    }

    pub fn confirm(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::with_kind(id, PromptKind::Confirm, Some(prompt.into()))
    }

    /// Choice prompt; the choices are offered as suggested actions.
    pub fn choice(id: impl Into<String>, prompt: impl Into<String>, choices: &[&str]) -> Self {
        let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
        let mut spec = Self::with_kind(
            id,
            PromptKind::Choice {
                choices: choices.clone(),
                allow_free_text: false,
            },
            Some(prompt.into()),
        );
        if let Some(activity) = spec.prompt.take() {
            spec.prompt = Some(activity.with_suggested_actions(choices));
        }
        spec
    }

    /// Waits for any input without sending anything.
    pub fn open(id: impl Into<String>) -> Self {
        Self::with_kind(id, PromptKind::Open, None)
    }

    /// Waits for text without sending anything.
    pub fn silent_text(id: impl Into<String>) -> Self {
        Self::with_kind(id, PromptKind::Text, None)
    }

    fn with_kind(id: impl Into<String>, kind: PromptKind, prompt: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            prompt: prompt
                .map(|text| Activity::message(text).with_input_hint(InputHint::ExpectingInput)),
            retry: None,
        }
    }

    /// Choice prompts accepting unmatched text as a free-form answer.
    pub fn allowing_free_text(mut self) -> Self {
        if let PromptKind::Choice {
            allow_free_text, ..
        } = &mut self.kind
        {
            *allow_free_text = true;
        }
        self
    }

    pub fn with_retry(mut self, retry: impl Into<String>) -> Self {
        let mut activity = Activity::message(retry).with_input_hint(InputHint::ExpectingInput);
        if let PromptKind::Choice { choices, .. } = &self.kind {
            activity = activity.with_suggested_actions(choices.clone());
        }
        self.retry = Some(activity);
        self
    }

    /// Activity to send when the answer was not recognized.
    pub fn retry_activity(&self) -> Option<&Activity> {
        self.retry.as_ref().or(self.prompt.as_ref())
    }

    /// Whether a child dialog's result may be delivered to this prompt.
    pub fn accepts_child_result(&self) -> bool {
        matches!(self.kind, PromptKind::Open)
    }

    /// Maps the user's raw reply to a step input, `None` when unrecognized.
    pub fn recognize(&self, reply: &Activity) -> Option<StepInput> {
        let text = reply.trimmed_text();
        match &self.kind {
            PromptKind::Open => Some(StepInput::Text(text.unwrap_or_default().to_string())),
            PromptKind::Text => text.map(StepInput::text),
            PromptKind::Confirm => text.and_then(recognize_confirmation).map(StepInput::Confirmed),
            PromptKind::Choice {
                choices,
                allow_free_text,
            } => {
                let text = text?;
                match recognize_choice(text, choices) {
                    Some(found) => Some(StepInput::Choice(found)),
                    None if *allow_free_text => Some(StepInput::text(text)),
                    None => None,
                }
            }
        }
    }
}

/// Recognizes yes/no words and short phrases.
pub fn recognize_confirmation(text: &str) -> Option<bool> {
    let normalized = text
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();
    if AFFIRMATIVE.contains(normalized.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Matches the reply against choices by case-insensitive value or 1-based ordinal.
pub fn recognize_choice(text: &str, choices: &[String]) -> Option<FoundChoice> {
    let normalized = text.trim().to_lowercase();
    if let Some(index) = choices
        .iter()
        .position(|choice| choice.to_lowercase() == normalized)
    {
        return Some(FoundChoice {
            index,
            value: choices[index].clone(),
        });
    }
    normalized
        .parse::<usize>()
        .ok()
        .filter(|ordinal| (1..=choices.len()).contains(ordinal))
        .map(|ordinal| FoundChoice {
            index: ordinal - 1,
            value: choices[ordinal - 1].clone(),
        })
}

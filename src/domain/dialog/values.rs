//! Values flowing between steps and frames.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-frame scratch data.
///
/// Reads never fail: a missing key, or a key holding a value of another
/// shape, yields the type's default so counters can be accumulated from
/// their first use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepValues(BTreeMap<String, Value>);

impl StepValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `key` as `T`, falling back to `T::default()`.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).unwrap_or_default()
    }

    /// Reads `key` as `T` when present and well-shaped.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    pub fn count(&self, key: &str) -> u32 {
        self.get_or_default(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Adds one to the counter at `key` and returns the new value.
    pub fn increment(&mut self, key: &str) -> u32 {
        let next = self.count(key).saturating_add(1);
        self.insert(key, next);
        next
    }

    /// Subtracts one from the counter at `key`, stopping at zero.
    pub fn decrement(&mut self, key: &str) -> u32 {
        let next = self.count(key).saturating_sub(1);
        self.insert(key, next);
        next
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for StepValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A recognized answer to a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundChoice {
    pub index: usize,
    pub value: String,
}

/// Input handed to a step: the previous step's value, the user's recognized
/// answer, or the result of a child dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepInput {
    #[default]
    Empty,
    Text(String),
    Confirmed(bool),
    Choice(FoundChoice),
    Value(Value),
    Child(DialogResult),
}

impl StepInput {
    pub fn text(value: impl Into<String>) -> Self {
        StepInput::Text(value.into())
    }

    /// Text carried by the input, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StepInput::Text(text) => Some(text.as_str()),
            StepInput::Choice(choice) => Some(choice.value.as_str()),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&FoundChoice> {
        match self {
            StepInput::Choice(choice) => Some(choice),
            _ => None,
        }
    }

    pub fn as_confirmed(&self) -> Option<bool> {
        match self {
            StepInput::Confirmed(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_child(&self) -> Option<&DialogResult> {
        match self {
            StepInput::Child(result) => Some(result),
            _ => None,
        }
    }
}

/// Payload a frame hands to its parent when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DialogResult {
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    SkillUnavailable {
        skill_id: String,
        reason: String,
    },
    Failed {
        dialog_id: String,
        error: String,
    },
}

impl DialogResult {
    /// Completion with a null return value.
    pub fn empty() -> Self {
        DialogResult::Completed { value: None }
    }

    pub fn with_value(value: impl Into<Value>) -> Self {
        DialogResult::Completed {
            value: Some(value.into()),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            DialogResult::Completed { value } => value.as_ref(),
            _ => None,
        }
    }

    /// Reads a boolean flag from a completed object value.
    pub fn flag(&self, key: &str) -> bool {
        self.value()
            .and_then(|value| value.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

//! Classification results and the labels the engine understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which classifier model to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierModel {
    /// Top-level routing across skills, knowledge bases and the general model.
    Dispatch,
    /// Global commands such as cancel or help.
    General,
}

impl fmt::Display for ClassifierModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierModel::Dispatch => write!(f, "dispatch"),
            ClassifierModel::General => write!(f, "general"),
        }
    }
}

/// A label with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The "nothing matched" result.
    pub fn none() -> Self {
        Self::new("None", 0.0)
    }

    pub fn is_label(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }

    /// Parses the label as a global intent.
    pub fn intent(&self) -> GlobalIntent {
        self.label.parse().unwrap_or(GlobalIntent::None)
    }
}

/// Both classifier results for one turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recognition {
    pub dispatch: Option<Classification>,
    pub general: Option<Classification>,
}

impl Recognition {
    pub fn dispatch_label(&self) -> Option<&str> {
        self.dispatch.as_ref().map(|c| c.label.as_str())
    }

    pub fn general_intent(&self) -> Option<(GlobalIntent, f32)> {
        self.general.as_ref().map(|c| (c.intent(), c.confidence))
    }
}

/// Global commands recognized by the general model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlobalIntent {
    Cancel,
    Confirm,
    Reject,
    Escalate,
    Help,
    Logout,
    Repeat,
    StartOver,
    Stop,
    SwitchTopic,
    Stress,
    UpdateProfile,
    None,
}

impl GlobalIntent {
    pub const ALL: [GlobalIntent; 13] = [
        GlobalIntent::Cancel,
        GlobalIntent::Confirm,
        GlobalIntent::Reject,
        GlobalIntent::Escalate,
        GlobalIntent::Help,
        GlobalIntent::Logout,
        GlobalIntent::Repeat,
        GlobalIntent::StartOver,
        GlobalIntent::Stop,
        GlobalIntent::SwitchTopic,
        GlobalIntent::Stress,
        GlobalIntent::UpdateProfile,
        GlobalIntent::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalIntent::Cancel => "Cancel",
            GlobalIntent::Confirm => "Confirm",
            GlobalIntent::Reject => "Reject",
            GlobalIntent::Escalate => "Escalate",
            GlobalIntent::Help => "Help",
            GlobalIntent::Logout => "Logout",
            GlobalIntent::Repeat => "Repeat",
            GlobalIntent::StartOver => "StartOver",
            GlobalIntent::Stop => "Stop",
            GlobalIntent::SwitchTopic => "SwitchTopic",
            GlobalIntent::Stress => "Stress",
            GlobalIntent::UpdateProfile => "UpdateProfile",
            GlobalIntent::None => "None",
        }
    }
}

impl fmt::Display for GlobalIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GlobalIntent {
    type Err = String;

    /// Case-insensitive; underscores and spaces are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != ' ')
            .collect::<String>()
            .to_lowercase();
        GlobalIntent::ALL
            .into_iter()
            .find(|intent| intent.as_str().to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown global intent: {}", s))
    }
}

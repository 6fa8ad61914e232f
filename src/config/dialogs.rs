//! Dialog engine and concrete dialog settings

use serde::Deserialize;
use std::collections::BTreeMap;

use super::error::ValidationError;
use crate::application::DialogSettings;
use crate::domain::dialog::DEFAULT_MAX_STEPS_PER_TURN;

#[derive(Debug, Clone, Deserialize)]
pub struct DialogsConfig {
    /// Dialog begun when a conversation has nothing on its stack
    #[serde(default = "default_root")]
    pub root: String,

    /// Same-turn Next/Replace budget
    #[serde(default = "default_max_steps")]
    pub max_steps_per_turn: usize,

    #[serde(default = "default_refusal_limit")]
    pub refusal_limit: u32,

    #[serde(default = "default_max_showings")]
    pub max_showings: u32,

    #[serde(default = "default_trends_url")]
    pub trends_url: String,

    #[serde(default = "default_escalation_contact")]
    pub escalation_contact: String,

    /// Dispatch label → dialog id for free text at the main menu
    #[serde(default = "default_dispatch_routes")]
    pub dispatch_routes: BTreeMap<String, String>,
}

impl DialogsConfig {
    pub fn settings(&self) -> DialogSettings {
        DialogSettings {
            refusal_limit: self.refusal_limit,
            max_showings: self.max_showings,
            trends_url: self.trends_url.clone(),
            escalation_contact: self.escalation_contact.clone(),
            dispatch_routes: self.dispatch_routes.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.root.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DIALOGS__ROOT"));
        }
        if self.max_steps_per_turn == 0 {
            return Err(ValidationError::InvalidDialogLimit("max_steps_per_turn"));
        }
        if self.refusal_limit == 0 {
            return Err(ValidationError::InvalidDialogLimit("refusal_limit"));
        }
        if self.max_showings == 0 {
            return Err(ValidationError::InvalidDialogLimit("max_showings"));
        }
        Ok(())
    }
}

impl Default for DialogsConfig {
    fn default() -> Self {
        let settings = DialogSettings::default();
        Self {
            root: default_root(),
            max_steps_per_turn: default_max_steps(),
            refusal_limit: settings.refusal_limit,
            max_showings: settings.max_showings,
            trends_url: settings.trends_url,
            escalation_contact: settings.escalation_contact,
            dispatch_routes: settings.dispatch_routes,
        }
    }
}

fn default_root() -> String {
    "main".to_string()
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS_PER_TURN
}

fn default_refusal_limit() -> u32 {
    DialogSettings::default().refusal_limit
}

fn default_max_showings() -> u32 {
    DialogSettings::default().max_showings
}

fn default_trends_url() -> String {
    DialogSettings::default().trends_url
}

fn default_escalation_contact() -> String {
    DialogSettings::default().escalation_contact
}

fn default_dispatch_routes() -> BTreeMap<String, String> {
    DialogSettings::default().dispatch_routes
}

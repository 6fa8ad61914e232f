//! Interruption policy configuration

use serde::Deserialize;
use std::collections::BTreeMap;

use super::error::ValidationError;
use crate::domain::interruption::{GlobalIntent, InterruptionPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct InterruptionConfig {
    /// Dispatch confidence above which a different skill asks to take over
    #[serde(default = "default_skill_switch_threshold")]
    pub skill_switch_threshold: f32,

    /// General-model confidence above which a global command fires
    #[serde(default = "default_global_intent_threshold")]
    pub global_intent_threshold: f32,

    /// Global intent name → dialog pushed over the current stack
    #[serde(default = "default_shortcuts")]
    pub shortcuts: BTreeMap<String, String>,
}

impl InterruptionConfig {
    /// Builds the policy, rejecting unknown intent names.
    pub fn policy(&self) -> Result<InterruptionPolicy, ValidationError> {
        let mut policy =
            InterruptionPolicy::new(self.skill_switch_threshold, self.global_intent_threshold);
        for (intent, dialog_id) in &self.shortcuts {
            let parsed: GlobalIntent = intent
                .parse()
                .map_err(|_| ValidationError::UnknownIntent(intent.clone()))?;
            policy = policy.with_shortcut(parsed, dialog_id.clone());
        }
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.skill_switch_threshold) {
            return Err(ValidationError::InvalidThreshold("skill_switch_threshold"));
        }
        if !(0.0..=1.0).contains(&self.global_intent_threshold) {
            return Err(ValidationError::InvalidThreshold("global_intent_threshold"));
        }
        self.policy().map(|_| ())
    }
}

impl Default for InterruptionConfig {
    fn default() -> Self {
        Self {
            skill_switch_threshold: default_skill_switch_threshold(),
            global_intent_threshold: default_global_intent_threshold(),
            shortcuts: default_shortcuts(),
        }
    }
}

fn default_skill_switch_threshold() -> f32 {
    0.9
}

fn default_global_intent_threshold() -> f32 {
    0.5
}

fn default_shortcuts() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Stress".to_string(), "stress".to_string()),
        ("UpdateProfile".to_string(), "onboarding".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_builds() {
        let config = InterruptionConfig::default();
        let policy = config.policy().unwrap();
        assert_eq!(policy.skill_switch_threshold(), 0.9);
        assert_eq!(policy.global_intent_threshold(), 0.5);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = InterruptionConfig {
            global_intent_threshold: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidThreshold("global_intent_threshold"))
        );
    }

    #[test]
    fn test_unknown_shortcut_intent() {
        let config = InterruptionConfig {
            shortcuts: BTreeMap::from([("Dance".to_string(), "stress".to_string())]),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownIntent("Dance".to_string()))
        );
    }
}

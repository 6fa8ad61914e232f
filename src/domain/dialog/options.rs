//! Typed options handed to a dialog when it begins.

use serde::{Deserialize, Serialize};

/// How the onboarding dialog treats fields that are already known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingMode {
    /// Skip anything already on record.
    #[default]
    FirstRun,
    /// Re-ask every field; "none" keeps the current value.
    UpdateProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OnboardingOptions {
    #[serde(default)]
    pub mode: OnboardingMode,
}

/// Counters carried across `Replace` iterations of the content loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EntertainOptions {
    #[serde(default)]
    pub refusals: u32,
    #[serde(default)]
    pub showings: u32,
    #[serde(default)]
    pub content_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOptions {
    pub skill_id: String,
    /// Message to hand the skill on its first turn instead of the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSkillOptions {
    pub skill_id: String,
    pub skill_name: String,
    /// The message that triggered the switch, forwarded if it is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_text: Option<String>,
}

/// Options bag, one variant per dialog family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogOptions {
    #[default]
    None,
    Onboarding(OnboardingOptions),
    Entertain(EntertainOptions),
    Skill(SkillOptions),
    SwitchSkill(SwitchSkillOptions),
}

impl DialogOptions {
    /// Short name used in validation messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DialogOptions::None => "none",
            DialogOptions::Onboarding(_) => "onboarding",
            DialogOptions::Entertain(_) => "entertain",
            DialogOptions::Skill(_) => "skill",
            DialogOptions::SwitchSkill(_) => "switch_skill",
        }
    }

    pub fn onboarding(&self) -> OnboardingOptions {
        match self {
            DialogOptions::Onboarding(options) => *options,
            _ => OnboardingOptions::default(),
        }
    }

    pub fn entertain(&self) -> EntertainOptions {
        match self {
            DialogOptions::Entertain(options) => *options,
            _ => EntertainOptions::default(),
        }
    }
}

//! What the assistant knows about a user after onboarding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Interest lists collected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCategory {
    Reading,
    Music,
}

impl fmt::Display for InterestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestCategory::Reading => write!(f, "reading"),
            InterestCategory::Music => write!(f, "music"),
        }
    }
}

/// Therapist and data-sharing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub therapist_online: bool,
    #[serde(default)]
    pub therapist_preferences_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_radius_km: Option<u32>,
    #[serde(default)]
    pub share_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_period_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub interests: BTreeMap<InterestCategory, Vec<String>>,
    #[serde(default)]
    pub privacy_accepted: bool,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default = "default_new_user")]
    pub is_new_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_in_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_new_user() -> bool {
    true
}

impl Default for OnboardingRecord {
    fn default() -> Self {
        Self {
            name: None,
            interests: BTreeMap::new(),
            privacy_accepted: false,
            terms_accepted: false,
            is_new_user: default_new_user(),
            signed_in_user_id: None,
            location: None,
            preferences: Preferences::default(),
        }
    }
}

impl OnboardingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root dialog sends users through onboarding until this is false.
    pub fn needs_onboarding(&self) -> bool {
        self.is_new_user || !self.privacy_accepted
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    pub fn interests(&self, category: InterestCategory) -> &[String] {
        self.interests
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_interests(&self, category: InterestCategory) -> bool {
        !self.interests(category).is_empty()
    }

    pub fn set_interests(&mut self, category: InterestCategory, items: Vec<String>) {
        self.interests.insert(category, items);
    }

    pub fn append_interests(&mut self, category: InterestCategory, items: Vec<String>) {
        self.interests.entry(category).or_default().extend(items);
    }

    /// Marks onboarding finished. Returns true only on the first call.
    pub fn complete_onboarding(&mut self) -> bool {
        let was_new = self.is_new_user;
        self.is_new_user = false;
        was_new
    }
}

/// Splits a comma-separated answer, dropping blank entries.
pub fn parse_interest_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the user asked to keep the current value.
pub fn is_keep_current(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("none")
}

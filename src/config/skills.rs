//! External skill configuration

use secrecy::Secret;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::interruption::{SkillCatalog, SkillDescriptor};

#[derive(Debug, Clone, Deserialize)]
pub struct SkillsConfig {
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub catalog: Vec<SkillConfig>,
}

/// One externally hosted skill
#[derive(Debug, Clone, Deserialize)]
pub struct SkillConfig {
    /// Dialog id, also the dispatch label that selects the skill
    pub id: String,
    /// Name shown when asking to switch
    pub name: String,
    pub endpoint: String,
    pub api_key: Option<Secret<String>>,
    /// Phrases the keyword classifier maps to this skill
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SkillsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn skill_catalog(&self) -> SkillCatalog {
        SkillCatalog::new(
            self.catalog
                .iter()
                .map(|skill| SkillDescriptor {
                    id: skill.id.clone(),
                    name: skill.name.clone(),
                })
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 5 {
            return Err(ValidationError::TooManyRetries("skills"));
        }

        let mut seen = HashSet::new();
        for skill in &self.catalog {
            if skill.id.trim().is_empty() {
                return Err(ValidationError::MissingRequired("SKILLS__CATALOG__ID"));
            }
            if !seen.insert(skill.id.to_lowercase()) {
                return Err(ValidationError::DuplicateSkill(skill.id.clone()));
            }
            if !skill.endpoint.starts_with("http://") && !skill.endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidSkillEndpoint(skill.id.clone()));
            }
        }
        Ok(())
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            catalog: Vec::new(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: &str, endpoint: &str) -> SkillConfig {
        SkillConfig {
            id: id.to_string(),
            name: id.to_uppercase(),
            endpoint: endpoint.to_string(),
            api_key: None,
            keywords: vec![],
        }
    }

    #[test]
    fn test_catalog_mirrors_config() {
        let config = SkillsConfig {
            catalog: vec![skill("calendarSkill", "https://skills.example.com/calendar")],
            ..Default::default()
        };
        let catalog = config.skill_catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("calendarskill").unwrap().name, "CALENDARSKILL");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_skill_ids_rejected() {
        let config = SkillsConfig {
            catalog: vec![
                skill("calendarSkill", "https://a.example.com"),
                skill("CalendarSkill", "https://b.example.com"),
            ],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateSkill("CalendarSkill".to_string()))
        );
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let config = SkillsConfig {
            catalog: vec![skill("todoSkill", "ftp://todo")],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidSkillEndpoint("todoSkill".to_string()))
        );
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let mut config = skill("todoSkill", "https://todo.example.com");
        config.api_key = Some(Secret::new("super-secret".to_string()));
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}

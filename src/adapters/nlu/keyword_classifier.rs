//! Keyword NLU Classifier
//!
//! A rule-based stand-in for a hosted language-understanding service.
//! Matching is on normalized word sequences: an utterance that is exactly a
//! known phrase scores high, one that merely contains it scores at the
//! partial confidence, which by default does not clear the interruption
//! threshold.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::domain::interruption::{Classification, ClassifierModel, GlobalIntent};
use crate::ports::{NluClassifier, NluError};

/// Label the dispatch model gives utterances meant for the general model.
pub const GENERAL_LABEL: &str = "l_general";

/// Label for small talk.
pub const CHITCHAT_LABEL: &str = "q_chitchat";

const EXACT_CONFIDENCE: f32 = 0.95;

static INTENT_PHRASES: Lazy<Vec<(GlobalIntent, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (GlobalIntent::Cancel, &["cancel", "never mind", "nevermind", "forget it"][..]),
        (GlobalIntent::StartOver, &["start over", "restart", "main menu"][..]),
        (GlobalIntent::Help, &["help", "what can you do", "i need help"][..]),
        (
            GlobalIntent::Escalate,
            &["talk to a human", "talk to someone", "escalate", "get me a human"][..],
        ),
        (GlobalIntent::Logout, &["logout", "log out", "sign out", "signout"][..]),
        (GlobalIntent::Repeat, &["repeat", "say that again", "come again"][..]),
        (GlobalIntent::Stop, &["stop", "quit"][..]),
        (GlobalIntent::SwitchTopic, &["something else", "change topic"][..]),
        (
            GlobalIntent::Stress,
            &["i am stressed", "i'm stressed", "stressed", "i feel anxious", "overwhelmed"][..],
        ),
        (
            GlobalIntent::UpdateProfile,
            &["update profile", "update my profile", "change my profile"][..],
        ),
        (
            GlobalIntent::Confirm,
            &["sounds good", "yes please", "why not", "let's do it", "go ahead"][..],
        ),
        (GlobalIntent::Reject, &["no thanks", "not now", "maybe later"][..]),
    ]
});

static CHITCHAT_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "hi",
        "hello",
        "hey",
        "how are you",
        "good morning",
        "good evening",
        "thanks",
        "thank you",
        "who are you",
    ]
});

/// Lower-cases and replaces punctuation with spaces, collapsing runs.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    format!(" {} ", normalized).contains(&format!(" {} ", phrase))
}

/// Rule-based classifier for both models.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// Dispatch label → keywords, e.g. skill id → ["calendar", "meeting"].
    dispatch_keywords: BTreeMap<String, Vec<String>>,
    general_label: String,
    partial_confidence: f32,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            dispatch_keywords: BTreeMap::new(),
            general_label: GENERAL_LABEL.to_string(),
            partial_confidence: 0.5,
        }
    }

    /// Route utterances containing any of `keywords` to `label`.
    pub fn with_dispatch_keywords(
        mut self,
        label: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(&k.into()))
            .filter(|k| !k.is_empty())
            .collect();
        self.dispatch_keywords.insert(label.into(), keywords);
        self
    }

    pub fn with_general_label(mut self, label: impl Into<String>) -> Self {
        self.general_label = label.into();
        self
    }

    fn general(&self, normalized: &str) -> Classification {
        let mut best = Classification::none();
        for (intent, phrases) in INTENT_PHRASES.iter() {
            for phrase in phrases.iter() {
                let confidence = if normalized == *phrase {
                    EXACT_CONFIDENCE
                } else if contains_phrase(normalized, phrase) {
                    self.partial_confidence
                } else {
                    continue;
                };
                if confidence > best.confidence {
                    best = Classification::new(intent.as_str(), confidence);
                }
            }
        }
        best
    }

    fn dispatch(&self, normalized: &str) -> Classification {
        for (label, keywords) in &self.dispatch_keywords {
            if keywords.iter().any(|k| contains_phrase(normalized, k)) {
                return Classification::new(label.clone(), EXACT_CONFIDENCE);
            }
        }

        let general = self.general(normalized);
        if general.confidence > 0.0 {
            return Classification::new(self.general_label.clone(), general.confidence);
        }

        if CHITCHAT_PHRASES.iter().any(|p| normalized == *p) {
            return Classification::new(CHITCHAT_LABEL, 0.8);
        }
        Classification::none()
    }
}

#[async_trait]
impl NluClassifier for KeywordClassifier {
    async fn classify(
        &self,
        model: ClassifierModel,
        text: &str,
        _locale: &str,
    ) -> Result<Classification, NluError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Ok(Classification::none());
        }
        Ok(match model {
            ClassifierModel::Dispatch => self.dispatch(&normalized),
            ClassifierModel::General => self.general(&normalized),
        })
    }
}

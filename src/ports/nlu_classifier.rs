//! NLU Classifier Port - Interface for intent recognition.
//!
//! Two models are consulted per turn: the dispatch model labels which
//! capability a message belongs to, and the general model recognizes
//! global intents such as cancel or help. Both return a label with a
//! confidence in `0.0..=1.0`.

use async_trait::async_trait;

use crate::domain::interruption::{Classification, ClassifierModel};

/// Port for classifying a user utterance
#[async_trait]
pub trait NluClassifier: Send + Sync {
    /// Classify `text` with the given model.
    ///
    /// An utterance the model has nothing to say about yields a
    /// `Classification::none()` rather than an error.
    async fn classify(
        &self,
        model: ClassifierModel,
        text: &str,
        locale: &str,
    ) -> Result<Classification, NluError>;
}

/// Errors from an NLU backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NluError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("no {0} model configured")]
    ModelNotConfigured(ClassifierModel),
}

impl NluError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NluError::Unavailable(_) | NluError::Timeout { .. })
    }
}

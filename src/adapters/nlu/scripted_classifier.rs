//! Scripted NLU Classifier for testing.
//!
//! Answers are configured per model and utterance, so scenarios can pin
//! exact labels and confidences.
//!
//! # Features
//!
//! - Per-utterance answers (case-insensitive)
//! - Queued error injection for resilience testing
//! - Call tracking for verification

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::interruption::{Classification, ClassifierModel};
use crate::ports::{NluClassifier, NluError};

#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    answers: Arc<Mutex<HashMap<(ClassifierModel, String), Classification>>>,
    errors: Arc<Mutex<VecDeque<NluError>>>,
    calls: Arc<Mutex<Vec<(ClassifierModel, String)>>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `text` with `label` at `confidence` for `model`.
    pub fn with(
        self,
        model: ClassifierModel,
        text: &str,
        label: &str,
        confidence: f32,
    ) -> Self {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((model, text.to_lowercase()), Classification::new(label, confidence));
        self
    }

    /// Shorthand for a global intent: dispatch says general, general says `intent`.
    pub fn with_global(self, text: &str, general_label: &str, intent: &str, confidence: f32) -> Self {
        self.with(ClassifierModel::Dispatch, text, general_label, 0.9)
            .with(ClassifierModel::General, text, intent, confidence)
    }

    /// Fails the next call with `error`.
    pub fn with_error(self, error: NluError) -> Self {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
        self
    }

    pub fn calls(&self) -> Vec<(ClassifierModel, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl NluClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        model: ClassifierModel,
        text: &str,
        _locale: &str,
    ) -> Result<Classification, NluError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((model, text.to_string()));

        if let Some(error) = self
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return Err(error);
        }

        Ok(self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(model, text.trim().to_lowercase()))
            .cloned()
            .unwrap_or_else(Classification::none))
    }
}

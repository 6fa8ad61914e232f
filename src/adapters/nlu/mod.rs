//! NLU Adapters
//!
//! Implementations of the NluClassifier port.
//!
//! - **KeywordClassifier** - Rule-based phrase matching
//! - **ScriptedClassifier** - Fixed answers for tests

mod keyword_classifier;
mod scripted_classifier;

pub use keyword_classifier::{KeywordClassifier, CHITCHAT_LABEL, GENERAL_LABEL};
pub use scripted_classifier::ScriptedClassifier;

//! Interruption module - global commands that preempt the active dialog.

mod catalog;
mod intents;
mod policy;

pub use catalog::{SkillCatalog, SkillDescriptor};
pub use intents::{Classification, ClassifierModel, GlobalIntent, Recognition};
pub use policy::{ActiveFrame, Interruption, InterruptionPolicy};

//! Dialog module - the turn-based dialog engine.
//!
//! A conversation holds a stack of dialog frames. Each dialog is a fixed
//! list of steps; a step runs, then either continues, suspends on a prompt,
//! delegates to a child dialog, or completes. The stack and the frames on
//! it are plain data and are persisted between turns.
//!
//! # Key Types
//!
//! - `Dialog` - a registered multi-step flow
//! - `DialogStackManager` - begin / continue / replace / end / cancel
//! - `StepSequencer` - runs one frame's steps until it yields
//! - `TurnContext` - the incoming activity and the replies queued for it
//! - `ConversationState` - everything persisted per conversation

mod activity;
mod errors;
mod instance;
mod options;
mod prompt;
mod registry;
mod sequencer;
mod stack_manager;
mod state;
mod step;
mod turn;
mod values;

#[cfg(test)]
mod proptests;

pub use activity::{Activity, ActivityType, Attachment, InputHint};
pub use errors::DialogError;
pub use instance::{AwaitingPrompt, DialogInstance, DialogStack};
pub use options::{
    DialogOptions, EntertainOptions, OnboardingMode, OnboardingOptions, SkillOptions,
    SwitchSkillOptions,
};
pub use prompt::{recognize_choice, recognize_confirmation, PromptKind, PromptSpec};
pub use registry::DialogRegistry;
pub use sequencer::{SequencerYield, StepBudget, StepSequencer};
pub use stack_manager::{DialogStackManager, TurnStatus, DEFAULT_MAX_STEPS_PER_TURN};
pub use state::{ConversationState, TurnFlags};
pub use step::{Dialog, StepContext, StepOutcome};
pub use turn::TurnContext;
pub use values::{DialogResult, FoundChoice, StepInput, StepValues};

//! The dialog contract: a fixed list of named steps.

use async_trait::async_trait;

use super::errors::DialogError;
use super::options::DialogOptions;
use super::prompt::PromptSpec;
use super::turn::TurnContext;
use super::values::{DialogResult, StepInput, StepValues};

/// What a step asks the sequencer to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Run the following step now with this input.
    Next(StepInput),
    /// Send the prompt and wait; the answer goes to the following step.
    Suspend(PromptSpec),
    /// Send the prompt and wait; the answer comes back to this step.
    SuspendInPlace(PromptSpec),
    /// Start a child; its result goes to the following step.
    BeginChild {
        dialog_id: String,
        options: DialogOptions,
    },
    /// End this frame and begin another in its place.
    Replace {
        dialog_id: String,
        options: DialogOptions,
    },
    /// End this frame, handing the result to the parent.
    Complete(DialogResult),
}

impl StepOutcome {
    pub fn next() -> Self {
        StepOutcome::Next(StepInput::Empty)
    }

    pub fn begin(dialog_id: impl Into<String>, options: DialogOptions) -> Self {
        StepOutcome::BeginChild {
            dialog_id: dialog_id.into(),
            options,
        }
    }

    pub fn replace(dialog_id: impl Into<String>, options: DialogOptions) -> Self {
        StepOutcome::Replace {
            dialog_id: dialog_id.into(),
            options,
        }
    }

    pub fn done() -> Self {
        StepOutcome::Complete(DialogResult::empty())
    }
}

/// Everything a step may read or change.
pub struct StepContext<'a> {
    pub turn: &'a mut TurnContext,
    pub values: &'a mut StepValues,
    pub options: &'a DialogOptions,
}

/// A named, resumable multi-step flow.
///
/// Steps are addressed by index; `steps()` gives their names for logging and
/// fixes how many there are. Running past the last step completes the
/// dialog with a null result.
#[async_trait]
pub trait Dialog: Send + Sync {
    fn id(&self) -> &str;

    fn steps(&self) -> &'static [&'static str];

    /// External skills get different interruption handling.
    fn is_skill(&self) -> bool {
        false
    }

    /// Checks options at the Begin boundary.
    fn validate_options(&self, options: &DialogOptions) -> Result<(), DialogError> {
        match options {
            DialogOptions::None => Ok(()),
            other => Err(DialogError::invalid_options(
                self.id(),
                format!("unexpected {} options", other.kind_name()),
            )),
        }
    }

    async fn run_step(
        &self,
        step: usize,
        ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError>;

    fn step_name(&self, step: usize) -> &'static str {
        self.steps().get(step).copied().unwrap_or("<past-end>")
    }
}

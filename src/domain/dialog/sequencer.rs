//! Step Sequencer - runs one frame's steps until it yields control.

use tracing::{debug, warn};

use super::errors::DialogError;
use super::instance::{AwaitingPrompt, DialogInstance};
use super::options::DialogOptions;
use super::prompt::PromptSpec;
use super::step::{Dialog, StepContext, StepOutcome};
use super::turn::TurnContext;
use super::values::{DialogResult, StepInput};

/// Why a frame stopped running.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerYield {
    /// Suspended on a prompt; the turn is over for this stack.
    Waiting,
    BeginChild {
        dialog_id: String,
        options: DialogOptions,
    },
    Replace {
        dialog_id: String,
        options: DialogOptions,
    },
    Complete(DialogResult),
}

/// Caps how many steps one turn may run.
#[derive(Debug, Clone)]
pub struct StepBudget {
    limit: usize,
    used: usize,
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    fn spend(&mut self, dialog_id: &str) -> Result<(), DialogError> {
        if self.used >= self.limit {
            return Err(DialogError::StepLimitExceeded {
                dialog_id: dialog_id.to_string(),
                limit: self.limit,
            });
        }
        self.used += 1;
        Ok(())
    }
}

pub struct StepSequencer;

impl StepSequencer {
    /// Runs steps of `frame` starting at `index` until one suspends, delegates,
    /// or completes. `Next` chains run synchronously within the turn.
    pub async fn run(
        dialog: &dyn Dialog,
        frame: &mut DialogInstance,
        turn: &mut TurnContext,
        mut index: usize,
        mut input: StepInput,
        budget: &mut StepBudget,
    ) -> Result<SequencerYield, DialogError> {
        loop {
            if index >= dialog.steps().len() {
                debug!(dialog_id = %dialog.id(), index, "Ran past last step, completing");
                return Ok(SequencerYield::Complete(DialogResult::empty()));
            }
            budget.spend(dialog.id())?;

            frame.step_index = index;
            frame.awaiting = None;
            frame.result_of_previous_step = Some(input.clone());

            debug!(
                dialog_id = %dialog.id(),
                step = dialog.step_name(index),
                index,
                "Running step"
            );

            let outcome = {
                let mut ctx = StepContext {
                    turn: &mut *turn,
                    values: &mut frame.step_values,
                    options: &frame.options,
                };
                dialog.run_step(index, &mut ctx, input).await
            };

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(
                        dialog_id = %dialog.id(),
                        step = dialog.step_name(index),
                        error = %err,
                        "Step failed, ending dialog with error payload"
                    );
                    return Ok(SequencerYield::Complete(DialogResult::Failed {
                        dialog_id: dialog.id().to_string(),
                        error: err.to_string(),
                    }));
                }
            };

            match outcome {
                StepOutcome::Next(value) => {
                    index += 1;
                    input = value;
                }
                StepOutcome::Suspend(prompt) => {
                    return Ok(Self::suspend(frame, turn, prompt, index + 1));
                }
                StepOutcome::SuspendInPlace(prompt) => {
                    return Ok(Self::suspend(frame, turn, prompt, index));
                }
                StepOutcome::BeginChild { dialog_id, options } => {
                    return Ok(SequencerYield::BeginChild { dialog_id, options });
                }
                StepOutcome::Replace { dialog_id, options } => {
                    return Ok(SequencerYield::Replace { dialog_id, options });
                }
                StepOutcome::Complete(result) => {
                    return Ok(SequencerYield::Complete(result));
                }
            }
        }
    }

    /// Feeds the user's reply to a suspended frame.
    ///
    /// Replies the pending prompt cannot recognize re-issue the prompt and
    /// leave the frame where it was.
    pub async fn resume(
        dialog: &dyn Dialog,
        frame: &mut DialogInstance,
        turn: &mut TurnContext,
        budget: &mut StepBudget,
    ) -> Result<SequencerYield, DialogError> {
        let Some(awaiting) = frame.awaiting.clone() else {
            let text = turn.text().unwrap_or_default().to_string();
            let next = frame.step_index + 1;
            return Self::run(dialog, frame, turn, next, StepInput::Text(text), budget).await;
        };

        match awaiting.prompt.recognize(turn.activity()) {
            Some(input) => Self::run(dialog, frame, turn, awaiting.resume_at, input, budget).await,
            None => {
                let failure = DialogError::ValidationFailure {
                    prompt_id: awaiting.prompt.id.clone(),
                };
                debug!(dialog_id = %dialog.id(), error = %failure, "Re-issuing prompt");
                if let Some(retry) = awaiting.prompt.retry_activity() {
                    turn.send(retry.clone());
                }
                Ok(SequencerYield::Waiting)
            }
        }
    }

    /// Hands a finished child's result to its parent frame.
    ///
    /// A parent that pushed the child from a step resumes at the next step.
    /// A parent that was waiting on a prompt when something else pushed the
    /// child gets the prompt re-issued, unless the prompt is open to child
    /// results.
    pub async fn deliver_child_result(
        dialog: &dyn Dialog,
        frame: &mut DialogInstance,
        turn: &mut TurnContext,
        result: DialogResult,
        budget: &mut StepBudget,
    ) -> Result<SequencerYield, DialogError> {
        match frame.awaiting.clone() {
            Some(awaiting) if awaiting.prompt.accepts_child_result() => {
                Self::run(
                    dialog,
                    frame,
                    turn,
                    awaiting.resume_at,
                    StepInput::Child(result),
                    budget,
                )
                .await
            }
            Some(awaiting) => {
                debug!(
                    dialog_id = %dialog.id(),
                    prompt_id = %awaiting.prompt.id,
                    "Interrupting dialog finished, re-issuing prompt"
                );
                if let Some(prompt) = awaiting.prompt.prompt {
                    turn.send(prompt);
                }
                Ok(SequencerYield::Waiting)
            }
            None => {
                let next = frame.step_index + 1;
                Self::run(dialog, frame, turn, next, StepInput::Child(result), budget).await
            }
        }
    }

    fn suspend(
        frame: &mut DialogInstance,
        turn: &mut TurnContext,
        prompt: PromptSpec,
        resume_at: usize,
    ) -> SequencerYield {
        if let Some(activity) = prompt.prompt.clone() {
            turn.send(activity);
        }
        frame.awaiting = Some(AwaitingPrompt { prompt, resume_at });
        SequencerYield::Waiting
    }
}

//! Dialog Stack Manager - begin, continue, replace, end and cancel over a
//! conversation's dialog stack.
//!
//! Every operation runs the affected frames until control returns to the
//! user: the top frame is suspended on a prompt, or the stack is empty.

use std::sync::Arc;

use tracing::debug;

use super::errors::DialogError;
use super::instance::{DialogInstance, DialogStack};
use super::options::DialogOptions;
use super::registry::DialogRegistry;
use super::sequencer::{SequencerYield, StepBudget, StepSequencer};
use super::turn::TurnContext;
use super::values::{DialogResult, StepInput};
use crate::domain::interruption::ActiveFrame;

/// Same-turn step limit used when none is configured.
pub const DEFAULT_MAX_STEPS_PER_TURN: usize = 64;

/// Where the stack stands once an operation returns.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStatus {
    /// The top frame waits for the user's next message.
    Waiting,
    /// The outermost dialog ended; the stack is empty.
    Complete(DialogResult),
}

impl TurnStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TurnStatus::Complete(_))
    }
}

/// How the top frame should be entered on the next pass of the drive loop.
enum Entry {
    Start,
    Reply,
    ChildEnded(DialogResult),
}

#[derive(Debug, Clone)]
pub struct DialogStackManager {
    registry: Arc<DialogRegistry>,
    max_steps_per_turn: usize,
}

impl DialogStackManager {
    pub fn new(registry: Arc<DialogRegistry>, max_steps_per_turn: usize) -> Self {
        Self {
            registry,
            max_steps_per_turn,
        }
    }

    pub fn registry(&self) -> &DialogRegistry {
        &self.registry
    }

    pub fn max_steps_per_turn(&self) -> usize {
        self.max_steps_per_turn
    }

    /// Pushes a new frame over whatever is on the stack and runs it.
    pub async fn begin(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
        dialog_id: &str,
        options: DialogOptions,
    ) -> Result<TurnStatus, DialogError> {
        self.push_frame(stack, dialog_id, options)?;
        self.drive(stack, turn, Entry::Start).await
    }

    /// Feeds the incoming activity to the top frame.
    pub async fn continue_dialog(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
    ) -> Result<TurnStatus, DialogError> {
        if stack.is_empty() {
            return Err(DialogError::NoActiveDialog);
        }
        self.drive(stack, turn, Entry::Reply).await
    }

    /// Swaps the top frame for a fresh one without resuming the parent.
    pub async fn replace(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
        dialog_id: &str,
        options: DialogOptions,
    ) -> Result<TurnStatus, DialogError> {
        let frame = self.new_frame(dialog_id, options)?;
        stack.pop();
        stack.push(frame);
        self.drive(stack, turn, Entry::Start).await
    }

    /// Ends the top frame with `result` and hands it to the parent.
    pub async fn end(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
        result: DialogResult,
    ) -> Result<TurnStatus, DialogError> {
        let Some(ended) = stack.pop() else {
            return Err(DialogError::NoActiveDialog);
        };
        debug!(dialog_id = %ended.dialog_id, "Dialog ended externally");
        if stack.is_empty() {
            return Ok(TurnStatus::Complete(result));
        }
        self.drive(stack, turn, Entry::ChildEnded(result)).await
    }

    /// Empties the stack without running anything.
    pub fn cancel_all(&self, stack: &mut DialogStack) {
        if !stack.is_empty() {
            debug!(cancelled = ?stack.dialog_ids(), "Cancelling all dialogs");
        }
        stack.clear();
    }

    /// Re-sends the top frame's pending prompt, returning whether one was sent.
    pub fn reprompt(&self, stack: &DialogStack, turn: &mut TurnContext) -> bool {
        let prompt = stack
            .top()
            .and_then(|frame| frame.awaiting.as_ref())
            .and_then(|awaiting| awaiting.prompt.prompt.clone());
        match prompt {
            Some(activity) => {
                turn.send(activity);
                true
            }
            None => false,
        }
    }

    /// Describes the top frame for interruption decisions.
    pub fn active_frame(&self, stack: &DialogStack) -> Option<ActiveFrame> {
        stack.top().map(|frame| ActiveFrame {
            dialog_id: frame.dialog_id.clone(),
            is_skill: self.registry.is_skill(&frame.dialog_id),
        })
    }

    fn new_frame(
        &self,
        dialog_id: &str,
        options: DialogOptions,
    ) -> Result<DialogInstance, DialogError> {
        let dialog = self.registry.get(dialog_id)?;
        dialog.validate_options(&options)?;
        Ok(DialogInstance::new(dialog_id, options))
    }

    fn push_frame(
        &self,
        stack: &mut DialogStack,
        dialog_id: &str,
        options: DialogOptions,
    ) -> Result<(), DialogError> {
        let frame = self.new_frame(dialog_id, options)?;
        debug!(dialog_id, depth = stack.depth() + 1, "Beginning dialog");
        stack.push(frame);
        Ok(())
    }

    async fn drive(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
        mut entry: Entry,
    ) -> Result<TurnStatus, DialogError> {
        let mut budget = StepBudget::new(self.max_steps_per_turn);

        loop {
            let yielded = {
                let Some(frame) = stack.top_mut() else {
                    return Err(DialogError::NoActiveDialog);
                };
                let dialog = self.registry.get(&frame.dialog_id)?;
                match entry {
                    Entry::Start => {
                        StepSequencer::run(
                            dialog.as_ref(),
                            frame,
                            turn,
                            0,
                            StepInput::Empty,
                            &mut budget,
                        )
                        .await?
                    }
                    Entry::Reply => {
                        StepSequencer::resume(dialog.as_ref(), frame, turn, &mut budget).await?
                    }
                    Entry::ChildEnded(result) => {
                        StepSequencer::deliver_child_result(
                            dialog.as_ref(),
                            frame,
                            turn,
                            result,
                            &mut budget,
                        )
                        .await?
                    }
                }
            };

            entry = match yielded {
                SequencerYield::Waiting => return Ok(TurnStatus::Waiting),
                SequencerYield::BeginChild { dialog_id, options } => {
                    self.push_frame(stack, &dialog_id, options)?;
                    Entry::Start
                }
                SequencerYield::Replace { dialog_id, options } => {
                    let frame = self.new_frame(&dialog_id, options)?;
                    if let Some(ended) = stack.pop() {
                        debug!(from = %ended.dialog_id, to = %dialog_id, "Replacing dialog");
                    }
                    stack.push(frame);
                    Entry::Start
                }
                SequencerYield::Complete(result) => {
                    if let Some(ended) = stack.pop() {
                        debug!(
                            dialog_id = %ended.dialog_id,
                            depth = stack.depth(),
                            "Dialog completed"
                        );
                    }
                    if stack.is_empty() {
                        return Ok(TurnStatus::Complete(result));
                    }
                    Entry::ChildEnded(result)
                }
            };
        }
    }
}

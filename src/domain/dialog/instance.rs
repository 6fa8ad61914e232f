//! Dialog frames and the stack that holds them.

use serde::{Deserialize, Serialize};

use super::options::DialogOptions;
use super::prompt::PromptSpec;
use super::values::{StepInput, StepValues};

/// A suspended frame's pending prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwaitingPrompt {
    pub prompt: PromptSpec,
    /// Step that receives the recognized answer.
    pub resume_at: usize,
}

/// One active dialog's position and scratch data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    pub dialog_id: String,
    pub step_index: usize,
    #[serde(default)]
    pub step_values: StepValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_of_previous_step: Option<StepInput>,
    #[serde(default)]
    pub options: DialogOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awaiting: Option<AwaitingPrompt>,
}

impl DialogInstance {
    pub fn new(dialog_id: impl Into<String>, options: DialogOptions) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            step_index: 0,
            step_values: StepValues::new(),
            result_of_previous_step: None,
            options,
            awaiting: None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn prompt_id(&self) -> Option<&str> {
        self.awaiting.as_ref().map(|a| a.prompt.id.as_str())
    }
}

/// Ordered frames, innermost last.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogStack(Vec<DialogInstance>);

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<DialogInstance>) -> Self {
        Self(frames)
    }

    pub fn push(&mut self, frame: DialogInstance) {
        self.0.push(frame);
    }

    pub fn pop(&mut self) -> Option<DialogInstance> {
        self.0.pop()
    }

    pub fn top(&self) -> Option<&DialogInstance> {
        self.0.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogInstance> {
        self.0.last_mut()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dialog ids from outermost to innermost.
    pub fn dialog_ids(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.dialog_id.as_str()).collect()
    }

    pub fn frames(&self) -> &[DialogInstance] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_starts_at_step_zero_without_prompt() {
        let frame = DialogInstance::new("main", DialogOptions::None);
        assert_eq!(frame.step_index, 0);
        assert!(!frame.is_awaiting());
        assert_eq!(frame.prompt_id(), None);
    }

    #[test]
    fn stack_top_is_innermost_frame() {
        let mut stack = DialogStack::new();
        stack.push(DialogInstance::new("main", DialogOptions::None));
        stack.push(DialogInstance::new("login", DialogOptions::None));

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().map(|f| f.dialog_id.as_str()), Some("login"));
        assert_eq!(stack.dialog_ids(), vec!["main", "login"]);
    }

    #[test]
    fn empty_stack_serializes_as_empty_array() {
        let stack = DialogStack::new();
        assert_eq!(serde_json::to_string(&stack).unwrap(), "[]");
    }
}

//! Breather dialog: a short guided meditation.

use async_trait::async_trait;
use std::sync::Arc;

use super::{BREATHER, STRESS_HANDLING};
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, PromptSpec, StepContext, StepInput, StepOutcome,
};
use crate::ports::ContentSource;

const STEPS: &[&str] = &["meditate", "follow_up"];

pub struct BreatherDialog {
    content: Arc<dyn ContentSource>,
}

impl BreatherDialog {
    pub fn new(content: Arc<dyn ContentSource>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Dialog for BreatherDialog {
    fn id(&self) -> &str {
        BREATHER
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    async fn run_step(
        &self,
        step: usize,
        ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        match step {
            0 => {
                let meditation = self
                    .content
                    .meditation()
                    .await
                    .map_err(|e| DialogError::step_failed(BREATHER, "meditate", e.to_string()))?;
                ctx.turn.send(meditation);
                Ok(StepOutcome::Suspend(PromptSpec::choice(
                    "breatherFeedback",
                    "Was that helpful?",
                    &["I am good now", "I still need to talk to you"],
                )))
            }
            _ => {
                if input.as_choice().is_some_and(|choice| choice.index == 1) {
                    return Ok(StepOutcome::begin(STRESS_HANDLING, DialogOptions::None));
                }
                ctx.turn.send_text("Glad to hear it. See you next time!");
                Ok(StepOutcome::done())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::domain::dialog::DialogStack;

    #[tokio::test]
    async fn meditation_then_feedback() {
        let manager = default_manager();
        let mut stack = DialogStack::new();
        let mut first = turn("breather", known_user("Sam"));

        manager
            .begin(&mut stack, &mut first, BREATHER, DialogOptions::None)
            .await
            .unwrap();

        assert_eq!(first.outbox().len(), 2);
        assert_eq!(first.outbox()[0].attachments[0].content_type, "video/mp4");

        let (status, _, said) = reply(&manager, &mut stack, known_user("Sam"), "I am good now").await;
        assert!(status.is_complete());
        assert_eq!(said, vec!["Glad to hear it. See you next time!"]);
    }

    #[tokio::test]
    async fn still_need_to_talk_goes_to_stress_handling() {
        let manager = default_manager();
        let mut stack = DialogStack::new();
        let mut first = turn("breather", known_user("Sam"));
        manager
            .begin(&mut stack, &mut first, BREATHER, DialogOptions::None)
            .await
            .unwrap();

        reply(&manager, &mut stack, known_user("Sam"), "2").await;

        assert_eq!(stack.dialog_ids(), vec![BREATHER, STRESS_HANDLING]);
    }
}

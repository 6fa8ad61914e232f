//! Chitchat dialog: answers small talk until the user has had enough.

use async_trait::async_trait;
use std::sync::Arc;

use super::CHITCHAT;
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, PromptSpec, StepContext, StepInput, StepOutcome,
};
use crate::ports::ContentSource;

const STEPS: &[&str] = &["ask", "answer", "wrap_up"];

const NO_ANSWER: &str = "Sorry, I don't have a good answer for that yet.";

pub struct ChitchatDialog {
    content: Arc<dyn ContentSource>,
}

impl ChitchatDialog {
    pub fn new(content: Arc<dyn ContentSource>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Dialog for ChitchatDialog {
    fn id(&self) -> &str {
        CHITCHAT
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
            0 => Ok(StepOutcome::Suspend(
                PromptSpec::text("chitchat", "What can I do for you today?")
                    .with_retry("What can I do for you?"),
            )),
            1 => {
                let question = input.as_text().unwrap_or_default();
                let answer = self
                    .content
                    .chitchat(question)
                    .await
                    .map_err(|e| DialogError::step_failed(CHITCHAT, "answer", e.to_string()))?;
                ctx.turn
                    .send_text(answer.unwrap_or_else(|| NO_ANSWER.to_string()));
                Ok(StepOutcome::Suspend(
                    PromptSpec::choice("helpful", "Was that helpful?", &["Yes, bye", "More Chat"])
                        .with_retry("Let me know if it is helpful"),
                ))
            }
            _ => {
                if input.as_choice().is_some_and(|choice| choice.index == 1) {
                    return Ok(StepOutcome::replace(CHITCHAT, DialogOptions::None));
                }
                ctx.turn.send_text("Great! Talk to you soon.");
                Ok(StepOutcome::done())
            }
        }
    }
}

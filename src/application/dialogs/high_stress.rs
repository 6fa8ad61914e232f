//! High stress dialog: breather, talk, or a person.

use async_trait::async_trait;

use super::{BREATHER, ESCALATE, HIGH_STRESS, STRESS_HANDLING};
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, PromptSpec, StepContext, StepInput, StepOutcome,
};

const STEPS: &[&str] = &["offer", "route"];

pub struct HighStressDialog;

#[async_trait]
impl Dialog for HighStressDialog {
    fn id(&self) -> &str {
        HIGH_STRESS
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    async fn run_step(
        &self,
        step: usize,
        _ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        match step {
            0 => Ok(StepOutcome::Suspend(
                PromptSpec::choice(
                    "highStress",
                    "Oh I am sorry to hear that. \u{1F61F} Do you want to take a moment to have a breather? Or do you want to just talk to me about the things that bother you?",
                    &["Breather", "Talk to me"],
                )
                .allowing_free_text()
                .with_retry("Would you like breather or chat?"),
            )),
            _ => Ok(match input.as_choice().map(|choice| choice.index) {
                Some(0) => StepOutcome::begin(BREATHER, DialogOptions::None),
                Some(1) => StepOutcome::begin(STRESS_HANDLING, DialogOptions::None),
                _ => StepOutcome::begin(ESCALATE, DialogOptions::None),
            }),
        }
    }
}

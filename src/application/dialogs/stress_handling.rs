//! Stress handling dialog for a medium stress level.

use async_trait::async_trait;

use super::{ENTERTAIN, ESCALATE, STRESS_HANDLING};
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, PromptSpec, StepContext, StepInput, StepOutcome,
};

const STEPS: &[&str] = &["ask_reason", "offer_tips", "route", "after_child"];

const CHOICES: [&str; 2] = [
    "Yes, show me something interesting",
    "Talk to a therapist directly",
];

pub struct StressHandlingDialog;

#[async_trait]
impl Dialog for StressHandlingDialog {
    fn id(&self) -> &str {
        STRESS_HANDLING
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
            0 => Ok(StepOutcome::Suspend(PromptSpec::text(
                "stressReason",
                "I see. So, could you tell me what bothers you today?",
            ))),
            1 => {
                if let Some(reason) = input.as_text() {
                    ctx.values.insert("reason", reason);
                }
                Ok(StepOutcome::Suspend(
                    PromptSpec::choice(
                        "tips",
                        "Yes, it is stressful. I have some tips for you to handle the stress. Would you like to know? \u{1F917}",
                        &CHOICES,
                    )
                    .with_retry("Would you like to know my stress handling tips? \u{1F917}"),
                ))
            }
            2 => match input.as_choice().map(|choice| choice.index) {
                Some(0) => Ok(StepOutcome::begin(ENTERTAIN, DialogOptions::None)),
                _ => Ok(StepOutcome::begin(ESCALATE, DialogOptions::None)),
            },
            _ => {
                if input.as_child().is_some_and(|result| result.flag("escalate")) {
                    return Ok(StepOutcome::begin(ESCALATE, DialogOptions::None));
                }
                Ok(StepOutcome::done())
            }
        }
    }
}

//! Stress dialog, reached through the Stress shortcut.

use async_trait::async_trait;

use super::{is_affirmative, ENTERTAIN, ESCALATE, STRESS};
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, PromptSpec, StepContext, StepInput, StepOutcome,
};

const STEPS: &[&str] = &["offer_tips", "decide", "after_entertain"];

pub struct StressDialog;

#[async_trait]
impl Dialog for StressDialog {
    fn id(&self) -> &str {
        STRESS
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
                "stressTips",
                "I have some tips for you to help reduce the stress. Are you curious?",
            ))),
            1 => {
                if is_affirmative(ctx.turn, &input) {
                    return Ok(StepOutcome::begin(ENTERTAIN, DialogOptions::None));
                }
                ctx.turn.send_text("Okay. I'm here whenever you need me.");
                Ok(StepOutcome::done())
            }
            _ => {
                if input.as_child().is_some_and(|result| result.flag("escalate")) {
                    return Ok(StepOutcome::begin(ESCALATE, DialogOptions::None));
                }
                Ok(StepOutcome::done())
            }
        }
    }
}

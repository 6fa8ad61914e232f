//! Asks whether to leave the running skill for another one.

use async_trait::async_trait;
use serde_json::json;

use super::SWITCH_SKILL;
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, DialogResult, PromptSpec, StepContext, StepInput,
    StepOutcome,
};

const STEPS: &[&str] = &["confirm", "decide"];

pub struct SwitchSkillDialog;

#[async_trait]
impl Dialog for SwitchSkillDialog {
    fn id(&self) -> &str {
        SWITCH_SKILL
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    fn validate_options(&self, options: &DialogOptions) -> Result<(), DialogError> {
        match options {
            DialogOptions::SwitchSkill(switch) if !switch.skill_id.is_empty() => Ok(()),
            DialogOptions::SwitchSkill(_) => {
                Err(DialogError::invalid_options(SWITCH_SKILL, "skill_id is empty"))
            }
            other => Err(DialogError::invalid_options(
                SWITCH_SKILL,
                format!("expected switch_skill options, got {}", other.kind_name()),
            )),
        }
    }

    async fn run_step(
        &self,
        step: usize,
        ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        let DialogOptions::SwitchSkill(switch) = ctx.options else {
            return Err(DialogError::step_failed(
                SWITCH_SKILL,
                "confirm",
                "missing switch_skill options",
            ));
        };

        match step {
            0 => Ok(StepOutcome::Suspend(
                PromptSpec::confirm(
                    "switchSkill",
                    format!(
                        "It sounds like you want {}. Do you want to switch to it?",
                        switch.skill_name
                    ),
                )
                .with_retry(format!(
                    "Please answer yes or no. Switch to {}?",
                    switch.skill_name
                )),
            )),
            _ => {
                let confirmed = input.as_confirmed().unwrap_or(false);
                let mut value = json!({
                    "skillId": switch.skill_id,
                    "confirmed": confirmed,
                });
                if let Some(text) = &switch.pending_text {
                    value["pendingText"] = json!(text);
                }
                Ok(StepOutcome::Complete(DialogResult::with_value(value)))
            }
        }
    }
}

//! Skill delegate: relays turns to an external skill.
//!
//! One instance is registered per configured skill, under the skill's id.
//! The first step begins the skill; the second relays every later message
//! and stays put until the skill reports it is done or fails. A switch
//! confirmation pushed over the relay comes back to it as a child result,
//! and an accepted switch hands the message that asked for it to the new
//! skill.

use async_trait::async_trait;
use tracing::{info, warn};

use std::sync::Arc;

use crate::application::resilience::RetryPolicy;
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, DialogResult, PromptSpec, SkillOptions, StepContext,
    StepInput, StepOutcome, TurnContext,
};
use crate::domain::interruption::SkillDescriptor;
use crate::ports::{SkillError, SkillHandler, SkillReply, SkillTurn};

const STEPS: &[&str] = &["begin", "relay"];

const RELAY_PROMPT: &str = "skillRelay";

pub struct SkillDialog {
    skill: SkillDescriptor,
    handler: Arc<dyn SkillHandler>,
    retry: RetryPolicy,
}

impl SkillDialog {
    pub fn new(skill: SkillDescriptor, handler: Arc<dyn SkillHandler>, retry: RetryPolicy) -> Self {
        Self {
            skill,
            handler,
            retry,
        }
    }

    fn skill_turn(turn: &TurnContext, pending_text: Option<&str>) -> SkillTurn {
        let mut activity = turn.activity().clone();
        if let Some(text) = pending_text {
            activity.text = Some(text.to_string());
        }
        SkillTurn {
            conversation_id: turn.conversation_id().clone(),
            user_id: turn.user_id().clone(),
            locale: turn.locale().to_string(),
            activity,
        }
    }

    fn unavailable(&self, err: SkillError) -> StepOutcome {
        warn!(skill_id = %self.skill.id, error = %err, "Skill call failed");
        StepOutcome::Complete(DialogResult::SkillUnavailable {
            skill_id: self.skill.id.clone(),
            reason: err.to_string(),
        })
    }

    /// Relays the skill's reply, completing when the skill is done.
    ///
    /// `wait` decides where the next message lands: the begin step hands
    /// over to the relay step, which then waits in place.
    fn relay(
        ctx: &mut StepContext<'_>,
        reply: SkillReply,
        wait: fn(PromptSpec) -> StepOutcome,
    ) -> StepOutcome {
        for activity in reply.activities {
            ctx.turn.send(activity);
        }
        if reply.done {
            return StepOutcome::Complete(DialogResult::Completed {
                value: reply.result,
            });
        }
        wait(PromptSpec::open(RELAY_PROMPT))
    }

    fn on_switch_decision(&self, result: &DialogResult) -> StepOutcome {
        let Some(value) = result.value().filter(|_| result.flag("confirmed")) else {
            return StepOutcome::SuspendInPlace(PromptSpec::open(RELAY_PROMPT));
        };
        let Some(skill_id) = value.get("skillId").and_then(|id| id.as_str()) else {
            return StepOutcome::SuspendInPlace(PromptSpec::open(RELAY_PROMPT));
        };
        info!(from = %self.skill.id, to = %skill_id, "Switching skill");
        StepOutcome::replace(
            skill_id,
            DialogOptions::Skill(SkillOptions {
                skill_id: skill_id.to_string(),
                pending_text: value
                    .get("pendingText")
                    .and_then(|text| text.as_str())
                    .map(str::to_string),
            }),
        )
    }
}

#[async_trait]
impl Dialog for SkillDialog {
    fn id(&self) -> &str {
        &self.skill.id
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    fn is_skill(&self) -> bool {
        true
    }

    fn validate_options(&self, options: &DialogOptions) -> Result<(), DialogError> {
        match options {
            DialogOptions::None => Ok(()),
            DialogOptions::Skill(skill) if skill.skill_id.eq_ignore_ascii_case(&self.skill.id) => {
                Ok(())
            }
            other => Err(DialogError::invalid_options(
                &self.skill.id,
                format!("unexpected {} options", other.kind_name()),
            )),
        }
    }

    async fn run_step(
        &self,
        step: usize,
        ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        match step {
            0 => {
                let pending_text = match ctx.options {
                    DialogOptions::Skill(options) => options.pending_text.as_deref(),
                    _ => None,
                };
                let skill_turn = Self::skill_turn(ctx.turn, pending_text);
                let reply = self
                    .retry
                    .call("skill.begin", || self.handler.begin(&self.skill.id, &skill_turn))
                    .await;
                match reply {
                    Ok(reply) => Ok(Self::relay(ctx, reply, StepOutcome::Suspend)),
                    Err(err) => Ok(self.unavailable(err)),
                }
            }
            _ => {
                if let Some(result) = input.as_child() {
                    return Ok(self.on_switch_decision(result));
                }
                let skill_turn = Self::skill_turn(ctx.turn, None);
                let reply = self
                    .retry
                    .call("skill.continue", || {
                        self.handler.continue_skill(&self.skill.id, &skill_turn)
                    })
                    .await;
                match reply {
                    Ok(reply) => Ok(Self::relay(ctx, reply, StepOutcome::SuspendInPlace)),
                    Err(err) => Ok(self.unavailable(err)),
                }
            }
        }
    }
}

//! Main (root) dialog.
//!
//! Makes sure the user is signed in and onboarded, then asks for a stress
//! level and hands the conversation to the dialog that fits the answer.
//! Progress is tracked as a [`RootPhase`] in step values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    DialogSettings, CHITCHAT, ESCALATE, HIGH_STRESS, LOGIN, MAIN, ONBOARDING, STRESS_HANDLING,
};
use crate::domain::dialog::{
    Activity, Attachment, Dialog, DialogError, DialogOptions, DialogResult, OnboardingMode,
    OnboardingOptions, PromptSpec, StepContext, StepInput, StepOutcome, StepValues,
};
use crate::domain::foundation::StateMachine;
use crate::domain::interruption::SkillCatalog;

const STEPS: &[&str] = &[
    "ensure_authenticated",
    "ensure_onboarded",
    "present_choice",
    "route",
    "finalize",
];

const PHASE_KEY: &str = "phase";

const MENU: [&str; 5] = [
    "Low",
    "Medium",
    "High",
    "Talk to a person directly",
    "See my journal trends",
];

const UNSUPPORTED: &str = "Sorry, I didn't get that. You can pick one of the options or ask me something else.";

/// Where the root dialog is in its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RootPhase {
    #[default]
    NeedsLogin,
    NeedsOnboarding,
    AwaitingChoice,
    Routed,
    Done,
}

impl RootPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootPhase::NeedsLogin => "needs_login",
            RootPhase::NeedsOnboarding => "needs_onboarding",
            RootPhase::AwaitingChoice => "awaiting_choice",
            RootPhase::Routed => "routed",
            RootPhase::Done => "done",
        }
    }
}

impl fmt::Display for RootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for RootPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RootPhase::*;
        match self {
            NeedsLogin => vec![NeedsOnboarding, Done],
            NeedsOnboarding => vec![AwaitingChoice, Done],
            AwaitingChoice => vec![Routed],
            Routed => vec![Done],
            Done => vec![],
        }
    }
}

pub struct MainDialog {
    skills: SkillCatalog,
    settings: DialogSettings,
}

impl MainDialog {
    pub fn new(skills: SkillCatalog, settings: DialogSettings) -> Self {
        Self { skills, settings }
    }

    /// Moves to `target`, staying put when already there.
    fn advance(values: &mut StepValues, target: RootPhase) -> Result<RootPhase, DialogError> {
        let current: RootPhase = values.get_or_default(PHASE_KEY);
        if current != target {
            current
                .transition_to(target)
                .map_err(|e| DialogError::step_failed(MAIN, "phase", e.to_string()))?;
            values.insert(PHASE_KEY, target.as_str());
        }
        Ok(target)
    }

    fn menu() -> PromptSpec {
        PromptSpec::choice(
            "stressLevel",
            "How stressed do you feel right now?",
            &MENU,
        )
        .allowing_free_text()
        .with_retry("Your Stress Level")
    }

    fn route_choice(&self, ctx: &mut StepContext<'_>, index: usize) -> StepOutcome {
        match index {
            0 => StepOutcome::begin(CHITCHAT, DialogOptions::None),
            1 => StepOutcome::begin(STRESS_HANDLING, DialogOptions::None),
            2 => StepOutcome::begin(HIGH_STRESS, DialogOptions::None),
            3 => StepOutcome::begin(ESCALATE, DialogOptions::None),
            _ => {
                ctx.turn.send(
                    Activity::message("Here is how you have been doing lately.").with_attachment(
                        Attachment::link("text/html", self.settings.trends_url.clone())
                            .named("My Trends"),
                    ),
                );
                StepOutcome::next()
            }
        }
    }

    fn route_text(&self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let label = ctx
            .turn
            .recognition()
            .dispatch_label()
            .map(str::to_string);
        if let Some(label) = label {
            if let Some(skill) = self.skills.get(&label) {
                return StepOutcome::begin(skill.id.clone(), DialogOptions::None);
            }
            if let Some(dialog_id) = self.settings.dispatch_routes.get(&label) {
                return StepOutcome::begin(dialog_id.clone(), DialogOptions::None);
            }
        }
        ctx.turn.send_text(UNSUPPORTED);
        StepOutcome::next()
    }

    fn skill_name<'a>(&'a self, skill_id: &'a str) -> &'a str {
        self.skills
            .get(skill_id)
            .map(|skill| skill.name.as_str())
            .unwrap_or(skill_id)
    }
}

#[async_trait]
impl Dialog for MainDialog {
    fn id(&self) -> &str {
        MAIN
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
        let now = ctx.turn.received_at();
        match step {
            0 => {
                if ctx.turn.user().is_authenticated(now) {
                    Self::advance(ctx.values, RootPhase::NeedsOnboarding)?;
                    return Ok(StepOutcome::next());
                }
                Ok(StepOutcome::begin(LOGIN, DialogOptions::None))
            }
            1 => {
                if !ctx.turn.user().is_authenticated(now) {
                    Self::advance(ctx.values, RootPhase::Done)?;
                    return Ok(StepOutcome::done());
                }
                Self::advance(ctx.values, RootPhase::NeedsOnboarding)?;
                if ctx.turn.user().onboarding.needs_onboarding() {
                    return Ok(StepOutcome::begin(
                        ONBOARDING,
                        DialogOptions::Onboarding(OnboardingOptions {
                            mode: OnboardingMode::FirstRun,
                        }),
                    ));
                }
                Ok(StepOutcome::next())
            }
            2 => {
                let declined = input
                    .as_child()
                    .and_then(DialogResult::value)
                    .is_some_and(|value| value.get("declined").is_some());
                if declined {
                    Self::advance(ctx.values, RootPhase::Done)?;
                    return Ok(StepOutcome::done());
                }
                Self::advance(ctx.values, RootPhase::AwaitingChoice)?;
                Ok(StepOutcome::Suspend(Self::menu()))
            }
            3 => {
                Self::advance(ctx.values, RootPhase::Routed)?;
                Ok(match &input {
                    StepInput::Choice(choice) => self.route_choice(ctx, choice.index),
                    _ => self.route_text(ctx),
                })
            }
            _ => {
                Self::advance(ctx.values, RootPhase::Done)?;
                if let Some(DialogResult::SkillUnavailable { skill_id, .. }) = input.as_child() {
                    ctx.turn.send_text(format!(
                        "Sorry, {} is not available right now. Please try again later.",
                        self.skill_name(skill_id)
                    ));
                }
                Ok(StepOutcome::done())
            }
        }
    }
}

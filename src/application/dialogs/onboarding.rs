//! Onboarding dialog.
//!
//! First run collects consent, a name and interests, skipping anything the
//! user record already knows. Update mode re-asks every field; answering
//! "none" keeps the current value and new interests are appended.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Timelike};
use serde_json::json;

use super::ONBOARDING;
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, DialogResult, OnboardingMode, PromptSpec, StepContext,
    StepInput, StepOutcome,
};
use crate::domain::user::{is_keep_current, parse_interest_list, InterestCategory};

const STEPS: &[&str] = &[
    "ask_privacy",
    "ask_terms",
    "ask_name",
    "ask_reading_interests",
    "ask_music_interests",
    "finish",
];

const NAME_KEY: &str = "name";

/// Greeting for the hour the user wrote in, in their own offset.
pub fn greeting_for(timestamp: Option<DateTime<FixedOffset>>) -> &'static str {
    match timestamp.map(|t| t.hour()) {
        None => "Hi",
        Some(hour) if hour < 5 || hour > 17 => "Good evening",
        Some(hour) if hour <= 12 => "Good morning",
        Some(_) => "Good afternoon",
    }
}

pub struct OnboardingDialog;

impl OnboardingDialog {
    fn declined(ctx: &mut StepContext<'_>, what: &str) -> StepOutcome {
        ctx.turn
            .send_text("No problem. Come back whenever you are ready and we can start over.");
        StepOutcome::Complete(DialogResult::with_value(json!({ "declined": what })))
    }

    fn interests_prompt(
        ctx: &StepContext<'_>,
        mode: OnboardingMode,
        category: InterestCategory,
    ) -> Option<PromptSpec> {
        let record = &ctx.turn.user().onboarding;
        let (id, question) = match category {
            InterestCategory::Reading => (
                "readingInterests",
                "What do you like to read about? List a few topics separated by commas.",
            ),
            InterestCategory::Music => (
                "musicInterests",
                "What kind of music do you like? List a few genres or artists separated by commas.",
            ),
        };
        match mode {
            OnboardingMode::FirstRun if record.has_interests(category) => None,
            OnboardingMode::FirstRun => Some(PromptSpec::text(id, question)),
            OnboardingMode::UpdateProfile => Some(PromptSpec::text(
                id,
                format!(
                    "{} You currently have: {}. Type \"none\" to keep them.",
                    question,
                    record.interests(category).join(", ")
                ),
            )),
        }
    }

    fn store_interests(
        ctx: &mut StepContext<'_>,
        mode: OnboardingMode,
        category: InterestCategory,
        input: &StepInput,
    ) {
        let Some(text) = input.as_text() else {
            return;
        };
        if is_keep_current(text) {
            return;
        }
        let items = parse_interest_list(text);
        let record = &mut ctx.turn.user_mut().onboarding;
        match mode {
            OnboardingMode::FirstRun => record.set_interests(category, items),
            OnboardingMode::UpdateProfile => record.append_interests(category, items),
        }
    }
}

#[async_trait]
impl Dialog for OnboardingDialog {
    fn id(&self) -> &str {
        ONBOARDING
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    fn validate_options(&self, options: &DialogOptions) -> Result<(), DialogError> {
        match options {
            DialogOptions::None | DialogOptions::Onboarding(_) => Ok(()),
            other => Err(DialogError::invalid_options(
                ONBOARDING,
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
        let mode = ctx.options.onboarding().mode;
        let first_run = mode == OnboardingMode::FirstRun;

        match step {
            0 => {
                if !first_run || ctx.turn.user().onboarding.privacy_accepted {
                    return Ok(StepOutcome::next());
                }
                Ok(StepOutcome::Suspend(
                    PromptSpec::confirm("privacy", "Do you accept our privacy policy?")
                        .with_retry("Please answer yes or no. Do you accept our privacy policy?"),
                ))
            }
            1 => {
                match input.as_confirmed() {
                    Some(false) => return Ok(Self::declined(ctx, "privacy")),
                    Some(true) => ctx.turn.user_mut().onboarding.privacy_accepted = true,
                    None => {}
                }
                let record = &ctx.turn.user().onboarding;
                if !first_run || !record.is_new_user || record.terms_accepted {
                    return Ok(StepOutcome::next());
                }
                Ok(StepOutcome::Suspend(
                    PromptSpec::confirm("terms", "Do you accept our terms of use?")
                        .with_retry("Please answer yes or no. Do you accept our terms of use?"),
                ))
            }
            2 => {
                match input.as_confirmed() {
                    Some(false) => return Ok(Self::declined(ctx, "terms")),
                    Some(true) => ctx.turn.user_mut().onboarding.terms_accepted = true,
                    None => {}
                }
                let record = &ctx.turn.user().onboarding;
                match mode {
                    OnboardingMode::FirstRun if record.has_name() => Ok(StepOutcome::next()),
                    OnboardingMode::FirstRun => Ok(StepOutcome::Suspend(PromptSpec::text(
                        "name",
                        "What should I call you?",
                    ))),
                    OnboardingMode::UpdateProfile => Ok(StepOutcome::Suspend(PromptSpec::text(
                        "name",
                        format!(
                            "What should I call you? Right now I call you {}. Type \"none\" to keep it.",
                            ctx.turn.user().display_name("buddy")
                        ),
                    ))),
                }
            }
            3 => {
                if let Some(text) = input.as_text() {
                    if !is_keep_current(text) {
                        ctx.turn.user_mut().onboarding.name = Some(text.trim().to_string());
                    }
                    let greeting = greeting_for(ctx.turn.activity().timestamp);
                    let name = ctx.turn.user().display_name("buddy").to_string();
                    ctx.turn.send_text(format!("{} {} \u{1F600}", greeting, name));
                }
                if let Some(name) = ctx.turn.user().onboarding.name.clone() {
                    ctx.values.insert(NAME_KEY, name);
                }
                Ok(Self::interests_prompt(ctx, mode, InterestCategory::Reading)
                    .map(StepOutcome::Suspend)
                    .unwrap_or_else(StepOutcome::next))
            }
            4 => {
                Self::store_interests(ctx, mode, InterestCategory::Reading, &input);
                Ok(Self::interests_prompt(ctx, mode, InterestCategory::Music)
                    .map(StepOutcome::Suspend)
                    .unwrap_or_else(StepOutcome::next))
            }
            _ => {
                Self::store_interests(ctx, mode, InterestCategory::Music, &input);
                let record = &mut ctx.turn.user_mut().onboarding;
                let was_new = record.complete_onboarding();
                let name = record.name.clone();
                if let Some(name) = &name {
                    ctx.values.insert(NAME_KEY, name.clone());
                }

                if was_new {
                    ctx.turn
                        .send_text("Thanks! You are all set. I'm glad to have you here.");
                } else if !first_run {
                    ctx.turn.send_text("Your profile is updated.");
                }
                Ok(StepOutcome::Complete(DialogResult::with_value(
                    json!({ "name": name }),
                )))
            }
        }
    }
}

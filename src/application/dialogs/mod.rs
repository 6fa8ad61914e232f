//! Concrete dialogs and the registry that wires them together.
//!
//! Each dialog is a small struct implementing [`Dialog`] over its own step
//! list. Dialogs never call each other directly: they begin, replace or end
//! through [`StepOutcome`](crate::domain::dialog::StepOutcome) and the stack
//! manager looks the target up by id in the registry built here.

mod breather;
mod chitchat;
mod entertain;
mod escalate;
mod high_stress;
mod login;
mod main_dialog;
mod onboarding;
mod skill;
mod stress;
mod stress_handling;
mod switch_skill;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::resilience::RetryPolicy;
use crate::domain::dialog::{
    recognize_confirmation, Dialog, DialogRegistry, StepInput, TurnContext,
};
use crate::domain::interruption::{GlobalIntent, SkillCatalog};
use crate::ports::{AuthProvider, ContentSource, SkillHandler};

pub use breather::BreatherDialog;
pub use chitchat::ChitchatDialog;
pub use entertain::EntertainDialog;
pub use escalate::EscalateDialog;
pub use high_stress::HighStressDialog;
pub use login::LoginDialog;
pub use main_dialog::{MainDialog, RootPhase};
pub use onboarding::{greeting_for, OnboardingDialog};
pub use skill::SkillDialog;
pub use stress::StressDialog;
pub use stress_handling::StressHandlingDialog;
pub use switch_skill::SwitchSkillDialog;

pub const MAIN: &str = "main";
pub const LOGIN: &str = "login";
pub const ONBOARDING: &str = "onboarding";
pub const ENTERTAIN: &str = "entertain";
pub const STRESS: &str = "stress";
pub const STRESS_HANDLING: &str = "stress_handling";
pub const HIGH_STRESS: &str = "high_stress";
pub const BREATHER: &str = "breather";
pub const CHITCHAT: &str = "chitchat";
pub const ESCALATE: &str = "escalate";
pub const SWITCH_SKILL: &str = "switch_skill";

/// Tunables shared by the concrete dialogs.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSettings {
    /// Declined offers before entertainment gives up and escalates.
    pub refusal_limit: u32,
    /// Content shown before entertainment ends on its own.
    pub max_showings: u32,
    pub trends_url: String,
    pub escalation_contact: String,
    /// Dispatch label → dialog id for free text at the main menu.
    pub dispatch_routes: BTreeMap<String, String>,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            refusal_limit: 2,
            max_showings: 4,
            trends_url: "https://app.powerbi.com/".to_string(),
            escalation_contact:
                "You can reach a counselor any time at 1-800-273-8255 or text HOME to 741741."
                    .to_string(),
            dispatch_routes: BTreeMap::from([("q_chitchat".to_string(), CHITCHAT.to_string())]),
        }
    }
}

/// Collaborators the dialogs reach through ports.
#[derive(Clone)]
pub struct DialogServices {
    pub auth: Arc<dyn AuthProvider>,
    pub content: Arc<dyn ContentSource>,
    pub skills: Arc<dyn SkillHandler>,
    pub skill_catalog: SkillCatalog,
    pub skill_retry: RetryPolicy,
}

/// Registers every concrete dialog plus one relay dialog per catalog skill.
pub fn build_registry(services: &DialogServices, settings: &DialogSettings) -> DialogRegistry {
    let mut registry = DialogRegistry::new()
        .with(Arc::new(MainDialog::new(
            services.skill_catalog.clone(),
            settings.clone(),
        )))
        .with(Arc::new(LoginDialog::new(services.auth.clone())))
        .with(Arc::new(OnboardingDialog))
        .with(Arc::new(EntertainDialog::new(
            services.content.clone(),
            settings.refusal_limit,
            settings.max_showings,
        )))
        .with(Arc::new(StressDialog))
        .with(Arc::new(StressHandlingDialog))
        .with(Arc::new(HighStressDialog))
        .with(Arc::new(BreatherDialog::new(services.content.clone())))
        .with(Arc::new(ChitchatDialog::new(services.content.clone())))
        .with(Arc::new(EscalateDialog::new(settings.escalation_contact.clone())))
        .with(Arc::new(SwitchSkillDialog));

    for skill in services.skill_catalog.iter() {
        let dialog: Arc<dyn Dialog> = Arc::new(SkillDialog::new(
            skill.clone(),
            services.skills.clone(),
            services.skill_retry,
        ));
        registry.register(dialog);
    }
    registry
}

/// A yes/no answer typed freely: yes/no words first, then the general
/// model's Confirm intent. Anything else counts as no.
pub(crate) fn is_affirmative(turn: &TurnContext, input: &StepInput) -> bool {
    match input {
        StepInput::Confirmed(answer) => *answer,
        StepInput::Text(text) => recognize_confirmation(text).unwrap_or_else(|| {
            matches!(
                turn.recognition().general_intent(),
                Some((GlobalIntent::Confirm, _))
            )
        }),
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::domain::interruption::{Classification, Recognition};
    use crate::domain::user::UserState;

    #[test]
    fn registry_holds_every_dialog_and_skill() {
        let manager = default_manager();
        let registry = manager.registry();

        for id in [
            MAIN,
            LOGIN,
            ONBOARDING,
            ENTERTAIN,
            STRESS,
            STRESS_HANDLING,
            HIGH_STRESS,
            BREATHER,
            CHITCHAT,
            ESCALATE,
            SWITCH_SKILL,
        ] {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert!(registry.is_skill("calendarSkill"));
        assert!(!registry.is_skill(MAIN));
    }

    #[test]
    fn affirmative_accepts_yes_words_and_confirm_intent() {
        let mut turn = turn("sounds good", UserState::new());
        assert!(is_affirmative(&turn, &StepInput::text("yes")));
        assert!(!is_affirmative(&turn, &StepInput::text("nope")));
        assert!(!is_affirmative(&turn, &StepInput::text("sounds good")));

        turn.set_recognition(Recognition {
            dispatch: Some(Classification::new("l_general", 0.9)),
            general: Some(Classification::new("Confirm", 0.9)),
        });
        assert!(is_affirmative(&turn, &StepInput::text("sounds good")));
        assert!(!is_affirmative(&turn, &StepInput::Empty));
    }
}

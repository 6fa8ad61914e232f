//! Login dialog: trades a sign-in code for a token.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::LOGIN;
use crate::domain::dialog::{
    Dialog, DialogError, DialogResult, PromptSpec, StepContext, StepInput, StepOutcome,
};
use crate::domain::user::{signed_in_user_id, AuthToken};
use crate::ports::AuthProvider;

const STEPS: &[&str] = &["ask_code", "redeem"];

const FAILED: &str = "Login was not successful please try again.";

pub struct LoginDialog {
    auth: Arc<dyn AuthProvider>,
}

impl LoginDialog {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Dialog for LoginDialog {
    fn id(&self) -> &str {
        LOGIN
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
                PromptSpec::text(
                    "signInCode",
                    "Please sign in, then type the six-digit code you were given.",
                )
                .with_retry("Type the six-digit code from the sign-in page."),
            )),
            _ => {
                let code = input.as_text().unwrap_or_default().to_string();
                let user_id = ctx.turn.user_id().clone();

                let sign_in = match self.auth.redeem(&user_id, &code).await {
                    Ok(Some(sign_in)) => sign_in,
                    Ok(None) => {
                        ctx.turn.send_text(FAILED);
                        return Ok(StepOutcome::done());
                    }
                    Err(err) => {
                        warn!(user_id = %user_id, error = %err, "Sign-in failed");
                        ctx.turn.send_text(FAILED);
                        return Ok(StepOutcome::done());
                    }
                };

                let signed_in_id = signed_in_user_id(&sign_in.profile.upn);
                let user = ctx.turn.user_mut();
                user.auth_token = Some(AuthToken::new(sign_in.token, sign_in.expires_at));
                user.onboarding.signed_in_user_id = Some(signed_in_id.clone());
                if !user.onboarding.has_name() {
                    user.onboarding.name = sign_in.profile.given_name.clone();
                }

                let greeting = match user.onboarding.name.as_deref() {
                    Some(name) if !name.trim().is_empty() => {
                        format!("Hi {}! You are now logged in.", name)
                    }
                    _ => "You are now logged in.".to_string(),
                };
                info!(user_id = %user_id, "User signed in");
                ctx.turn.send_text(greeting);

                Ok(StepOutcome::Complete(DialogResult::with_value(
                    json!({ "signedInUserId": signed_in_id }),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::adapters::auth::InMemoryAuthProvider;
    use crate::adapters::skills::ScriptedSkillHandler;
    use crate::domain::dialog::{DialogOptions, DialogStack, TurnStatus};
    use crate::domain::user::UserState;
    use crate::ports::AuthError;

    async fn start(manager: &crate::domain::dialog::DialogStackManager) -> DialogStack {
        let mut stack = DialogStack::new();
        let mut first = turn("hi", UserState::new());
        manager
            .begin(&mut stack, &mut first, LOGIN, DialogOptions::None)
            .await
            .unwrap();
        stack
    }

    #[tokio::test]
    async fn valid_code_stores_token_and_name() {
        let auth = InMemoryAuthProvider::new().with_code("123456", "sam@contoso.com", Some("Sam"));
        let manager = manager(&services(auth, ScriptedSkillHandler::new()));
        let mut stack = start(&manager).await;

        let (status, user, said) = reply(&manager, &mut stack, UserState::new(), "123456").await;

        assert!(status.is_complete());
        assert!(user.auth_token.is_some());
        assert_eq!(user.onboarding.name.as_deref(), Some("Sam"));
        assert_eq!(
            user.onboarding.signed_in_user_id,
            Some(signed_in_user_id("sam@contoso.com"))
        );
        assert_eq!(said, vec!["Hi Sam! You are now logged in."]);
    }

    #[tokio::test]
    async fn existing_name_is_kept() {
        let auth = InMemoryAuthProvider::new().with_code("123456", "sam@contoso.com", Some("Samuel"));
        let manager = manager(&services(auth, ScriptedSkillHandler::new()));
        let mut stack = start(&manager).await;
        let mut user = UserState::new();
        user.onboarding.name = Some("Sam".to_string());

        let (_, user, said) = reply(&manager, &mut stack, user, "123456").await;

        assert_eq!(user.onboarding.name.as_deref(), Some("Sam"));
        assert_eq!(said, vec!["Hi Sam! You are now logged in."]);
    }

    #[tokio::test]
    async fn bad_code_completes_without_token() {
        let manager = default_manager();
        let mut stack = start(&manager).await;

        let (status, user, said) = reply(&manager, &mut stack, UserState::new(), "abc").await;

        assert_eq!(status, TurnStatus::Complete(DialogResult::empty()));
        assert!(user.auth_token.is_none());
        assert_eq!(said, vec![FAILED]);
    }

    #[tokio::test]
    async fn provider_outage_reads_as_failed_login() {
        let auth = InMemoryAuthProvider::new()
            .with_error(AuthError::ServiceUnavailable("down".to_string()));
        let manager = manager(&services(auth, ScriptedSkillHandler::new()));
        let mut stack = start(&manager).await;

        let (status, _, said) = reply(&manager, &mut stack, UserState::new(), "123456").await;

        assert!(status.is_complete());
        assert_eq!(said, vec![FAILED]);
    }
}

//! Error taxonomy of the dialog engine.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogError {
    /// Begin or Replace named a dialog that is not registered.
    #[error("Dialog '{0}' is not registered")]
    UnknownDialog(String),

    /// Continue was called on an empty stack.
    #[error("No active dialog")]
    NoActiveDialog,

    /// An external skill failed or timed out.
    #[error("Skill '{skill_id}' unavailable: {reason}")]
    SkillUnavailable { skill_id: String, reason: String },

    /// The session store could not load or save state.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The user's reply did not match what the step expected.
    #[error("Input for prompt '{prompt_id}' was not recognized")]
    ValidationFailure { prompt_id: String },

    /// Options did not match the dialog being started.
    #[error("Dialog '{dialog_id}' rejected options: {reason}")]
    InvalidOptions { dialog_id: String, reason: String },

    /// Same-turn Next/Replace chains ran past the configured budget.
    #[error("Step budget of {limit} exhausted in dialog '{dialog_id}'")]
    StepLimitExceeded { dialog_id: String, limit: usize },

    /// A step failed in a way its parent can handle.
    #[error("Step '{step}' of dialog '{dialog_id}' failed: {reason}")]
    StepFailed {
        dialog_id: String,
        step: String,
        reason: String,
    },
}

impl DialogError {
    pub fn invalid_options(dialog_id: impl Into<String>, reason: impl Into<String>) -> Self {
        DialogError::InvalidOptions {
            dialog_id: dialog_id.into(),
            reason: reason.into(),
        }
    }

    pub fn step_failed(
        dialog_id: impl Into<String>,
        step: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DialogError::StepFailed {
            dialog_id: dialog_id.into(),
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors abort the turn; the rest are recovered inside the stack.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DialogError::UnknownDialog(_)
                | DialogError::PersistenceFailure(_)
                | DialogError::InvalidOptions { .. }
                | DialogError::StepLimitExceeded { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DialogError::UnknownDialog(_) => ErrorCode::UnknownDialog,
            DialogError::NoActiveDialog => ErrorCode::InternalError,
            DialogError::SkillUnavailable { .. } => ErrorCode::SkillUnavailable,
            DialogError::PersistenceFailure(_) => ErrorCode::PersistenceFailure,
            DialogError::ValidationFailure { .. } => ErrorCode::ValidationFailed,
            DialogError::InvalidOptions { .. } => ErrorCode::InvalidOptions,
            DialogError::StepLimitExceeded { .. } => ErrorCode::StepLimitExceeded,
            DialogError::StepFailed { .. } => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_are_classified() {
        assert!(DialogError::UnknownDialog("x".into()).is_fatal());
        assert!(DialogError::PersistenceFailure("disk".into()).is_fatal());
        assert!(DialogError::invalid_options("entertain", "bad").is_fatal());
        assert!(!DialogError::NoActiveDialog.is_fatal());
        assert!(!DialogError::step_failed("login", "redeem", "boom").is_fatal());
        assert!(!DialogError::ValidationFailure {
            prompt_id: "name".into()
        }
        .is_fatal());
    }

    #[test]
    fn codes_follow_the_variant() {
        assert_eq!(
            DialogError::UnknownDialog("ghost".into()).code(),
            ErrorCode::UnknownDialog
        );
        assert_eq!(
            DialogError::step_failed("main", "phase", "bad").code(),
            ErrorCode::InternalError
        );
    }
}

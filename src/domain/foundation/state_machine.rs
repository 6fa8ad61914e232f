//! State machine trait for phase and status enums.
//!
//! Gives lifecycle enums (root dialog phases, prompt status) one interface
//! for checking and performing transitions.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their valid transitions and get validated
/// transition helpers for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for RootPhase {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         self.valid_transitions().contains(target)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             NeedsLogin => vec![NeedsOnboarding, Done],
///             // ... etc
///         }
///     }
/// }
///
/// let phase = RootPhase::NeedsLogin.transition_to(RootPhase::NeedsOnboarding)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PromptStatus {
        Pending,
        Awaiting,
        Answered,
        Abandoned,
    }

    impl StateMachine for PromptStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use PromptStatus::*;
            match self {
                Pending => vec![Awaiting],
                Awaiting => vec![Awaiting, Answered, Abandoned],
                Answered | Abandoned => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let status = PromptStatus::Pending.transition_to(PromptStatus::Awaiting);
        assert_eq!(status, Ok(PromptStatus::Awaiting));
    }

    #[test]
    fn transition_to_allows_self_loop_when_listed() {
        let status = PromptStatus::Awaiting.transition_to(PromptStatus::Awaiting);
        assert_eq!(status, Ok(PromptStatus::Awaiting));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = PromptStatus::Pending.transition_to(PromptStatus::Answered);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "state_transition"
        ));
    }

    #[test]
    fn is_terminal_only_for_finished_states() {
        assert!(PromptStatus::Answered.is_terminal());
        assert!(PromptStatus::Abandoned.is_terminal());
        assert!(!PromptStatus::Pending.is_terminal());
        assert!(!PromptStatus::Awaiting.is_terminal());
    }
}

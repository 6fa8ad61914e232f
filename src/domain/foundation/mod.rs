//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types, and the state machine trait
//! that the rest of the engine builds on.

mod errors;
mod ids;
mod state_machine;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{ActivityId, ConversationId, UserId};
pub use state_machine::StateMachine;

//! Domain layer containing the dialog engine and its domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `dialog` - Dialog stack, step sequencing, prompts and turn context
//! - `interruption` - Global intents and the interruption policy
//! - `user` - Per-user onboarding record, credential and identity

pub mod dialog;
pub mod foundation;
pub mod interruption;
pub mod user;

//! Application layer - The turn dispatcher and the dialogs it drives.
//!
//! This layer wires the pure dialog engine in `domain` to the ports:
//! it loads and saves state, calls the classifier with retries, and
//! registers the concrete dialogs.

pub mod dialogs;
pub mod dispatcher;
pub mod resilience;
pub mod state_codec;

pub use dialogs::{build_registry, DialogServices, DialogSettings};
pub use dispatcher::{
    DispatchError, Dispatcher, DispatcherSettings, ProcessTurnCommand, ProcessTurnResult,
};
pub use resilience::{RetryPolicy, Retryable};

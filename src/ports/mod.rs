//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! ## State
//!
//! - `SessionStore` - Per-conversation and per-user state blobs
//!
//! ## Collaborators
//!
//! - `NluClassifier` - Dispatch and general intent recognition
//! - `SkillHandler` - Externally hosted conversational skills
//! - `AuthProvider` - Sign-in code redemption and sign-out
//! - `ContentSource` - Entertainment, chit-chat and meditation content

mod auth_provider;
mod content_source;
mod nlu_classifier;
mod session_store;
mod skill_handler;

pub use auth_provider::{AuthError, AuthProvider, SignIn, SignInProfile};
pub use content_source::{ContentError, ContentKind, ContentSource};
pub use nlu_classifier::{NluClassifier, NluError};
pub use session_store::{
    ScopeKey, ScopeKind, SessionStore, SessionStoreError, StateBlob, STATE_SCHEMA_VERSION,
};
pub use skill_handler::{SkillError, SkillHandler, SkillReply, SkillTurn};

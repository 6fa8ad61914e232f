//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `storage` - Session stores (in-memory, YAML files)
//! - `nlu` - Intent classifiers (keyword rules, scripted)
//! - `skills` - Skill handlers (HTTP, scripted)
//! - `auth` - Sign-in code redemption
//! - `content` - Entertainment and small-talk content
//! - `http` - The axum channel endpoint

pub mod auth;
pub mod content;
pub mod http;
pub mod nlu;
pub mod skills;
pub mod storage;

pub use auth::InMemoryAuthProvider;
pub use content::StaticContentSource;
pub use nlu::{KeywordClassifier, ScriptedClassifier};
pub use skills::{HttpSkillHandler, ScriptedSkillHandler, SkillEndpoint};
pub use storage::{FileSessionStore, InMemorySessionStore};

//! Skill Adapters
//!
//! Implementations of the SkillHandler port.
//!
//! - **HttpSkillHandler** - Remote skills reached over JSON/HTTP
//! - **ScriptedSkillHandler** - Queued replies for tests

mod http_skill_handler;
mod scripted_skill_handler;

pub use http_skill_handler::{HttpSkillHandler, SkillEndpoint};
pub use scripted_skill_handler::{ScriptedSkillHandler, SkillCall};

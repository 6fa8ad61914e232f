//! Content Source Port - Interface for the material dialogs show the user.
//!
//! Entertainment, chit-chat answers and meditation media come from outside
//! the engine. Dialogs only decide when to show them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::dialog::Activity;

/// Kinds of entertainment offered in rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Music,
    Joke,
    Article,
}

impl ContentKind {
    /// Rotation order.
    pub const ALL: [ContentKind; 3] = [ContentKind::Music, ContentKind::Joke, ContentKind::Article];

    /// Kind at `index`, wrapping around the rotation.
    pub fn at(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Question asked before showing content of this kind.
    pub fn offer(&self) -> &'static str {
        match self {
            ContentKind::Music => "Would you like to listen to some music? \u{1F3BC}",
            ContentKind::Joke => "Would you like to hear a joke? \u{1F609}",
            ContentKind::Article => "Would you like to read an article?",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Music => write!(f, "music"),
            ContentKind::Joke => write!(f, "joke"),
            ContentKind::Article => write!(f, "article"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("content unavailable: {0}")]
    Unavailable(String),

    #[error("no {0} content found")]
    NotFound(ContentKind),
}

/// Port for fetching user-facing content
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// One piece of entertainment, chosen with the user's interests in mind.
    async fn entertainment(
        &self,
        kind: ContentKind,
        interests: &[String],
    ) -> Result<Activity, ContentError>;

    /// An answer to small talk, or `None` when there is nothing to say.
    async fn chitchat(&self, text: &str) -> Result<Option<String>, ContentError>;

    /// A short guided meditation.
    async fn meditation(&self) -> Result<Activity, ContentError>;
}

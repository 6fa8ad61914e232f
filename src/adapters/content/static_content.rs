//! Static Content Source
//!
//! Serves a fixed catalogue of entertainment, small-talk answers and one
//! guided meditation. Music and articles are picked from the user's first
//! interest when there is one; jokes rotate.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::dialog::{Activity, Attachment};
use crate::ports::{ContentError, ContentKind, ContentSource};

static JOKES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "I told my computer I needed a break, and it said: no problem, I'll go to sleep.",
        "Why did the scarecrow get promoted? He was outstanding in his field.",
        "I'm reading a book about anti-gravity. It's impossible to put down.",
    ]
});

static SMALL_TALK: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("how are you", "I'm doing great, thanks for asking! How about you?"),
        ("who are you", "I'm your virtual work friend. I'm here to listen and help you unwind."),
        ("thank", "You're very welcome!"),
        ("hello", "Hello there!"),
        ("hi", "Hi! Nice to hear from you."),
        ("bored", "How about a quick stretch? Stand up, reach for the ceiling and breathe."),
        ("tired", "Sounds like a long day. A short walk or a glass of water can work wonders."),
    ]
});

const DEFAULT_MUSIC_QUERY: &str = "jazz music";
const DEFAULT_READING_QUERY: &str = "workplace wellbeing";

/// Content source backed by built-in material.
#[derive(Debug, Default)]
pub struct StaticContentSource {
    next_joke: AtomicUsize,
}

impl StaticContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn query_for(interests: &[String], fallback: &str) -> String {
        interests
            .iter()
            .map(|i| i.trim())
            .find(|i| !i.is_empty())
            .unwrap_or(fallback)
            .replace(' ', "+")
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn entertainment(
        &self,
        kind: ContentKind,
        interests: &[String],
    ) -> Result<Activity, ContentError> {
        let activity = match kind {
            ContentKind::Music => {
                let query = Self::query_for(interests, DEFAULT_MUSIC_QUERY);
                Activity::default().with_attachment(
                    Attachment::link(
                        "video/mp4",
                        format!("https://www.youtube.com/results?search_query={}", query),
                    )
                    .named(format!("Music for you: {}", query.replace('+', " "))),
                )
            }
            ContentKind::Joke => {
                let index = self.next_joke.fetch_add(1, Ordering::Relaxed) % JOKES.len();
                Activity::message(JOKES[index])
            }
            ContentKind::Article => {
                let query = Self::query_for(interests, DEFAULT_READING_QUERY);
                Activity::message(
                    "I think you might like these articles based on your preferences \u{1F600}",
                )
                .with_attachment(
                    Attachment::link(
                        "text/html",
                        format!("https://www.bing.com/news/search?q={}", query),
                    )
                    .named("Open"),
                )
            }
        };
        Ok(activity)
    }

    async fn chitchat(&self, text: &str) -> Result<Option<String>, ContentError> {
        let normalized = text.to_lowercase();
        Ok(SMALL_TALK
            .iter()
            .find(|(needle, _)| normalized.contains(needle))
            .map(|(_, answer)| answer.to_string()))
    }

    async fn meditation(&self) -> Result<Activity, ContentError> {
        Ok(Activity::default().with_attachment(
            Attachment::link(
                "video/mp4",
                "https://www.youtube.com/watch?v=inpok4MKVLM&t=14s",
            )
            .named("5 minutes Meditation"),
        ))
    }
}

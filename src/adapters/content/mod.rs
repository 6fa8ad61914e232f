//! Content Adapters
//!
//! - **StaticContentSource** - Built-in jokes, links and small talk

mod static_content;

pub use static_content::StaticContentSource;

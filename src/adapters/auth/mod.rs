//! Authentication adapters.
//!
//! Implementations of the `AuthProvider` port:
//!
//! - `in_memory` - Registered codes, or any six-digit code in development

mod in_memory;

pub use in_memory::InMemoryAuthProvider;

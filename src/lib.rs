//! Dialog Engine - Turn-based conversational orchestration
//!
//! This crate resumes, starts and interrupts nested multi-step dialogs one
//! inbound message at a time, persisting the dialog stack between turns so
//! every conversation picks up exactly where it left off.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

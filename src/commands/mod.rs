//! One handler per CLI verb.
//!
//! Handlers write their human-readable output to the supplied writer and
//! take a [`Prompt`] when they need confirmation, so they can run against a
//! test double as well as a terminal.

pub mod clean;
pub mod delete;
pub mod download;
pub mod list;
pub mod prompt;
pub mod upload;
pub mod version;

pub use prompt::{Prompt, TerminalPrompt};

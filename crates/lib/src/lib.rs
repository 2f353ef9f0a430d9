//! # coachvoice
//!
//! The domain library for the coach voice-training application: the fixed
//! question bank, the completeness scorer, the answer store, the
//! commit/versioning engine, versioned knowledge retrieval, the prompt
//! assembler, and the adapters around the external AI provider (chat,
//! transcription, structured analysis).
//!
//! The HTTP surface lives in the `coachvoice-server` crate; identity lives
//! in `core-access`. This crate only knows about a `turso::Database` and a
//! set of provider traits.

pub mod analysis;
pub mod chatlog;
pub mod completeness;
pub mod errors;
pub mod projects;
pub mod prompts;
pub mod providers;
pub mod questions;
pub mod text;
pub mod trainer;
pub mod trends;
pub mod types;

pub use errors::AssistantError;

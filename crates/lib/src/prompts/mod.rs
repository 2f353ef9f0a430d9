//! # Prompt Templates
//!
//! This module centralizes every prompt the application sends to the AI
//! provider. `persona` holds the fixed chat persona and the system-prompt
//! assembler; `tasks` holds the static prompts for the structured tasks
//! (prefill, transcript analysis, trend analysis, insight generation).

pub mod persona;
pub mod tasks;

pub use persona::{base_instructions, build_system_prompt, NO_NOTES_PLACEHOLDER};

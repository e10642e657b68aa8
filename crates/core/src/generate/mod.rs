//! Answer generation against a hosted chat-completions API.

mod client;
mod prompt;


pub use client::{DEFAULT_API_BASE, GenerationClient};
pub use prompt::{PromptConfig, build_refine_prompt, build_system_prompt};

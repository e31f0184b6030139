//! Prompt construction for the verifier and translator

pub mod prompt;

pub use prompt::PromptBuilder;

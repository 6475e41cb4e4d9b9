mod client;
mod types;

pub use client::{CompletionClient, OpenAiCompletionClient};
pub use types::{CompletionError, CompletionParams, non_empty_reply};

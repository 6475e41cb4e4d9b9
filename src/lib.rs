pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod relay;
pub mod server;

pub use error::{Error, Result};

use std::time::Duration;
use thiserror::Error;

/// Why a completion attempt produced no usable reply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("provider returned an empty reply")]
    EmptyReply,
}

/// Static request parameters, identical for every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Returns the reply if it carries any non-whitespace content.
pub fn non_empty_reply(content: Option<String>) -> Result<String, CompletionError> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(CompletionError::EmptyReply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_reply() {
        assert_eq!(
            non_empty_reply(Some("Hi there!".to_string())),
            Ok("Hi there!".to_string())
        );
        assert_eq!(non_empty_reply(None), Err(CompletionError::EmptyReply));
        assert_eq!(
            non_empty_reply(Some(String::new())),
            Err(CompletionError::EmptyReply)
        );
        assert_eq!(
            non_empty_reply(Some(" \n\t".to_string())),
            Err(CompletionError::EmptyReply)
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = CompletionError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "provider did not answer within 30s");
    }
}

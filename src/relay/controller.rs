use super::fsm::{RelayCycle, RelayEvent};
use crate::{
    Error, Result,
    history::{Message, MessageStore},
    llm::{CompletionClient, CompletionError, non_empty_reply},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Bot text stored and returned whenever no genuine reply could be stored.
pub const FALLBACK_MESSAGE: &str = "I apologize, but I encountered an error. Please try again.";

/// Runs relay cycles: store the user text, ask the provider, store the answer.
///
/// Shared between requests; holds no per-request state.
pub struct Relay {
    store: Arc<dyn MessageStore>,
    completion: Arc<dyn CompletionClient>,
    retries: u32,
}

impl Relay {
    pub fn new(store: Arc<dyn MessageStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            completion,
            retries: 0,
        }
    }

    /// Extra completion attempts before falling back.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Handles one incoming user text.
    ///
    /// Returns `[user, bot]` where `bot` is either the provider reply or the
    /// fallback apology. Completion failures never surface as errors. If the
    /// user message cannot be stored but the apology can, the result is the
    /// single apology message.
    pub async fn handle_incoming(&self, text: Option<&str>) -> Result<Vec<Message>> {
        let text = validate(text)?;
        let mut cycle = RelayCycle::new();

        let user_message = match self.store.append(text, false).await {
            Ok(message) => {
                cycle.transition(RelayEvent::UserSaved)?;
                message
            }
            Err(e) => {
                warn!("Failed to store user message: {}", e);
                let fallback = self.store_fallback(&mut cycle, e).await?;
                respond(&mut cycle)?;
                return Ok(vec![fallback]);
            }
        };
        info!("Stored user message {}", user_message.id);

        let bot_message = match self.request_reply(text).await {
            Ok(reply) => match self.store.append(&reply, true).await {
                Ok(message) => {
                    cycle.transition(RelayEvent::ReplySaved)?;
                    message
                }
                Err(e) => {
                    warn!("Failed to store reply for message {}: {}", user_message.id, e);
                    self.store_fallback(&mut cycle, e).await?
                }
            },
            Err(e) => {
                warn!("Completion failed for message {}: {}", user_message.id, e);
                self.store_fallback(&mut cycle, Error::internal(e.to_string()))
                    .await?
            }
        };

        respond(&mut cycle)?;
        info!(
            "Relay cycle complete: user {} -> bot {}",
            user_message.id, bot_message.id
        );
        Ok(vec![user_message, bot_message])
    }

    /// Every stored message, oldest first.
    pub async fn history(&self) -> Result<Vec<Message>> {
        self.store.list_all().await
    }

    pub async fn message(&self, id: i64) -> Result<Message> {
        self.store
            .find(id)
            .await?
            .ok_or(Error::NotFound { id })
    }

    async fn request_reply(&self, text: &str) -> std::result::Result<String, CompletionError> {
        let mut attempt = 0;
        loop {
            let result = self
                .completion
                .complete(text)
                .await
                .and_then(|reply| non_empty_reply(Some(reply)));

            match result {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Completion attempt {} of {} failed: {}",
                        attempt,
                        self.retries + 1,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Stores the apology. When that also fails the error of the write that
    /// sent us here is returned, since it names the original problem.
    async fn store_fallback(&self, cycle: &mut RelayCycle, cause: Error) -> Result<Message> {
        match self.store.append(FALLBACK_MESSAGE, true).await {
            Ok(message) => {
                cycle.transition(RelayEvent::FallbackSaved)?;
                Ok(message)
            }
            Err(fallback_err) => {
                error!(
                    "Failed to store fallback message: {} (after: {})",
                    fallback_err, cause
                );
                if cause.is_storage() {
                    Err(cause)
                } else {
                    Err(fallback_err)
                }
            }
        }
    }
}

fn respond(cycle: &mut RelayCycle) -> Result<()> {
    let state = cycle.transition(RelayEvent::Responded)?;
    debug_assert!(state.is_terminal(), "relay cycle ended in {state:?}");
    Ok(())
}

fn validate(text: Option<&str>) -> Result<&str> {
    match text {
        None => Err(Error::validation("text is required")),
        Some("") => Err(Error::validation("text must not be empty")),
        Some(text) => Ok(text),
    }
}

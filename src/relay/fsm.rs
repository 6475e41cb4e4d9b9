use crate::{Error, Result};
use tracing::{debug, warn};

/// Progress of a single relay cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Start,
    UserPersisted,
    BotPersisted,
    FallbackPersisted,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    UserSaved,
    ReplySaved,
    FallbackSaved,
    Responded,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        self == RelayState::Done
    }
}

/// Checked state tracker for one request. Never observable outside the relay.
#[derive(Debug)]
pub struct RelayCycle {
    state: RelayState,
}

impl Default for RelayCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayCycle {
    pub fn new() -> Self {
        Self {
            state: RelayState::Start,
        }
    }

    pub fn current_state(&self) -> RelayState {
        self.state
    }

    pub fn transition(&mut self, event: RelayEvent) -> Result<RelayState> {
        let next = match (self.state, event) {
            (RelayState::Start, RelayEvent::UserSaved) => RelayState::UserPersisted,
            (RelayState::UserPersisted, RelayEvent::ReplySaved) => RelayState::BotPersisted,
            (RelayState::UserPersisted, RelayEvent::FallbackSaved) => {
                RelayState::FallbackPersisted
            }
            // User write failed but the apology could still be stored.
            (RelayState::Start, RelayEvent::FallbackSaved) => RelayState::FallbackPersisted,
            (RelayState::BotPersisted | RelayState::FallbackPersisted, RelayEvent::Responded) => {
                RelayState::Done
            }
            (state, event) => {
                warn!("Invalid relay transition from {:?} with {:?}", state, event);
                return Err(Error::InvalidTransition {
                    current: format!("{state:?}"),
                    requested: format!("{event:?}"),
                });
            }
        };

        debug!("Relay cycle {:?} -> {:?} ({:?})", self.state, next, event);
        self.state = next;
        Ok(next)
    }
}

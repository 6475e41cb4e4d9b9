mod controller;
pub mod fsm;

pub use controller::{FALLBACK_MESSAGE, Relay};
pub use fsm::{RelayCycle, RelayEvent, RelayState};

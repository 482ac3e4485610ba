//! Bus transport contract and session handling
//!
//! [`SpiBus`] is what a programmer backend implements. [`BusSession`] wraps
//! one and enforces the acquire/release discipline; [`HeldBus`] is the scoped
//! guard used for multi-transaction commands.

mod session;
mod traits;

pub use session::{BusSession, BusState, HeldBus};
pub use traits::*;

//! Flash identity table
//!
//! Static data mapping manufacturer bytes and device codes to vendor and
//! model names. Nothing here touches the bus.

mod table;
mod types;

pub use table::IdentityTable;
pub use types::*;

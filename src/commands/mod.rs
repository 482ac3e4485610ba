//! CLI command implementations

mod list;
pub mod probe;

pub use list::{list_chips, list_programmers};

//! SPI flash command definitions

pub mod opcodes;

pub use opcodes::*;

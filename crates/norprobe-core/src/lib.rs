//! norprobe-core - SPI NOR flash identification
//!
//! This crate identifies a 25-series SPI NOR flash chip over any bus
//! transport that implements [`bus::SpiBus`]. It is `no_std` compatible but
//! needs an allocator for the response buffers and diagnostic lines.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Error`]
//! - `serde` - Derive `Serialize` for the probe report types
//!
//! # Example
//!
//! ```ignore
//! use norprobe_core::bus::{BusSession, SpiBus};
//! use norprobe_core::probe;
//!
//! fn identify<B: SpiBus>(bus: B) {
//!     let mut session = BusSession::new(bus);
//!     let report = probe::probe(&mut session);
//!     for line in report.lines() {
//!         println!("{}", line);
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod probe;
pub mod protocol;
pub mod spi;

pub use error::{Error, Result};

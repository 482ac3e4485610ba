//! SPI25 identification command sequences
//!
//! These functions only move bytes; interpreting them is left to
//! [`crate::probe::decode`].

use alloc::vec::Vec;

use crate::bus::{BusSession, SpiBus};
use crate::error::{Error, Result};
use crate::spi::opcodes;

/// Run the legacy Manufacturer/Device ID command (REMS, 0x90)
///
/// This is a single full-duplex transaction, so the bus does not need to be
/// acquired. The raw answer frame is returned; the manufacturer byte sits at
/// [`opcodes::REMS_MANUFACTURER_OFFSET`] and the device byte right after it.
pub fn read_manufacturer_id<B: SpiBus>(
    session: &mut BusSession<B>,
    timeout_ms: Option<u32>,
) -> Result<Vec<u8>> {
    session.write_read(&opcodes::rems_frame(), timeout_ms)
}

/// Read the JEDEC ID (RDID, 0x9F)
///
/// The opcode and the three response bytes travel in separate transactions,
/// so the bus is held across both. It is released on every path, including
/// a failed write or read.
///
/// Returns `[manufacturer, memory_type, capacity]`.
pub fn read_jedec_id<B: SpiBus>(
    session: &mut BusSession<B>,
    timeout_ms: Option<u32>,
) -> Result<[u8; opcodes::RDID_RESPONSE_LEN]> {
    let mut held = session.hold()?;
    held.write(&[opcodes::RDID], timeout_ms)?;
    let rx = held.read(opcodes::RDID_RESPONSE_LEN, timeout_ms)?;

    // The session is released even if the transport complains; the ID
    // bytes are already in hand.
    if let Err(e) = held.release() {
        log::warn!("spi25: release after RDID failed: {}", e);
    }

    let actual = rx.len();
    rx.try_into().map_err(|_| Error::MalformedResponse {
        expected: opcodes::RDID_RESPONSE_LEN,
        actual,
    })
}

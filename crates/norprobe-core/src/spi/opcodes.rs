//! SPI flash identification opcodes and frame layouts
//!
//! Only the two identification commands are defined here. Both are answered
//! by practically every 25-series NOR flash.

// ============================================================================
// Identification
// ============================================================================

/// Read Electronic Manufacturer & Device ID (legacy)
///
/// Followed by a 24-bit address of zero. The chip then shifts out the
/// manufacturer byte and the device byte.
pub const REMS: u8 = 0x90;
/// Read JEDEC ID (manufacturer, memory type, capacity)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Frame layouts
// ============================================================================

/// Length of a REMS full-duplex frame: opcode, 3 address bytes, 2 ID bytes
pub const REMS_FRAME_LEN: usize = 6;
/// Offset of the manufacturer byte in a REMS frame
pub const REMS_MANUFACTURER_OFFSET: usize = 4;
/// Offset of the device byte in a REMS frame
pub const REMS_DEVICE_OFFSET: usize = 5;
/// Number of bytes returned after RDID
pub const RDID_RESPONSE_LEN: usize = 3;

/// Build the REMS request frame (opcode, zero address, dummy bytes)
pub const fn rems_frame() -> [u8; REMS_FRAME_LEN] {
    [REMS, 0x00, 0x00, 0x00, 0x00, 0x00]
}

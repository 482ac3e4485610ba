//! Identity table entry types

/// A flash vendor, keyed by its JEDEC manufacturer byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vendor {
    /// JEDEC manufacturer ID
    pub id: u8,
    /// Vendor name (e.g., "Winbond")
    pub name: &'static str,
}

/// A flash model, keyed by manufacturer byte and a device code
///
/// The meaning of `code` depends on the table the entry lives in: the
/// single device byte of a REMS answer, or the 16-bit
/// `memory_type << 8 | capacity` word of a JEDEC ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipId {
    /// JEDEC manufacturer ID
    pub manufacturer: u8,
    /// Device code
    pub code: u16,
    /// Chip model name (e.g., "W25Q32")
    pub name: &'static str,
    /// Total flash size in bytes
    pub total_size: u32,
}

impl ChipId {
    /// Get the ID as a 24-bit value (manufacturer << 16 | code)
    pub fn jedec_id(&self) -> u32 {
        ((self.manufacturer as u32) << 16) | (self.code as u32)
    }

    /// Check if this entry matches the given manufacturer and code
    pub fn matches(&self, manufacturer: u8, code: u16) -> bool {
        self.manufacturer == manufacturer && self.code == code
    }
}

/// JEDEC manufacturer IDs
pub mod manufacturer {
    /// Winbond
    pub const WINBOND: u8 = 0xEF;
}

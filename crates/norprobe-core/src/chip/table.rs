//! Built-in identity table

use super::manufacturer;
use super::types::{ChipId, Vendor};

const KIB: u32 = 1024;
const MIB: u32 = 1024 * KIB;

const VENDORS: &[Vendor] = &[Vendor {
    id: manufacturer::WINBOND,
    name: "Winbond",
}];

/// Models reported by REMS (0x90), keyed by the device byte
const REMS_DEVICES: &[ChipId] = &[ChipId {
    manufacturer: manufacturer::WINBOND,
    code: 0x15,
    name: "W25Q32",
    total_size: 4 * MIB,
}];

/// Models reported by RDID (0x9F), keyed by `memory_type << 8 | capacity`
const JEDEC_DEVICES: &[ChipId] = &[
    ChipId {
        manufacturer: manufacturer::WINBOND,
        code: 0x4016,
        name: "W25Q32",
        total_size: 4 * MIB,
    },
    ChipId {
        manufacturer: manufacturer::WINBOND,
        code: 0x4015,
        name: "W25Q16",
        total_size: 2 * MIB,
    },
    ChipId {
        manufacturer: manufacturer::WINBOND,
        code: 0x4014,
        name: "W25Q80",
        total_size: MIB,
    },
];

static BUILTIN: IdentityTable = IdentityTable::new(VENDORS, REMS_DEVICES, JEDEC_DEVICES);

/// Immutable lookup from ID bytes to vendor and model names
///
/// All lookups return `None` when the key is not in the table.
#[derive(Debug, Clone, Copy)]
pub struct IdentityTable {
    vendors: &'static [Vendor],
    rems: &'static [ChipId],
    jedec: &'static [ChipId],
}

impl IdentityTable {
    /// Build a table from static entry lists
    pub const fn new(
        vendors: &'static [Vendor],
        rems: &'static [ChipId],
        jedec: &'static [ChipId],
    ) -> Self {
        Self {
            vendors,
            rems,
            jedec,
        }
    }

    /// The table compiled into the crate
    pub fn builtin() -> &'static IdentityTable {
        &BUILTIN
    }

    /// Look up a vendor name by manufacturer byte
    pub fn vendor_name(&self, manufacturer: u8) -> Option<&'static str> {
        self.vendors
            .iter()
            .find(|v| v.id == manufacturer)
            .map(|v| v.name)
    }

    /// Look up a model by the REMS device byte
    pub fn rems_model(&self, manufacturer: u8, device: u8) -> Option<&'static ChipId> {
        self.rems
            .iter()
            .find(|c| c.matches(manufacturer, device as u16))
    }

    /// Look up a model by the JEDEC capacity code
    ///
    /// The manufacturer byte is not part of the key: parts that answer with a
    /// listed `memory_type << 8 | capacity` word resolve to that model
    /// whoever made them.
    pub fn jedec_model(&self, capacity_code: u16) -> Option<&'static ChipId> {
        self.jedec.iter().find(|c| c.code == capacity_code)
    }

    /// All known vendors
    pub fn vendors(&self) -> &'static [Vendor] {
        self.vendors
    }

    /// All models identifiable through REMS
    pub fn rems_devices(&self) -> &'static [ChipId] {
        self.rems
    }

    /// All models identifiable through RDID
    pub fn jedec_devices(&self) -> &'static [ChipId] {
        self.jedec
    }
}

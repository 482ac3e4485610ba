//! Pure decoding of identification answers
//!
//! Both decoders take raw bytes and an [`IdentityTable`] and return the
//! identity plus the diagnostic lines to show, without any bus access.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use super::DeviceIdentity;
use crate::chip::IdentityTable;
use crate::spi::opcodes::{REMS_DEVICE_OFFSET, REMS_FRAME_LEN, REMS_MANUFACTURER_OFFSET};

/// Manufacturer byte seen when nothing drives MISO low-impedance
const NO_CHIP_LOW: u8 = 0x00;
/// Manufacturer byte seen when MISO floats high
const NO_CHIP_HIGH: u8 = 0xFF;

/// Identity and diagnostic lines for one handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded identity
    pub identity: DeviceIdentity,
    /// Lines to show, in order
    pub messages: Vec<String>,
}

/// Decode a REMS (0x90) answer frame
///
/// Returns `None` if the frame is not exactly [`REMS_FRAME_LEN`] bytes long;
/// such an answer produces no diagnostics at all.
pub fn decode_manufacturer_id(table: &IdentityTable, frame: &[u8]) -> Option<Decoded> {
    if frame.len() != REMS_FRAME_LEN {
        return None;
    }
    let manufacturer = frame[REMS_MANUFACTURER_OFFSET];
    let device = frame[REMS_DEVICE_OFFSET];

    let decoded = if let Some(vendor) = table.vendor_name(manufacturer) {
        let mut messages = vec![format!("Found {} device", vendor)];
        let identity = match table.rems_model(manufacturer, device) {
            Some(chip) => {
                messages.push(format!("Device ID: {}", chip.name));
                DeviceIdentity::Known {
                    vendor,
                    model: chip.name,
                }
            }
            None => {
                messages.push(format!("unknown device ID: {:02x}", device));
                DeviceIdentity::VendorKnownModelUnknown {
                    vendor,
                    model_code: device as u16,
                }
            }
        };
        Decoded { identity, messages }
    } else if manufacturer == NO_CHIP_LOW {
        Decoded {
            identity: DeviceIdentity::AbsentOrUnpowered,
            messages: vec![String::from("chip not connected")],
        }
    } else {
        Decoded {
            identity: DeviceIdentity::Unrecognized {
                vendor_code: manufacturer,
            },
            messages: vec![format!("unknown manufacturer ID: {:02x}", manufacturer)],
        }
    };

    Some(decoded)
}

/// Combine the memory type and capacity bytes of a JEDEC ID
pub fn capacity_code(memory_type: u8, capacity: u8) -> u16 {
    ((memory_type as u16) << 8) | capacity as u16
}

/// Decode a JEDEC ID (`[manufacturer, memory_type, capacity]`)
///
/// The three raw bytes are always reported. The vendor line depends on the
/// manufacturer byte only, the model line on the capacity code only; the
/// identity is [`DeviceIdentity::Known`] when both resolve.
pub fn decode_jedec_id(table: &IdentityTable, id: [u8; 3]) -> Decoded {
    let [manufacturer, memory_type, capacity] = id;
    let code = capacity_code(memory_type, capacity);

    let mut messages = vec![
        format!("JEDEC MF ID: {:02x}", manufacturer),
        format!("JEDEC Memory Type: {:02x}", memory_type),
        format!("JEDEC Capacity ID: {:02x}", capacity),
    ];

    let vendor = table.vendor_name(manufacturer);
    if let Some(vendor) = vendor {
        messages.push(format!("{} device found", vendor));
    }

    let chip = table.jedec_model(code);
    match chip {
        Some(chip) => messages.push(format!("Device: {}", chip.name)),
        None => messages.push(String::from("unknown device")),
    }

    let identity = match (vendor, chip) {
        (Some(vendor), Some(chip)) => DeviceIdentity::Known {
            vendor,
            model: chip.name,
        },
        (Some(vendor), None) => DeviceIdentity::VendorKnownModelUnknown {
            vendor,
            model_code: code,
        },
        (None, _) if manufacturer == NO_CHIP_LOW || manufacturer == NO_CHIP_HIGH => {
            DeviceIdentity::AbsentOrUnpowered
        }
        (None, _) => DeviceIdentity::Unrecognized {
            vendor_code: manufacturer,
        },
    };

    Decoded { identity, messages }
}

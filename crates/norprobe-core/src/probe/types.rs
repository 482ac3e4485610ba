//! Probe result types

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Decoded outcome of one identification handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DeviceIdentity {
    /// Vendor and model both found in the identity table
    Known {
        /// Vendor name
        vendor: &'static str,
        /// Model name
        model: &'static str,
    },
    /// Vendor found, model code not in the table
    VendorKnownModelUnknown {
        /// Vendor name
        vendor: &'static str,
        /// Raw model code as read from the chip
        model_code: u16,
    },
    /// No chip answered (all-zero or floating bus)
    AbsentOrUnpowered,
    /// Manufacturer byte not in the table
    Unrecognized {
        /// Raw manufacturer byte
        vendor_code: u8,
    },
}

impl DeviceIdentity {
    /// Returns true if a chip answered at all
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::AbsentOrUnpowered)
    }

    /// Model name, if the chip was fully identified
    pub fn model(&self) -> Option<&'static str> {
        match self {
            Self::Known { model, .. } => Some(model),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { vendor, model } => write!(f, "{} {}", vendor, model),
            Self::VendorKnownModelUnknown { vendor, model_code } => {
                write!(f, "{} (unknown model 0x{:04x})", vendor, model_code)
            }
            Self::AbsentOrUnpowered => write!(f, "no chip detected"),
            Self::Unrecognized { vendor_code } => {
                write!(f, "unrecognized manufacturer 0x{:02x}", vendor_code)
            }
        }
    }
}

/// Handshake that produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Step {
    /// REMS (0x90) manufacturer/device ID
    ManufacturerId,
    /// RDID (0x9F) JEDEC ID
    JedecId,
}

/// One diagnostic line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Message {
    /// Handshake the line belongs to
    pub step: Step,
    /// Human-readable text
    pub text: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything a probe run produced
///
/// An identity is `None` when its handshake was skipped because of a
/// transport failure or a malformed answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProbeReport {
    /// Result of the REMS handshake
    pub manufacturer_id: Option<DeviceIdentity>,
    /// Result of the JEDEC ID handshake
    pub jedec: Option<DeviceIdentity>,
    /// Ordered diagnostic lines
    pub messages: Vec<Message>,
}

impl ProbeReport {
    pub(crate) fn push(&mut self, step: Step, text: String) {
        self.messages.push(Message { step, text });
    }

    /// Message texts in order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }

    /// Message texts of one handshake, in order
    pub fn lines_for(&self, step: Step) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.step == step)
            .map(|m| m.text.as_str())
    }
}

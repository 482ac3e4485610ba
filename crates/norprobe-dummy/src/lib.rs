//! norprobe-dummy - Emulated SPI flash bus
//!
//! This crate provides a [`SpiBus`] that emulates the identification logic
//! of a 25-series NOR flash in memory, with chip-select tracking and fault
//! injection. It's useful for testing and development without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use norprobe_core::bus::{effective_timeout_ms, SpiBus};
use norprobe_core::error::{Error, Result};
use norprobe_core::spi::opcodes;

/// Level MISO floats to when the chip is not driving it
const IDLE_MISO: u8 = 0xFF;
/// Byte clocked out during reads
const DUMMY_MOSI: u8 = 0xFF;

/// Configuration for the emulated chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC memory type byte
    pub memory_type: u8,
    /// JEDEC capacity byte
    pub capacity: u8,
    /// Device byte returned by REMS
    pub rems_device_id: u8,
    /// False emulates an empty socket: every byte reads back as 0x00
    pub present: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            memory_type: 0x40,
            capacity: 0x16, // W25Q32
            rems_device_id: 0x15,
            present: true,
        }
    }
}

impl DummyConfig {
    /// Configuration with no chip on the bus
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Default::default()
        }
    }

    /// Set the three JEDEC ID bytes
    pub fn with_jedec_id(mut self, manufacturer_id: u8, memory_type: u8, capacity: u8) -> Self {
        self.manufacturer_id = manufacturer_id;
        self.memory_type = memory_type;
        self.capacity = capacity;
        self
    }

    /// Set the REMS device byte
    pub fn with_rems_device_id(mut self, device_id: u8) -> Self {
        self.rems_device_id = device_id;
        self
    }
}

/// Bus operation, used to target injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `acquire()`
    Acquire,
    /// `release()`
    Release,
    /// `write()`
    Write,
    /// `read()`
    Read,
    /// `write_read()`
    WriteRead,
}

impl core::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "acquire" => Ok(Self::Acquire),
            "release" => Ok(Self::Release),
            "write" => Ok(Self::Write),
            "read" => Ok(Self::Read),
            "writeread" | "write_read" => Ok(Self::WriteRead),
            _ => Err(format!("Invalid operation: {}", s)),
        }
    }
}

/// Injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Report [`Error::Timeout`]
    Timeout,
    /// Report [`Error::TransportError`]
    Transport,
}

impl Fault {
    fn error(self) -> Error {
        match self {
            Self::Timeout => Error::Timeout,
            Self::Transport => Error::TransportError,
        }
    }
}

impl core::str::FromStr for Fault {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "timeout" => Ok(Self::Timeout),
            "transport" => Ok(Self::Transport),
            _ => Err(format!("Invalid fault: {}", s)),
        }
    }
}

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// `acquire()` calls
    pub acquires: usize,
    /// `release()` calls
    pub releases: usize,
    /// `write()` calls
    pub writes: usize,
    /// `read()` calls
    pub reads: usize,
    /// `write_read()` calls
    pub write_reads: usize,
    /// Timeout applied to the most recent transfer, after defaulting
    pub last_timeout_ms: Option<u32>,
}

/// Emulated SPI bus with one flash chip on it
///
/// The emulator shifts bytes through a per-frame state machine. A frame
/// starts when chip select is asserted and ends when it is deasserted:
/// `acquire()`/`release()` for held transactions, or around each single
/// call otherwise. The first byte of a frame is the opcode.
///
/// Faults injected with [`DummyBus::fail`] apply to every later call of the
/// given operation, and the call is still counted in [`BusStats`].
pub struct DummyBus {
    config: DummyConfig,
    faults: Vec<(Operation, Fault)>,
    stats: BusStats,
    cs_held: bool,
    opcode: Option<u8>,
    frame_pos: usize,
}

impl DummyBus {
    /// Create a new emulated bus with the given chip configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            faults: Vec::new(),
            stats: BusStats::default(),
            cs_held: false,
            opcode: None,
            frame_pos: 0,
        }
    }

    /// Create a new emulated bus with a W25Q32
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Make every later call of `op` fail with `fault`
    pub fn fail(&mut self, op: Operation, fault: Fault) {
        self.faults.retain(|(o, _)| *o != op);
        self.faults.push((op, fault));
    }

    /// Builder form of [`DummyBus::fail`]
    pub fn with_fault(mut self, op: Operation, fault: Fault) -> Self {
        self.fail(op, fault);
        self
    }

    /// Remove all injected faults
    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Call counters so far
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Returns true while chip select is held by `acquire()`
    pub fn is_held(&self) -> bool {
        self.cs_held
    }

    fn check_fault(&self, op: Operation) -> Result<()> {
        match self.faults.iter().find(|(o, _)| *o == op) {
            Some((_, fault)) => {
                log::debug!("dummy: injecting {:?} on {:?}", fault, op);
                Err(fault.error())
            }
            None => Ok(()),
        }
    }

    fn end_frame(&mut self) {
        self.opcode = None;
        self.frame_pos = 0;
    }

    /// Shift one byte in and one byte out
    fn shift(&mut self, mosi: u8) -> u8 {
        let pos = self.frame_pos;
        self.frame_pos += 1;

        if !self.config.present {
            return 0x00;
        }

        if pos == 0 {
            self.opcode = Some(mosi);
            return IDLE_MISO;
        }

        match self.opcode {
            // Opcode, 24-bit address, then manufacturer/device repeating
            Some(opcodes::REMS) if pos >= 4 => {
                if (pos - 4) % 2 == 0 {
                    self.config.manufacturer_id
                } else {
                    self.config.rems_device_id
                }
            }
            Some(opcodes::RDID) => match pos {
                1 => self.config.manufacturer_id,
                2 => self.config.memory_type,
                3 => self.config.capacity,
                _ => IDLE_MISO,
            },
            _ => IDLE_MISO,
        }
    }

    /// Run one transfer, bracketing chip select unless the bus is held
    fn transfer(&mut self, tx: impl Iterator<Item = u8>) -> Vec<u8> {
        if !self.cs_held {
            self.end_frame();
        }
        let rx: Vec<u8> = tx.map(|b| self.shift(b)).collect();
        if !self.cs_held {
            self.end_frame();
        }
        rx
    }
}

impl SpiBus for DummyBus {
    fn acquire(&mut self) -> Result<()> {
        self.stats.acquires += 1;
        self.check_fault(Operation::Acquire)?;
        self.end_frame();
        self.cs_held = true;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.stats.releases += 1;
        // Chip select goes high even when the release reports a fault
        self.cs_held = false;
        self.end_frame();
        self.check_fault(Operation::Release)
    }

    fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
        self.stats.writes += 1;
        self.stats.last_timeout_ms = Some(effective_timeout_ms(timeout_ms));
        self.check_fault(Operation::Write)?;
        self.transfer(data.iter().copied());
        Ok(())
    }

    fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        self.stats.reads += 1;
        self.stats.last_timeout_ms = Some(effective_timeout_ms(timeout_ms));
        self.check_fault(Operation::Read)?;
        Ok(self.transfer(core::iter::repeat(DUMMY_MOSI).take(len)))
    }

    fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        self.stats.write_reads += 1;
        self.stats.last_timeout_ms = Some(effective_timeout_ms(timeout_ms));
        self.check_fault(Operation::WriteRead)?;
        Ok(self.transfer(data.iter().copied()))
    }
}

fn parse_byte(key: &str, value: &str) -> core::result::Result<u8, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u8::from_str_radix(digits, 16).map_err(|_| format!("Invalid {} value: {}", key, value))
}

/// Parse programmer options from a list of key-value pairs
///
/// - `mfr=<hex>`, `type=<hex>`, `capacity=<hex>` - JEDEC ID bytes
/// - `rems=<hex>` - REMS device byte
/// - `absent` - no chip on the bus
/// - `fail=<op>:<timeout|transport>` - inject a fault (may be repeated)
pub fn parse_options(
    options: &[(&str, &str)],
) -> core::result::Result<(DummyConfig, Vec<(Operation, Fault)>), String> {
    let mut config = DummyConfig::default();
    let mut faults: Vec<(Operation, Fault)> = Vec::new();

    for (key, value) in options {
        match *key {
            "mfr" => config.manufacturer_id = parse_byte(key, value)?,
            "type" => config.memory_type = parse_byte(key, value)?,
            "capacity" => config.capacity = parse_byte(key, value)?,
            "rems" => config.rems_device_id = parse_byte(key, value)?,
            "absent" => config.present = false,
            "fail" => {
                let (op, fault) = value
                    .split_once(':')
                    .ok_or_else(|| "Invalid fail value, use fail=<op>:<fault>".to_string())?;
                faults.push((op.parse::<Operation>()?, fault.parse::<Fault>()?));
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok((config, faults))
}

/// Open an emulated bus and return it boxed
///
/// This is a convenience function for use in the CLI programmer dispatch.
#[cfg(feature = "std")]
pub fn open_dummy(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn SpiBus + Send>, Box<dyn std::error::Error>> {
    let (config, faults) = parse_options(options)?;
    let mut bus = DummyBus::new(config);
    for (op, fault) in faults {
        bus.fail(op, fault);
    }

    let config = bus.config();
    log::info!(
        "dummy: Emulating chip {:02X} {:02X}{:02X}{}",
        config.manufacturer_id,
        config.memory_type,
        config.capacity,
        if config.present { "" } else { " (absent)" }
    );
    Ok(Box::new(bus))
}

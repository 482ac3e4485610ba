//! norprobe-linux-spi - Linux spidev support
//!
//! This crate provides a [`SpiBus`](norprobe_core::bus::SpiBus) backed by the
//! Linux `/dev/spidevX.Y` device interface.
//!
//! # Overview
//!
//! The Linux SPI driver exposes SPI controllers through character devices
//! at `/dev/spidevX.Y` where X is the bus number and Y is the chip select.
//!
//! # Example
//!
//! ```no_run
//! use norprobe_core::bus::BusSession;
//! use norprobe_core::probe;
//! use norprobe_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(4_000_000)  // 4 MHz
//!     .with_mode(0);
//! let mut session = BusSession::new(LinuxSpi::open(&config)?);
//! for line in probe::probe(&mut session).lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the norprobe CLI
//!
//! ```bash
//! norprobe probe -p linux_spi:dev=/dev/spidev0.0
//! norprobe probe -p linux_spi:dev=/dev/spidev0.0,spispeed=4000,mode=3
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

/// Open a Linux SPI device and return it boxed
///
/// This is a convenience function for use in the CLI programmer dispatch.
///
/// # Example Options
///
/// - `dev=/dev/spidev0.0` - Required: device path
/// - `spispeed=4000` - Optional: speed in kHz (default: 2000)
/// - `mode=0` - Optional: SPI mode 0-3 (default: 0)
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn norprobe_core::bus::SpiBus + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}

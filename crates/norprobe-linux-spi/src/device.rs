//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the `SpiBus`
//! trait using Linux's spidev interface.

use crate::error::{LinuxSpiError, Result};

use norprobe_core::bus::{effective_timeout_ms, SpiBus};
use norprobe_core::error::Result as CoreResult;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (2 MHz)
const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// SPI mode constants
pub mod mode {
    /// SPI mode 0: CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// SPI mode 1: CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// SPI mode 2: CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// SPI mode 3: CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Size of spi_ioc_transfer struct (for 64-bit systems)
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    ///
    /// SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(spi_ioc_transfer)])
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz (default: 2 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default: 0)
    pub mode: u8,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }
}

/// Linux SPI bus using the spidev interface
///
/// Every call is one `SPI_IOC_MESSAGE`. While the bus is acquired, messages
/// are sent with `cs_change` set on their last transfer, which asks the
/// controller to leave chip select asserted afterwards; `release()` sends an
/// empty message to deassert it.
///
/// spidev transfers block until the controller is done and cannot be bounded,
/// so the per-call timeout is accepted but not enforced.
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
    /// Current speed in Hz
    speed_hz: u32,
    /// Chip select is being held across messages
    cs_held: bool,
}

impl LinuxSpi {
    /// Open a Linux SPI device with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        // Set SPI mode
        let mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        // Set bits per word (always 8)
        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        // Set clock speed
        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Opened {} (mode={}, speed={} kHz)",
            config.device,
            mode,
            speed / 1000
        );

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            max_kernel_buf_size,
            speed_hz: speed,
            cs_held: false,
        })
    }

    /// Send one SPI message consisting of a single transfer
    ///
    /// `tx` and `rx` may each be absent (spidev clocks out zeros when there
    /// is no transmit buffer). When both are present they have equal length.
    fn message(&mut self, tx: Option<&[u8]>, rx: Option<&mut [u8]>, len: usize) -> Result<()> {
        if len > self.max_kernel_buf_size {
            return Err(LinuxSpiError::TransferTooLarge {
                len,
                max: self.max_kernel_buf_size,
            });
        }

        let transfer = SpiIocTransfer {
            tx_buf: tx.map_or(0, |b| b.as_ptr() as u64),
            rx_buf: rx.map_or(0, |b| b.as_mut_ptr() as u64),
            len: len as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            // On the last transfer of a message this keeps CS asserted
            cs_change: self.cs_held as u8,
            ..Default::default()
        };

        let ioctl_num = ioctl::spi_ioc_message(1);
        let ptr = &transfer as *const SpiIocTransfer;
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), ioctl_num, ptr) };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl SpiBus for LinuxSpi {
    fn acquire(&mut self) -> CoreResult<()> {
        // CS is asserted by the first message and held by cs_change
        self.cs_held = true;
        log::trace!("linux_spi: holding chip select");
        Ok(())
    }

    fn release(&mut self) -> CoreResult<()> {
        self.cs_held = false;
        log::trace!("linux_spi: releasing chip select");
        // An empty message without cs_change ends the held assertion
        self.message(None, None, 0)?;
        Ok(())
    }

    fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> CoreResult<()> {
        log::trace!(
            "linux_spi: write {} bytes (timeout {} ms)",
            data.len(),
            effective_timeout_ms(timeout_ms)
        );
        self.message(Some(data), None, data.len())?;
        Ok(())
    }

    fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> CoreResult<Vec<u8>> {
        log::trace!(
            "linux_spi: read {} bytes (timeout {} ms)",
            len,
            effective_timeout_ms(timeout_ms)
        );
        let mut rx = vec![0u8; len];
        self.message(None, Some(rx.as_mut_slice()), len)?;
        Ok(rx)
    }

    fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> CoreResult<Vec<u8>> {
        log::trace!(
            "linux_spi: write_read {} bytes (timeout {} ms)",
            data.len(),
            effective_timeout_ms(timeout_ms)
        );
        let mut rx = vec![0u8; data.len()];
        self.message(Some(data), Some(rx.as_mut_slice()), data.len())?;
        Ok(rx)
    }
}

impl Drop for LinuxSpi {
    fn drop(&mut self) {
        if self.cs_held {
            if let Err(e) = SpiBus::release(self) {
                log::warn!("linux_spi: Failed to release chip select: {}", e);
            }
        }
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse programmer options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "spispeed" => {
                // Parse speed in kHz
                let speed_khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid spispeed value: {}", value))?;
                config.speed_hz = speed_khz
                    .checked_mul(1000)
                    .ok_or_else(|| format!("spispeed out of range: {} kHz", speed_khz))?;
            }
            "mode" => {
                let mode: u8 = value
                    .parse()
                    .map_err(|_| format!("Invalid mode value: {}", value))?;
                if mode > mode::MODE_3 {
                    return Err(format!("Invalid SPI mode: {} (must be 0-3)", mode));
                }
                config.mode = mode;
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/spidevX.Y".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("dev", "/dev/spidev1.0"),
            ("spispeed", "4000"),
            ("mode", "3"),
        ])
        .unwrap();
        assert_eq!(
            config,
            LinuxSpiConfig::new("/dev/spidev1.0")
                .with_speed(4_000_000)
                .with_mode(mode::MODE_3)
        );
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "4")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "fast")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "4294968")]).is_err());
        assert_eq!(
            parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "4294967")])
                .unwrap()
                .speed_hz,
            4_294_967_000
        );
    }

    #[test]
    fn test_transfer_struct_size() {
        assert_eq!(
            std::mem::size_of::<SpiIocTransfer>(),
            ioctl::SPI_IOC_TRANSFER_SIZE
        );
    }

    #[test]
    fn test_open_missing_device() {
        let err = LinuxSpi::open(&LinuxSpiConfig::new("/nonexistent/spidev9.9"))
            .err()
            .unwrap();
        assert!(matches!(err, LinuxSpiError::OpenFailed { .. }));
        assert!(matches!(
            LinuxSpi::open(&LinuxSpiConfig::default()),
            Err(LinuxSpiError::NoDevice)
        ));
    }
}

//! Bus transport trait definitions

use alloc::vec::Vec;

use crate::error::Result;

/// Transaction timeout used when the caller does not give one, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 1;

/// Timeout a transport applies for a call given `timeout_ms`
pub fn effective_timeout_ms(timeout_ms: Option<u32>) -> u32 {
    timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
}

/// Raw SPI bus transport
///
/// This trait is implemented by every programmer backend. It is the bare
/// hardware contract: implementations do not track whether the bus is held,
/// that bookkeeping lives in [`BusSession`](super::BusSession).
///
/// Timeouts are given in milliseconds. `None` means the transport default
/// ([`DEFAULT_TIMEOUT_MS`]); implementations resolve it with
/// [`effective_timeout_ms`].
///
/// ## Chip select
///
/// Between `acquire()` and `release()` the implementation must keep chip
/// select asserted, so that consecutive `write`/`read` calls reach the slave
/// as one command. Outside of that bracket every call asserts and deasserts
/// chip select on its own.
///
/// ## Example
///
/// ```ignore
/// impl SpiBus for MyAdapter {
///     fn acquire(&mut self) -> Result<()> {
///         self.hold_cs = true;
///         Ok(())
///     }
///
///     fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
///         let mut rx = vec![0u8; data.len()];
///         self.transfer(data, &mut rx, effective_timeout_ms(timeout_ms))?;
///         Ok(rx)
///     }
///     // ...
/// }
/// ```
pub trait SpiBus {
    /// Assert chip select and keep it asserted until `release()`
    fn acquire(&mut self) -> Result<()>;

    /// Deassert chip select after an `acquire()`
    fn release(&mut self) -> Result<()>;

    /// Transmit `data`, discarding whatever is clocked in
    fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()>;

    /// Clock out `len` dummy bytes and return the `len` bytes received
    fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>>;

    /// Full-duplex transfer; the returned buffer has the length of `data`
    fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>>;
}

// Blanket impls so the CLI can hand a boxed transport to the prober
impl<B: SpiBus + ?Sized> SpiBus for alloc::boxed::Box<B> {
    fn acquire(&mut self) -> Result<()> {
        (**self).acquire()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }

    fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
        (**self).write(data, timeout_ms)
    }

    fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        (**self).read(len, timeout_ms)
    }

    fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        (**self).write_read(data, timeout_ms)
    }
}

impl<B: SpiBus + ?Sized> SpiBus for &mut B {
    fn acquire(&mut self) -> Result<()> {
        (**self).acquire()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }

    fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
        (**self).write(data, timeout_ms)
    }

    fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        (**self).read(len, timeout_ms)
    }

    fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        (**self).write_read(data, timeout_ms)
    }
}

/// Information about a bus programmer backend
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description, including the accepted options
    pub description: &'static str,
}

//! Bus session and scoped acquisition guard

use alloc::vec::Vec;

use super::SpiBus;
use crate::error::{Error, Result};

/// Whether the session currently keeps chip select asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    /// Each transaction brackets its own chip-select assertion
    Released,
    /// Chip select stays asserted across transactions until release
    Held,
}

/// Exclusive handle on a bus transport
///
/// The session tracks the Released/Held state machine on top of a raw
/// [`SpiBus`], rejects acquire/release misuse and malformed transaction
/// arguments, and checks that the transport returned as many bytes as the
/// transaction implies.
///
/// A session that is dropped while held releases the bus.
pub struct BusSession<B: SpiBus> {
    bus: B,
    state: BusState,
}

impl<B: SpiBus> BusSession<B> {
    /// Wrap a transport; the bus starts released
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            state: BusState::Released,
        }
    }

    /// Current bus state
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Returns true while chip select is held
    pub fn is_held(&self) -> bool {
        self.state == BusState::Held
    }

    /// Get a reference to the underlying transport
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying transport
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Hold the bus until `release()`
    ///
    /// Acquire is not re-entrant: a second call fails with
    /// [`Error::AlreadyHeld`] and leaves the bus held.
    pub fn acquire(&mut self) -> Result<()> {
        if self.state == BusState::Held {
            return Err(Error::AlreadyHeld);
        }
        self.bus.acquire()?;
        self.state = BusState::Held;
        log::trace!("spi: bus acquired");
        Ok(())
    }

    /// Release a held bus
    ///
    /// The session is marked released even if the transport reports an error,
    /// so the release is never attempted twice.
    pub fn release(&mut self) -> Result<()> {
        if self.state == BusState::Released {
            return Err(Error::NotHeld);
        }
        self.state = BusState::Released;
        log::trace!("spi: bus released");
        self.bus.release()
    }

    /// Acquire the bus and return a guard that releases it when dropped
    pub fn hold(&mut self) -> Result<HeldBus<'_, B>> {
        self.acquire()?;
        Ok(HeldBus {
            session: self,
            released: false,
        })
    }

    /// Transmit `data` and discard the received bytes
    pub fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArgument);
        }
        log::trace!("spi: write {:02x?} (timeout {:?} ms)", data, timeout_ms);
        self.bus.write(data, timeout_ms)
    }

    /// Receive `len` bytes
    pub fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(Error::InvalidArgument);
        }
        let rx = self.bus.read(len, timeout_ms)?;
        log::trace!("spi: read {:02x?} (timeout {:?} ms)", rx, timeout_ms);
        check_len(len, rx)
    }

    /// Full-duplex transfer; the result always has the length of `data`
    pub fn write_read(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let rx = self.bus.write_read(data, timeout_ms)?;
        log::trace!(
            "spi: write_read {:02x?} -> {:02x?} (timeout {:?} ms)",
            data,
            rx,
            timeout_ms
        );
        check_len(data.len(), rx)
    }
}

impl<B: SpiBus> Drop for BusSession<B> {
    fn drop(&mut self) {
        if self.state == BusState::Held {
            log::warn!("spi: session dropped while holding the bus, releasing");
            if let Err(e) = self.release() {
                log::warn!("spi: release on drop failed: {}", e);
            }
        }
    }
}

fn check_len(expected: usize, rx: Vec<u8>) -> Result<Vec<u8>> {
    if rx.len() != expected {
        return Err(Error::MalformedResponse {
            expected,
            actual: rx.len(),
        });
    }
    Ok(rx)
}

/// Scoped hold on a [`BusSession`]
///
/// All transactions made through the guard share one chip-select assertion.
/// The bus is released exactly once: by [`HeldBus::release`], or on drop if
/// the guard goes out of scope first (early return, `?`).
pub struct HeldBus<'a, B: SpiBus> {
    session: &'a mut BusSession<B>,
    released: bool,
}

impl<B: SpiBus> HeldBus<'_, B> {
    /// Transmit `data` while the bus is held
    pub fn write(&mut self, data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
        self.session.write(data, timeout_ms)
    }

    /// Receive `len` bytes while the bus is held
    pub fn read(&mut self, len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
        self.session.read(len, timeout_ms)
    }

    /// Release the bus and report the transport's answer
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.session.release()
    }
}

impl<B: SpiBus> Drop for HeldBus<'_, B> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(e) = self.session.release() {
                log::warn!("spi: release failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Transport that records calls and can be told to fail
    #[derive(Default)]
    struct Recorder {
        acquires: usize,
        releases: usize,
        fail_write: Option<Error>,
        short_reads: bool,
    }

    impl SpiBus for Recorder {
        fn acquire(&mut self) -> Result<()> {
            self.acquires += 1;
            Ok(())
        }

        fn release(&mut self) -> Result<()> {
            self.releases += 1;
            Ok(())
        }

        fn write(&mut self, _data: &[u8], _timeout_ms: Option<u32>) -> Result<()> {
            match self.fail_write {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn read(&mut self, len: usize, _timeout_ms: Option<u32>) -> Result<Vec<u8>> {
            let len = if self.short_reads { len - 1 } else { len };
            Ok(vec![0xA5; len])
        }

        fn write_read(&mut self, data: &[u8], _timeout_ms: Option<u32>) -> Result<Vec<u8>> {
            Ok(data.iter().map(|b| !b).collect())
        }
    }

    #[test]
    fn test_acquire_release_state() {
        let mut session = BusSession::new(Recorder::default());
        assert_eq!(session.state(), BusState::Released);

        session.acquire().unwrap();
        assert!(session.is_held());
        assert_eq!(session.acquire(), Err(Error::AlreadyHeld));
        assert!(session.is_held());

        session.release().unwrap();
        assert_eq!(session.release(), Err(Error::NotHeld));
        assert_eq!(session.bus().acquires, 1);
        assert_eq!(session.bus().releases, 1);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let mut session = BusSession::new(Recorder::default());
        session.bus_mut().fail_write = Some(Error::Timeout);

        let result = (|| -> Result<()> {
            let mut held = session.hold()?;
            held.write(&[0x9F], None)?;
            held.release()
        })();

        assert_eq!(result, Err(Error::Timeout));
        assert!(!session.is_held());
        assert_eq!(session.bus().releases, 1);
    }

    #[test]
    fn test_guard_explicit_release_happens_once() {
        let mut session = BusSession::new(Recorder::default());
        let held = session.hold().unwrap();
        held.release().unwrap();
        assert_eq!(session.bus().releases, 1);
    }

    #[test]
    fn test_session_drop_releases_held_bus() {
        let mut recorder = Recorder::default();
        {
            let mut session = BusSession::new(&mut recorder);
            session.acquire().unwrap();
        }
        assert_eq!(recorder.releases, 1);
    }

    #[test]
    fn test_argument_validation() {
        let mut session = BusSession::new(Recorder::default());
        assert_eq!(session.write(&[], None), Err(Error::InvalidArgument));
        assert_eq!(session.write_read(&[], None), Err(Error::InvalidArgument));
        assert_eq!(session.read(0, None), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_length_checks() {
        let mut session = BusSession::new(Recorder::default());
        assert_eq!(
            session.write_read(&[0x00, 0xFF], Some(10)).unwrap(),
            vec![0xFF, 0x00]
        );

        session.bus_mut().short_reads = true;
        assert_eq!(
            session.read(3, None),
            Err(Error::MalformedResponse {
                expected: 3,
                actual: 2
            })
        );
    }
}

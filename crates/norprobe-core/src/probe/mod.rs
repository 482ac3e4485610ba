//! Flash identification
//!
//! [`DeviceProber`] runs the two identification handshakes against a
//! [`BusSession`] and collects the decoded identities and diagnostic lines:
//!
//! 1. REMS (0x90) as one full-duplex transaction, bounded by a 100 ms timeout
//! 2. RDID (0x9F) as a write and a read sharing one chip-select assertion
//!
//! A probe never fails. Transport errors are logged and cause the affected
//! handshake to be skipped; the bus is always released before `probe()`
//! returns.

pub mod decode;
mod types;

pub use decode::{capacity_code, decode_jedec_id, decode_manufacturer_id, Decoded};
pub use types::*;

use crate::bus::{BusSession, SpiBus};
use crate::chip::IdentityTable;
use crate::error::Error;
use crate::protocol;

/// Timeout of the REMS transaction in milliseconds
pub const REMS_TIMEOUT_MS: u32 = 100;

/// Per-handshake transaction timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Timeout for the REMS full-duplex transaction
    pub rems_timeout_ms: Option<u32>,
    /// Timeout for each RDID transaction (`None` = transport default)
    pub jedec_timeout_ms: Option<u32>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            rems_timeout_ms: Some(REMS_TIMEOUT_MS),
            jedec_timeout_ms: None,
        }
    }
}

/// Runs the identification handshakes
///
/// The prober holds no state between runs; probing the same chip twice
/// yields the same report.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProber<'t> {
    table: &'t IdentityTable,
    config: ProbeConfig,
}

impl Default for DeviceProber<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProber<'static> {
    /// Prober using the built-in identity table and default timeouts
    pub fn new() -> Self {
        Self::with_table(IdentityTable::builtin())
    }
}

impl<'t> DeviceProber<'t> {
    /// Prober using a custom identity table
    pub fn with_table(table: &'t IdentityTable) -> Self {
        Self {
            table,
            config: ProbeConfig::default(),
        }
    }

    /// Replace the timeouts
    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// Current timeouts
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Identify the chip behind `session`
    pub fn probe<B: SpiBus>(&self, session: &mut BusSession<B>) -> ProbeReport {
        let held_by_caller = session.is_held();
        let mut report = ProbeReport::default();
        self.probe_manufacturer_id(session, &mut report);
        self.probe_jedec_id(session, &mut report);
        debug_assert!(
            held_by_caller || !session.is_held(),
            "bus left held after probe"
        );
        report
    }

    fn probe_manufacturer_id<B: SpiBus>(
        &self,
        session: &mut BusSession<B>,
        report: &mut ProbeReport,
    ) {
        log::debug!("probe: reading manufacturer/device ID (REMS)");
        let frame = match protocol::read_manufacturer_id(session, self.config.rems_timeout_ms) {
            Ok(frame) => frame,
            Err(Error::MalformedResponse { expected, actual }) => {
                log::debug!(
                    "probe: REMS answer has {} bytes instead of {}, skipping",
                    actual,
                    expected
                );
                return;
            }
            Err(e) if e.is_transport() => {
                log::warn!("probe: REMS transaction failed: {}", e);
                return;
            }
            Err(e) => {
                log::error!("probe: REMS transaction rejected: {}", e);
                return;
            }
        };

        match decode_manufacturer_id(self.table, &frame) {
            Some(decoded) => {
                log::debug!("probe: REMS identity: {}", decoded.identity);
                report.manufacturer_id = Some(decoded.identity);
                for text in decoded.messages {
                    report.push(Step::ManufacturerId, text);
                }
            }
            None => log::debug!("probe: REMS answer has {} bytes, skipping", frame.len()),
        }
    }

    fn probe_jedec_id<B: SpiBus>(&self, session: &mut BusSession<B>, report: &mut ProbeReport) {
        log::debug!("probe: reading JEDEC ID (RDID)");
        let id = match protocol::read_jedec_id(session, self.config.jedec_timeout_ms) {
            Ok(id) => id,
            Err(e) if e.is_bus_state() => {
                log::error!("probe: bus busy, JEDEC ID not read: {}", e);
                return;
            }
            Err(e) => {
                log::warn!("probe: JEDEC ID read failed: {}", e);
                return;
            }
        };

        let decoded = decode_jedec_id(self.table, id);
        log::debug!("probe: JEDEC identity: {}", decoded.identity);
        report.jedec = Some(decoded.identity);
        for text in decoded.messages {
            report.push(Step::JedecId, text);
        }
    }
}

/// Identify the chip behind `session` with the built-in table and defaults
pub fn probe<B: SpiBus>(session: &mut BusSession<B>) -> ProbeReport {
    DeviceProber::new().probe(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Acquire,
        Release,
        Write,
        Read,
        WriteRead,
    }

    /// Scripted transport: fixed answers, optional fault per operation,
    /// and a log of every call in order
    struct Scripted {
        rems: Vec<u8>,
        jedec: Vec<u8>,
        fault: Option<(Op, Error)>,
        calls: Vec<Op>,
        timeouts: Vec<Option<u32>>,
    }

    impl Scripted {
        fn new(rems: &[u8], jedec: &[u8]) -> Self {
            Self {
                rems: rems.to_vec(),
                jedec: jedec.to_vec(),
                fault: None,
                calls: Vec::new(),
                timeouts: Vec::new(),
            }
        }

        fn failing(mut self, op: Op, err: Error) -> Self {
            self.fault = Some((op, err));
            self
        }

        fn record(&mut self, op: Op) -> Result<()> {
            self.calls.push(op);
            match self.fault {
                Some((fault_op, err)) if fault_op == op => Err(err),
                _ => Ok(()),
            }
        }

        fn count(&self, op: Op) -> usize {
            self.calls.iter().filter(|&&c| c == op).count()
        }
    }

    impl SpiBus for Scripted {
        fn acquire(&mut self) -> Result<()> {
            self.record(Op::Acquire)
        }

        fn release(&mut self) -> Result<()> {
            self.record(Op::Release)
        }

        fn write(&mut self, _data: &[u8], timeout_ms: Option<u32>) -> Result<()> {
            self.timeouts.push(timeout_ms);
            self.record(Op::Write)
        }

        fn read(&mut self, _len: usize, timeout_ms: Option<u32>) -> Result<Vec<u8>> {
            self.timeouts.push(timeout_ms);
            self.record(Op::Read)?;
            Ok(self.jedec.clone())
        }

        fn write_read(&mut self, _data: &[u8], timeout_ms: Option<u32>) -> Result<Vec<u8>> {
            self.timeouts.push(timeout_ms);
            self.record(Op::WriteRead)?;
            Ok(self.rems.clone())
        }
    }

    const W25Q32_REMS: [u8; 6] = [0xFF, 0xFF, 0xFF, 0xFF, 0xEF, 0x15];
    const W25Q32_JEDEC: [u8; 3] = [0xEF, 0x40, 0x16];

    #[test]
    fn test_probe_w25q32() {
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC));
        let report = probe(&mut session);

        let w25q32 = DeviceIdentity::Known {
            vendor: "Winbond",
            model: "W25Q32",
        };
        assert_eq!(report.manufacturer_id, Some(w25q32));
        assert_eq!(report.jedec, Some(w25q32));
        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            [
                "Found Winbond device",
                "Device ID: W25Q32",
                "JEDEC MF ID: ef",
                "JEDEC Memory Type: 40",
                "JEDEC Capacity ID: 16",
                "Winbond device found",
                "Device: W25Q32",
            ]
        );
        assert_eq!(
            session.bus().calls,
            [Op::WriteRead, Op::Acquire, Op::Write, Op::Read, Op::Release]
        );
        assert!(!session.is_held());
    }

    #[test]
    fn test_probe_timeouts() {
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC));
        probe(&mut session);
        assert_eq!(session.bus().timeouts, [Some(100), None, None]);

        let config = ProbeConfig {
            rems_timeout_ms: Some(5),
            jedec_timeout_ms: Some(7),
        };
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC));
        DeviceProber::new().with_config(config).probe(&mut session);
        assert_eq!(session.bus().timeouts, [Some(5), Some(7), Some(7)]);
    }

    #[test]
    fn test_probe_chip_not_connected() {
        let mut session = BusSession::new(Scripted::new(&[0; 6], &[0; 3]));
        let report = probe(&mut session);
        assert_eq!(report.manufacturer_id, Some(DeviceIdentity::AbsentOrUnpowered));
        assert_eq!(
            report.lines_for(Step::ManufacturerId).collect::<Vec<_>>(),
            ["chip not connected"]
        );
        assert_eq!(report.jedec, Some(DeviceIdentity::AbsentOrUnpowered));
    }

    #[test]
    fn test_probe_short_rems_answer_is_silent() {
        let mut session = BusSession::new(Scripted::new(&[0, 0, 0, 0, 0xEF], &W25Q32_JEDEC));
        let report = probe(&mut session);
        assert_eq!(report.manufacturer_id, None);
        assert_eq!(report.lines_for(Step::ManufacturerId).count(), 0);
        assert_eq!(report.lines_for(Step::JedecId).count(), 5);
    }

    #[test]
    fn test_probe_rems_failure_does_not_abort() {
        let bus = Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC).failing(Op::WriteRead, Error::Timeout);
        let mut session = BusSession::new(bus);
        let report = probe(&mut session);
        assert_eq!(report.manufacturer_id, None);
        assert_eq!(report.lines_for(Step::ManufacturerId).count(), 0);
        assert_eq!(report.jedec.and_then(|id| id.model()), Some("W25Q32"));
    }

    #[test]
    fn test_release_once_on_every_failure() {
        let cases = [
            (Op::Write, Error::Timeout),
            (Op::Write, Error::TransportError),
            (Op::Read, Error::Timeout),
            (Op::Read, Error::TransportError),
            (Op::Release, Error::TransportError),
        ];
        for (op, err) in cases {
            let bus = Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC).failing(op, err);
            let mut session = BusSession::new(bus);
            let report = probe(&mut session);

            assert_eq!(session.bus().count(Op::Release), 1, "{:?} {:?}", op, err);
            assert!(!session.is_held());
            // REMS still ran
            assert_eq!(report.lines_for(Step::ManufacturerId).count(), 2);
            if op != Op::Release {
                assert_eq!(report.jedec, None);
                assert_eq!(report.lines_for(Step::JedecId).count(), 0);
            }
        }
    }

    #[test]
    fn test_release_failure_keeps_decoded_id() {
        let bus = Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC).failing(Op::Release, Error::TransportError);
        let mut session = BusSession::new(bus);
        let report = probe(&mut session);
        assert_eq!(report.jedec.and_then(|id| id.model()), Some("W25Q32"));
    }

    #[test]
    fn test_acquire_failure_skips_jedec() {
        let bus = Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC).failing(Op::Acquire, Error::TransportError);
        let mut session = BusSession::new(bus);
        let report = probe(&mut session);
        assert_eq!(report.jedec, None);
        assert_eq!(session.bus().count(Op::Release), 0);
        assert!(!session.is_held());
    }

    #[test]
    fn test_bus_held_by_caller_skips_jedec() {
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &W25Q32_JEDEC));
        session.acquire().unwrap();

        let report = probe(&mut session);
        assert_eq!(report.jedec, None);
        assert_eq!(report.lines_for(Step::ManufacturerId).count(), 2);
        // The caller's hold is left alone
        assert!(session.is_held());
        assert_eq!(session.bus().count(Op::Release), 0);

        session.release().unwrap();
    }

    #[test]
    fn test_short_jedec_read_is_skipped() {
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &[0xEF, 0x40]));
        let report = probe(&mut session);
        assert_eq!(report.jedec, None);
        assert_eq!(session.bus().count(Op::Release), 1);
    }

    #[test]
    fn test_probe_is_repeatable() {
        let mut session = BusSession::new(Scripted::new(&W25Q32_REMS, &[0xEF, 0x40, 0x15]));
        let prober = DeviceProber::new();
        let first = prober.probe(&mut session);
        let second = prober.probe(&mut session);
        assert_eq!(first, second);
        assert_eq!(session.bus().count(Op::Release), 2);
    }

    #[test]
    fn test_custom_table() {
        use crate::chip::{ChipId, Vendor};

        static VENDORS: [Vendor; 1] = [Vendor {
            id: 0xC2,
            name: "Macronix",
        }];
        static JEDEC: [ChipId; 1] = [ChipId {
            manufacturer: 0xC2,
            code: 0x2016,
            name: "MX25L3205D",
            total_size: 4 * 1024 * 1024,
        }];
        static TABLE: IdentityTable = IdentityTable::new(&VENDORS, &[], &JEDEC);

        let mut session = BusSession::new(Scripted::new(
            &[0, 0, 0, 0, 0xC2, 0x15],
            &[0xC2, 0x20, 0x16],
        ));
        let report = DeviceProber::with_table(&TABLE).probe(&mut session);
        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            vec![
                "Found Macronix device",
                "unknown device ID: 15",
                "JEDEC MF ID: c2",
                "JEDEC Memory Type: 20",
                "JEDEC Capacity ID: 16",
                "Macronix device found",
                "Device: MX25L3205D",
            ]
        );
    }
}

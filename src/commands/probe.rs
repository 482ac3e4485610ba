//! Probe command implementation

use std::io::{self, Write};

use norprobe_core::bus::{BusSession, SpiBus};
use norprobe_core::probe::{DeviceProber, ProbeConfig, ProbeReport};

use crate::cli::TimeoutArgs;

/// Build the probe timeouts from the command line overrides
pub fn probe_config(timeouts: TimeoutArgs) -> ProbeConfig {
    let defaults = ProbeConfig::default();
    ProbeConfig {
        rems_timeout_ms: timeouts.rems_timeout_ms.or(defaults.rems_timeout_ms),
        jedec_timeout_ms: timeouts.jedec_timeout_ms.or(defaults.jedec_timeout_ms),
    }
}

/// Run both identification handshakes and print the report to stdout
pub fn run_probe<B: SpiBus>(
    bus: B,
    config: ProbeConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BusSession::new(bus);
    let prober = DeviceProber::new().with_config(config);
    log::debug!("Probe timeouts: {:?}", prober.config());
    let report = prober.probe(&mut session);

    match (&report.manufacturer_id, &report.jedec) {
        (None, None) => log::warn!("No handshake completed, check wiring and programmer"),
        (_, Some(identity)) | (Some(identity), None) if !identity.is_present() => {
            log::warn!("No flash chip answered, check wiring and power")
        }
        (_, Some(identity)) | (Some(identity), None) => {
            log::debug!("Probe result: {}", identity)
        }
    }

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &report, json)?;
    Ok(())
}

/// Write the report as plain lines or as one JSON document
pub fn write_report<W: Write>(
    out: &mut W,
    report: &ProbeReport,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
    } else {
        for line in report.lines() {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use norprobe_core::probe::DeviceIdentity;
    use norprobe_dummy::{DummyBus, DummyConfig};

    fn probe_dummy(config: DummyConfig) -> ProbeReport {
        let mut session = BusSession::new(DummyBus::new(config));
        DeviceProber::new().probe(&mut session)
    }

    #[test]
    fn test_text_report() {
        let report = probe_dummy(DummyConfig::default());
        let mut out = Vec::new();
        write_report(&mut out, &report, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Found Winbond device\n\
             Device ID: W25Q32\n\
             JEDEC MF ID: ef\n\
             JEDEC Memory Type: 40\n\
             JEDEC Capacity ID: 16\n\
             Winbond device found\n\
             Device: W25Q32\n"
        );
    }

    #[test]
    fn test_json_report() {
        let report = probe_dummy(DummyConfig::absent());
        assert_eq!(report.jedec, Some(DeviceIdentity::AbsentOrUnpowered));

        let mut out = Vec::new();
        write_report(&mut out, &report, true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["jedec"]["kind"], "absent_or_unpowered");
        assert_eq!(value["manufacturer_id"]["kind"], "absent_or_unpowered");
        assert_eq!(value["messages"][0]["step"], "manufacturer_id");
        assert_eq!(value["messages"][0]["text"], "chip not connected");
    }

    #[test]
    fn test_probe_config_overrides() {
        let config = probe_config(TimeoutArgs::default());
        assert_eq!(config, ProbeConfig::default());

        let config = probe_config(TimeoutArgs {
            rems_timeout_ms: Some(5),
            jedec_timeout_ms: Some(20),
        });
        assert_eq!(config.rems_timeout_ms, Some(5));
        assert_eq!(config.jedec_timeout_ms, Some(20));
    }
}

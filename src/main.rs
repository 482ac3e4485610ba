//! norprobe - SPI NOR flash identification
//!
//! Identifies the 25-series flash chip behind a programmer by running the
//! REMS (0x90) and JEDEC RDID (0x9F) handshakes and printing what was found.
//!
//! # Architecture
//!
//! Programmer backends implement the raw `SpiBus` transport from
//! `norprobe-core`. The CLI opens one by name, wraps it in a `BusSession` and
//! hands it to the `DeviceProber`, which never fails: transport problems are
//! logged and show up as a missing identity in the report.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use norprobe_core::chip::IdentityTable;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Probe {
            programmer,
            timeouts,
            json,
        } => {
            let bus = programmers::open_bus(&programmer)?;
            let config = commands::probe::probe_config(timeouts);
            commands::probe::run_probe(bus, config, json)
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListChips { vendor } => {
            commands::list_chips(IdentityTable::builtin(), vendor.as_deref());
            Ok(())
        }
    }
}

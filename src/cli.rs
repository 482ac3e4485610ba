//! CLI argument parsing

use clap::{Parser, Subcommand};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "norprobe")]
#[command(author, version, about = "SPI NOR flash identification", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Transaction timeout overrides
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct TimeoutArgs {
    /// Timeout of the manufacturer/device ID transaction in ms [default: 100]
    #[arg(long, value_parser = parse_hex_u32)]
    pub rems_timeout_ms: Option<u32>,

    /// Timeout of each JEDEC ID transaction in ms [default: transport default]
    #[arg(long, value_parser = parse_hex_u32)]
    pub jedec_timeout_ms: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the flash chip on the bus
    Probe {
        /// Programmer to use, with options: name[:key=value,...]
        /// (see list-programmers)
        #[arg(short, long)]
        programmer: String,

        #[command(flatten)]
        timeouts: TimeoutArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported programmers
    ListProgrammers,

    /// List identifiable chips
    ListChips {
        /// Filter by vendor
        #[arg(long)]
        vendor: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_probe() {
        let cli = Cli::try_parse_from([
            "norprobe",
            "-vv",
            "probe",
            "-p",
            "dummy:absent",
            "--rems-timeout-ms",
            "0x20",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Probe {
                programmer,
                timeouts,
                json,
            } => {
                assert_eq!(programmer, "dummy:absent");
                assert_eq!(timeouts.rems_timeout_ms, Some(32));
                assert_eq!(timeouts.jedec_timeout_ms, None);
                assert!(json);
            }
            _ => panic!("expected probe"),
        }
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("100"), Ok(100));
        assert_eq!(parse_hex_u32("0X10"), Ok(16));
        assert!(parse_hex_u32("ten").is_err());
    }
}

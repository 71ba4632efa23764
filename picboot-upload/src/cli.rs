// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use picboot_upload::transport::{Transport, DEFAULT_BAUD};

use crate::commands;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "picboot-upload")]
#[command(about = "Intel-HEX programmer for dsPIC/PIC24 serial bootloaders")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyUSB0)
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD, global = true)]
    pub baud: u32,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Program an Intel-HEX image and reset the target
    Flash {
        /// Firmware HEX file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also rewrite rows the image does not use (as erased flash)
        #[arg(long)]
        erase_unused: bool,
    },

    /// Dump the program memory row containing an address
    ReadProgram {
        /// Address (0x-prefixed hex or decimal)
        #[arg(value_name = "ADDR", value_parser = parse_address)]
        address: u32,
    },

    /// Dump the EEPROM row containing an address
    ReadEeprom {
        /// Address (0x-prefixed hex or decimal)
        #[arg(value_name = "ADDR", value_parser = parse_address)]
        address: u32,
    },

    /// Identify the attached device
    Id,

    /// List supported devices
    Devices,
}

fn parse_address(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn open(cli: &Cli) -> Result<Transport> {
    let port = cli.port.as_deref().context("--port is required for this command")?;
    Transport::new(port, cli.baud)
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Devices => commands::devices(),
        Commands::Flash { file, erase_unused } => {
            // Decode the whole file before touching the port.
            let records = commands::load_hex(file)?;
            commands::flash(open(&cli)?, records, *erase_unused)
        }
        Commands::ReadProgram { address } => commands::read_program(open(&cli)?, *address),
        Commands::ReadEeprom { address } => commands::read_eeprom(open(&cli)?, *address),
        Commands::Id => commands::id(open(&cli)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_hex_and_decimal() {
        assert_eq!(parse_address("0x400"), Ok(0x400));
        assert_eq!(parse_address("0X7FF000"), Ok(0x7F_F000));
        assert_eq!(parse_address("1024"), Ok(1024));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn test_cli_parses_flash() {
        let cli = Cli::parse_from(["picboot-upload", "-p", "/dev/ttyUSB0", "-vv", "flash", "fw.hex", "--erase-unused"]);
        assert_eq!(cli.baud, DEFAULT_BAUD);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Flash { erase_unused: true, .. }));
    }
}

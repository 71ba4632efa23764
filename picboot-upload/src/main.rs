// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Intel-HEX programmer for the picboot serial bootloader.
//!
//! Usage:
//!   picboot-upload --port /dev/ttyUSB0 flash firmware.hex
//!   picboot-upload --port /dev/ttyUSB0 read-program 0x400
//!   picboot-upload --port /dev/ttyUSB0 id

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    cli::run(args)
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for bootloader operations.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use picboot_common::hex::{HexReader, HexRecord};
use picboot_common::protocol::align_eeprom;
use picboot_common::DEVICES;
use picboot_upload::session::{self, FlashOptions};
use picboot_upload::transport::Transport;
use picboot_upload::{dump, Driver};

/// Decode every record of a HEX file.
pub fn load_hex(file: &Path) -> Result<Vec<HexRecord>> {
    let reader = File::open(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let records = HexReader::new(BufReader::new(reader))
        .collect::<picboot_common::Result<Vec<_>>>()
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    log::debug!("{}: {} records", file.display(), records.len());
    Ok(records)
}

/// Program a HEX image and reset the target.
pub fn flash(transport: Transport, records: Vec<HexRecord>, erase_unused: bool) -> Result<()> {
    let port = transport.port_name();
    let mut driver = Driver::new(transport);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")?
            .progress_chars("#>-"),
    );

    let report = session::flash(&mut driver, records, FlashOptions { erase_unused }, |sent, total| {
        pb.set_length(total as u64);
        pb.set_position(sent as u64);
    });

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            pb.abandon();
            return Err(e).with_context(|| format!("Programming via {} failed", port));
        }
    };

    pb.finish_with_message("done");
    println!();
    println!("Device:  {} ({})", report.device.name, report.device.family);
    println!("Rows:    {}", report.rows_sent);
    println!("Firmware written, device reset.");
    Ok(())
}

/// Dump one program memory row.
pub fn read_program(transport: Transport, address: u32) -> Result<()> {
    let mut driver = Driver::new(transport);
    let device = session::identify(&mut driver)?;
    let family = device.family;
    let row_address = family.align_program(address);

    let reply = driver
        .read_program_row(family, address)
        .context("Failed to read program memory")?;
    for line in dump::program_lines(row_address, &reply) {
        println!("{}", line);
    }
    Ok(())
}

/// Dump one EEPROM row.
pub fn read_eeprom(transport: Transport, address: u32) -> Result<()> {
    let mut driver = Driver::new(transport);
    let device = session::identify(&mut driver)?;

    let reply = driver
        .read_eeprom_row(device.family, address)
        .context("Failed to read EEPROM")?;
    for line in dump::eeprom_lines(align_eeprom(address), &reply) {
        println!("{}", line);
    }
    Ok(())
}

/// Identify the attached device.
pub fn id(transport: Transport) -> Result<()> {
    let mut driver = Driver::new(transport);
    let (device_id, process_id) = driver.read_id().context("Failed to read device id")?;
    println!("Device ID:  0x{:04x}", device_id);
    println!("Process ID: {}", process_id);

    match picboot_common::lookup(device_id, process_id) {
        Ok(device) => {
            println!("Device:     {}", device.name);
            println!("Family:     {}", device.family);
        }
        Err(e) => println!("{}", e),
    }
    Ok(())
}

/// List the device catalog.
pub fn devices() -> Result<()> {
    println!("{:<20} {:>6} {:>7}  {}", "Device", "ID", "Process", "Family");
    for dev in DEVICES {
        println!(
            "{:<20} 0x{:04x} {:>7}  {}",
            dev.name, dev.device_id, dev.process_id, dev.family
        );
    }
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One programming run: identify the target, build the image, keep the
//! resident entry vector, stream the rows and reset.

use picboot_common::hex::HexRecord;
use picboot_common::image::{build_image, MemoryImage, MemoryRow, RowKind};
use picboot_common::protocol::{decode_read_word, PM_WORD_BYTES, PRESERVED_WORDS, PROGRAM_BASE};
use picboot_common::{lookup, DeviceDescriptor};

use crate::driver::{Driver, Link, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct FlashOptions {
    /// Also send Program/EEPROM rows the image never touched, as erased
    /// content.
    pub erase_unused: bool,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct FlashReport {
    pub device: &'static DeviceDescriptor,
    pub rows_sent: usize,
}

/// Identify the attached target from its id registers.
pub fn identify<L: Link>(driver: &mut Driver<L>) -> Result<&'static DeviceDescriptor> {
    let (device_id, process_id) = driver.read_id()?;
    let device = lookup(device_id, process_id)?;
    log::info!(
        "found {} (ID: 0x{:04x}, process: {})",
        device.name,
        device_id,
        process_id
    );
    Ok(device)
}

/// Replace the first instruction words of the image with the ones
/// currently on the target.
pub fn preserve<L: Link>(driver: &mut Driver<L>, image: &mut MemoryImage) -> Result<()> {
    let reply = driver.read_program_row(image.family(), PROGRAM_BASE)?;
    let mut words = [0u32; PRESERVED_WORDS];
    for (word, bytes) in words.iter_mut().zip(reply.chunks_exact(PM_WORD_BYTES)) {
        *word = decode_read_word(bytes);
    }
    log::debug!("preserving entry vector {:06x?}", words);
    image.preserve_entry_vector(words);
    Ok(())
}

/// Rows that will be written under `options`, in transmission order.
pub fn rows_to_send(image: &MemoryImage, options: FlashOptions) -> Vec<&MemoryRow> {
    let config_slots = image.family().config_slots();
    image
        .rows()
        .iter()
        .filter(|row| match row.kind() {
            RowKind::Program | RowKind::Eeprom => options.erase_unused || row.is_filled(),
            RowKind::Configuration => row.index() < config_slots,
        })
        .collect()
}

/// Stream formatted rows. `progress` is called with (sent, total) after
/// every row. Returns the number of rows sent.
pub fn send_rows<L, P>(
    driver: &mut Driver<L>,
    image: &MemoryImage,
    options: FlashOptions,
    mut progress: P,
) -> Result<usize>
where
    L: Link,
    P: FnMut(usize, usize),
{
    let family = image.family();
    let rows = rows_to_send(image, options);
    let total = rows.len();

    for (sent, row) in rows.into_iter().enumerate() {
        log::debug!("{:?} row {} at 0x{:06x}", row.kind(), row.index(), row.address());
        match row.kind() {
            RowKind::Program => driver.write_program_row(row.address(), row.payload())?,
            RowKind::Eeprom => driver.write_eeprom_row(family, row.address(), row.payload())?,
            RowKind::Configuration => driver.write_config_row(row.index(), row.config_slot())?,
        }
        progress(sent + 1, total);
    }
    Ok(total)
}

/// Program `records` into the attached target and reset it.
///
/// The records are fully decoded before this is called, so a malformed
/// file never reaches the wire.
pub fn flash<L, P>(
    driver: &mut Driver<L>,
    records: Vec<HexRecord>,
    options: FlashOptions,
    progress: P,
) -> Result<FlashReport>
where
    L: Link,
    P: FnMut(usize, usize),
{
    let device = identify(driver)?;
    let mut image = build_image(device.family, records.into_iter().map(Ok))?;
    preserve(driver, &mut image)?;
    image.format_data();

    let rows_sent = send_rows(driver, &image, options, progress)?;
    driver.reset()?;
    log::info!("{} rows written, target reset", rows_sent);

    Ok(FlashReport { device, rows_sent })
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! In-memory model of the target's flash, organised as fixed-size rows.
//!
//! A HEX image is sparse and record oriented; the bootloader only accepts
//! whole rows. [`MemoryImage`] allocates every row of a family up front,
//! absorbs HEX data at device addresses, and re-encodes each row into the
//! payload layout of its write command.
//!
//! Addresses here are device program-counter units. A HEX byte address maps
//! to unit `addr / 2`; every unit holds two HEX bytes, so an instruction
//! word (low, mid, high, phantom) spans two units.

use crate::error::{Error, Result};
use crate::hex::{HexRecord, RecordType};
use crate::protocol::{
    encode_write_word, Family, CONFIG_BASE, CONFIG_ROW_COUNT, CONFIG_SLOT_EMPTY,
    CONFIG_SLOT_FILLED, CONFIG_SLOT_LEN, EEPROM_BASE, EE_ROW_UNITS, EE30F_ROW_WORDS,
    PRESERVED_WORDS, PROGRAM_BASE, WORD_UNITS,
};

/// Erased flash content.
const ERASED: u8 = 0xFF;
/// HEX bytes stored per address unit.
const BYTES_PER_UNIT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Program,
    Eeprom,
    Configuration,
}

/// One fixed-capacity unit of flash, written in full or not at all.
#[derive(Clone, Debug)]
pub struct MemoryRow {
    kind: RowKind,
    index: usize,
    address: u32,
    units: u32,
    raw: Vec<u8>,
    filled: Vec<bool>,
    payload: Vec<u8>,
}

impl MemoryRow {
    fn new(kind: RowKind, index: usize, family: Family) -> Self {
        let (base, units) = match kind {
            RowKind::Program => (PROGRAM_BASE, family.program_row_units()),
            RowKind::Eeprom => (EEPROM_BASE, EE_ROW_UNITS),
            RowKind::Configuration => (CONFIG_BASE, WORD_UNITS),
        };
        Self {
            kind,
            index,
            address: base + index as u32 * units,
            units,
            raw: vec![ERASED; units as usize * BYTES_PER_UNIT],
            filled: vec![false; units as usize],
            payload: Vec::new(),
        }
    }

    pub fn kind(&self) -> RowKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// First device address covered by the row.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Number of address units the row spans.
    pub fn units(&self) -> u32 {
        self.units
    }

    /// Row capacity in HEX bytes.
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    pub fn contains(&self, address: u32) -> bool {
        (self.address..self.address + self.units).contains(&address)
    }

    /// True once any HEX data has landed in the row.
    pub fn is_filled(&self) -> bool {
        self.filled.iter().any(|&f| f)
    }

    /// True if the unit at `address` received HEX data.
    pub fn is_filled_at(&self, address: u32) -> bool {
        self.contains(address) && self.filled[(address - self.address) as usize]
    }

    /// Raw HEX bytes in file order, erased where never written.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Wire payload produced by the last [`MemoryRow::format_data`].
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Store up to two HEX bytes at `address`. Returns false if the row
    /// does not cover it.
    pub fn insert_data(&mut self, address: u32, data: &[u8]) -> bool {
        if !self.contains(address) || data.is_empty() || data.len() > BYTES_PER_UNIT {
            return false;
        }
        let unit = (address - self.address) as usize;
        let offset = unit * BYTES_PER_UNIT;
        self.raw[offset..offset + data.len()].copy_from_slice(data);
        self.filled[unit] = true;
        true
    }

    /// 24-bit instruction word `n` of a program row (phantom byte dropped).
    pub fn instruction_word(&self, n: usize) -> u32 {
        let b = &self.raw[n * 4..n * 4 + 3];
        u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16
    }

    /// Re-encode the raw buffer into the layout its write command expects.
    pub fn format_data(&mut self) {
        self.payload.clear();
        match self.kind {
            RowKind::Program => {
                let words = self.units as usize / WORD_UNITS as usize;
                for n in 0..words {
                    self.payload
                        .extend_from_slice(&encode_write_word(self.instruction_word(n)));
                }
            }
            RowKind::Eeprom => {
                for word in self.raw.chunks_exact(4).take(EE30F_ROW_WORDS) {
                    self.payload.extend_from_slice(&word[..2]);
                }
            }
            RowKind::Configuration => {
                self.payload.extend_from_slice(&self.raw[..2]);
            }
        }
    }

    /// Configuration slot frame: empty flag, low byte, high byte.
    pub fn config_slot(&self) -> [u8; CONFIG_SLOT_LEN] {
        let flag = if self.is_filled() {
            CONFIG_SLOT_FILLED
        } else {
            CONFIG_SLOT_EMPTY
        };
        [flag, self.raw[0], self.raw[1]]
    }
}

/// Every row of one family, ordered Program, EEPROM, Configuration.
#[derive(Clone, Debug)]
pub struct MemoryImage {
    family: Family,
    rows: Vec<MemoryRow>,
}

impl MemoryImage {
    pub fn new(family: Family) -> Self {
        let program = (0..family.program_row_count()).map(|i| MemoryRow::new(RowKind::Program, i, family));
        let eeprom = (0..family.eeprom_row_count()).map(|i| MemoryRow::new(RowKind::Eeprom, i, family));
        let config =
            (0..CONFIG_ROW_COUNT).map(|i| MemoryRow::new(RowKind::Configuration, i, family));

        Self {
            family,
            rows: program.chain(eeprom).chain(config).collect(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn rows(&self) -> &[MemoryRow] {
        &self.rows
    }

    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &MemoryRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    /// Index of the row covering `address`, computed from the family geometry.
    pub fn locate(&self, address: u32) -> Option<usize> {
        let program_rows = self.family.program_row_count();
        let eeprom_rows = self.family.eeprom_row_count();
        let program_units = self.family.program_row_units();

        let program_end = PROGRAM_BASE + program_rows as u32 * program_units;
        let eeprom_end = EEPROM_BASE + eeprom_rows as u32 * EE_ROW_UNITS;
        let config_end = CONFIG_BASE + CONFIG_ROW_COUNT as u32 * WORD_UNITS;

        if address < program_end {
            Some(((address - PROGRAM_BASE) / program_units) as usize)
        } else if (EEPROM_BASE..eeprom_end).contains(&address) {
            Some(program_rows + ((address - EEPROM_BASE) / EE_ROW_UNITS) as usize)
        } else if (CONFIG_BASE..config_end).contains(&address) {
            Some(program_rows + eeprom_rows + ((address - CONFIG_BASE) / WORD_UNITS) as usize)
        } else {
            None
        }
    }

    /// Store up to two HEX bytes at device `address`.
    pub fn insert_data(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let inserted = self
            .locate(address)
            .map(|i| self.rows[i].insert_data(address, data))
            .unwrap_or(false);
        if inserted {
            Ok(())
        } else {
            Err(Error::AddressOutOfRange(address))
        }
    }

    /// Overwrite the first instruction words of row 0 with words read from
    /// the attached target, so the resident bootloader's entry vector
    /// survives.
    pub fn preserve_entry_vector(&mut self, words: [u32; PRESERVED_WORDS]) {
        let row = &mut self.rows[0];
        for (n, word) in words.iter().enumerate() {
            let unit = PROGRAM_BASE + n as u32 * WORD_UNITS;
            let [low, mid, high, _] = word.to_le_bytes();
            row.insert_data(unit, &[low, mid]);
            row.insert_data(unit + 1, &[high, 0x00]);
        }
    }

    /// Format every row for transmission.
    pub fn format_data(&mut self) {
        for row in &mut self.rows {
            row.format_data();
        }
    }
}

/// Applies decoded HEX records to a [`MemoryImage`], tracking the upper
/// address bits set by extended linear address records.
pub struct ImageBuilder {
    image: MemoryImage,
    upper: u32,
}

impl ImageBuilder {
    pub fn new(family: Family) -> Self {
        Self {
            image: MemoryImage::new(family),
            upper: 0,
        }
    }

    /// Absolute HEX byte address of a record's first payload byte.
    pub fn resolve(&self, record: &HexRecord) -> u32 {
        self.upper + u32::from(record.address)
    }

    pub fn apply(&mut self, record: &HexRecord) -> Result<()> {
        match record.record_type {
            RecordType::Data => {
                let start = self.resolve(record) / 2;
                for (n, chunk) in record.data.chunks(BYTES_PER_UNIT).enumerate() {
                    self.image.insert_data(start + n as u32, chunk)?;
                }
            }
            RecordType::EndOfFile => {}
            RecordType::ExtendedLinearAddress => {
                if let Some(upper) = record.upper_address() {
                    self.upper = upper;
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> MemoryImage {
        self.image
    }
}

/// Build an image from a record sequence, stopping at the first error.
pub fn build_image<I>(family: Family, records: I) -> Result<MemoryImage>
where
    I: IntoIterator<Item = Result<HexRecord>>,
{
    let mut builder = ImageBuilder::new(family);
    for record in records {
        builder.apply(&record?)?;
    }
    log::debug!(
        "image built: {} of {} rows filled",
        builder.image.rows.iter().filter(|r| r.is_filled()).count(),
        builder.image.rows.len()
    );
    Ok(builder.finish())
}

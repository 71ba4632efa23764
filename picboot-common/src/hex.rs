// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Intel-HEX record decoding.
//!
//! Only the record types a 16-bit PIC image uses are honored: data,
//! end-of-file and extended linear address. Checksums are present in every
//! line but are not verified.

use heapless::Vec as HeaplessVec;

use crate::error::{Error, Result};

/// Maximum payload a single record can carry (byte count is one byte).
pub const MAX_RECORD_DATA: usize = 255;

const START_CODE: u8 = b':';
// ':' + count(2) + address(4) + type(2)
const HEADER_LEN: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedLinearAddress,
}

impl RecordType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            0x04 => Some(Self::ExtendedLinearAddress),
            _ => None,
        }
    }
}

/// One decoded HEX line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexRecord {
    pub record_type: RecordType,
    pub byte_count: u8,
    pub address: u16,
    pub data: HeaplessVec<u8, MAX_RECORD_DATA>,
}

impl HexRecord {
    /// Upper 16 address bits carried by an extended linear address record.
    pub fn upper_address(&self) -> Option<u32> {
        if self.record_type != RecordType::ExtendedLinearAddress || self.data.len() < 2 {
            return None;
        }
        Some(u32::from(u16::from_be_bytes([self.data[0], self.data[1]])) << 16)
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_byte(line: usize, digits: &[u8]) -> Result<u8> {
    match (hex_digit(digits[0]), hex_digit(digits[1])) {
        (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
        _ => Err(Error::MalformedRecord {
            line,
            reason: "invalid hex digit",
        }),
    }
}

/// Decode one HEX line. `line` is the 1-based line number used in errors.
pub fn parse_record(line: usize, text: &str) -> Result<HexRecord> {
    let bytes = text.trim_end().as_bytes();

    if bytes.first() != Some(&START_CODE) {
        return Err(Error::MalformedRecord {
            line,
            reason: "missing start code",
        });
    }
    if bytes.len() < HEADER_LEN {
        return Err(Error::MalformedRecord {
            line,
            reason: "truncated header",
        });
    }

    let byte_count = hex_byte(line, &bytes[1..3])?;
    let address = u16::from_be_bytes([hex_byte(line, &bytes[3..5])?, hex_byte(line, &bytes[5..7])?]);
    let type_code = hex_byte(line, &bytes[7..9])?;

    let record_type = RecordType::from_u8(type_code).ok_or(Error::UnknownRecordType {
        line,
        record_type: type_code,
    })?;

    let payload_end = HEADER_LEN + usize::from(byte_count) * 2;
    if bytes.len() < payload_end {
        return Err(Error::MalformedRecord {
            line,
            reason: "payload shorter than byte count",
        });
    }

    let mut data = HeaplessVec::new();
    for pair in bytes[HEADER_LEN..payload_end].chunks_exact(2) {
        // byte_count <= 255 == capacity
        let _ = data.push(hex_byte(line, pair)?);
    }

    if record_type == RecordType::ExtendedLinearAddress && data.len() < 2 {
        return Err(Error::MalformedRecord {
            line,
            reason: "extended address record needs 2 bytes",
        });
    }

    Ok(HexRecord {
        record_type,
        byte_count,
        address,
        data,
    })
}

/// Lazily decodes records from a line-oriented reader.
///
/// Blank lines are skipped. The reader is consumed once; the iterator is
/// exhausted when the underlying input is.
#[cfg(feature = "std")]
pub struct HexReader<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

#[cfg(feature = "std")]
impl<R: std::io::BufRead> HexReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

#[cfg(feature = "std")]
impl<R: std::io::BufRead> Iterator for HexReader<R> {
    type Item = Result<HexRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(Error::Io(e.kind()))),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return Some(parse_record(self.line, &text));
        }
    }
}

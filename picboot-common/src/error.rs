// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error type shared by the HEX parser, the device catalog and the memory image.

use crate::protocol::Family;

/// Fatal conditions detected before any row is transferred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// HEX line could not be decoded.
    #[error("malformed HEX record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: &'static str },

    /// HEX record type other than data, end-of-file or extended linear address.
    #[error("unknown HEX record type 0x{record_type:02x} on line {line}")]
    UnknownRecordType { line: usize, record_type: u8 },

    /// HEX data targets an address no memory row covers.
    #[error("bad HEX file: address 0x{0:06x} out of range")]
    AddressOutOfRange(u32),

    /// The target reported an id/revision pair the catalog does not know.
    #[error("device not found (ID: 0x{device_id:04x}, process: {process_id})")]
    DeviceNotFound { device_id: u16, process_id: u8 },

    /// EEPROM operation on a family without data EEPROM.
    #[error("{0} devices have no data EEPROM")]
    NoEeprom(Family),

    /// HEX input could not be read.
    #[cfg(feature = "std")]
    #[error("failed to read HEX input: {0}")]
    Io(std::io::ErrorKind),
}

pub type Result<T> = core::result::Result<T, Error>;

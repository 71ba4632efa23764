// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Shared protocol definitions for programmer <-> bootloader communication.
//!
//! The wire protocol is a bare byte stream: a one-byte opcode, an optional
//! 3-byte little-endian address and an optional payload whose size both ends
//! derive from the opcode and the device family. There is no length field
//! and no framing, so every constant in this module is part of the contract.

// --- Opcodes ---

/// Single-byte command/response codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    Nack = 0x00,
    Ack = 0x01,
    ReadProgramMemory = 0x02,
    WriteProgramMemory = 0x03,
    ReadEeprom = 0x04,
    WriteEeprom = 0x05,
    WriteConfig = 0x07,
    Reset = 0x08,
    ReadId = 0x09,
}

impl Opcode {
    /// Decode a received command byte. Returns `None` for unknown values.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Nack),
            0x01 => Some(Self::Ack),
            0x02 => Some(Self::ReadProgramMemory),
            0x03 => Some(Self::WriteProgramMemory),
            0x04 => Some(Self::ReadEeprom),
            0x05 => Some(Self::WriteEeprom),
            0x07 => Some(Self::WriteConfig),
            0x08 => Some(Self::Reset),
            0x09 => Some(Self::ReadId),
            _ => None,
        }
    }
}

// --- Memory map (device program-counter units: HEX byte address / 2) ---

pub const PROGRAM_BASE: u32 = 0x00_0000;
pub const EEPROM_BASE: u32 = 0x7F_F000;
pub const CONFIG_BASE: u32 = 0xF8_0000;
pub const DEVICE_ID_ADDR: u32 = 0xFF_0000;
pub const DEVICE_REV_ADDR: u32 = 0xFF_0002;

/// Location of the bootloader entry-window setting (low byte, in seconds).
pub const BOOT_DELAY_ADDR: u32 = 0x00_0C00;

// --- Row geometry ---

pub const PM30F_ROW_WORDS: usize = 32;
pub const PM33F_ROW_WORDS: usize = 64 * 8;
pub const EE30F_ROW_WORDS: usize = 16;

pub const PM30F_ROW_COUNT: usize = 1536; // 144KB / 3 / 32
pub const PM33F_ROW_COUNT: usize = 172; // covers 0x2AC00 (256KB parts)
pub const EE30F_ROW_COUNT: usize = 128; // 4KB / 2 / 16
pub const CONFIG_ROW_COUNT: usize = 8;

/// Bytes per instruction word on the wire (phantom byte dropped).
pub const PM_WORD_BYTES: usize = 3;
/// Bytes per EEPROM word on the wire.
pub const EE_WORD_BYTES: usize = 2;
/// Address units spanned by one instruction or EEPROM word.
pub const WORD_UNITS: u32 = 2;

/// Words per hardware latch row on dsPIC33F (one row-write operation).
pub const LATCH_ROW_WORDS: usize = 64;

/// Instruction words the host reads back from the target to keep the
/// resident bootloader entry vector intact.
pub const PRESERVED_WORDS: usize = 2;

// --- Reply sizes ---

pub const ACK_LEN: usize = 1;
pub const READ_ID_REPLY_LEN: usize = 8;
pub const ADDRESS_LEN: usize = 3;
/// Bytes per configuration slot frame: empty flag, low byte, high byte.
pub const CONFIG_SLOT_LEN: usize = 3;

/// Configuration-slot flag values.
pub const CONFIG_SLOT_FILLED: u8 = 0x00;
pub const CONFIG_SLOT_EMPTY: u8 = 0x01;

/// The mask/value pair selecting latch addresses affected by the
/// device-ID silicon errata.
pub const ERRATA_ADDR_MASK: u32 = 0x1F;
pub const ERRATA_ADDR_MATCH: u32 = 0x18;

/// Returns true if writing `addr` must be deferred to the end of its row.
pub fn is_errata_address(addr: u32) -> bool {
    addr & ERRATA_ADDR_MASK == ERRATA_ADDR_MATCH
}

// --- Encodings ---

/// Encode a 24-bit address as 3 little-endian bytes.
pub fn encode_address(addr: u32) -> [u8; ADDRESS_LEN] {
    [addr as u8, (addr >> 8) as u8, (addr >> 16) as u8]
}

/// Decode a 3-byte little-endian address.
pub fn decode_address(bytes: [u8; ADDRESS_LEN]) -> u32 {
    u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16
}

/// Layout of one instruction word in a WriteProgramMemory payload.
pub fn encode_write_word(word: u32) -> [u8; PM_WORD_BYTES] {
    [word as u8, (word >> 8) as u8, (word >> 16) as u8]
}

pub fn decode_write_word(bytes: &[u8]) -> u32 {
    u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16
}

/// Layout of one instruction word in a ReadProgramMemory reply.
///
/// Read replies are sent high byte first, the reverse of write payloads.
pub fn encode_read_word(word: u32) -> [u8; PM_WORD_BYTES] {
    [(word >> 16) as u8, (word >> 8) as u8, word as u8]
}

pub fn decode_read_word(bytes: &[u8]) -> u32 {
    u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2])
}

/// Extract (device id, process id) from a ReadId reply.
pub fn decode_id_reply(reply: &[u8; READ_ID_REPLY_LEN]) -> (u16, u8) {
    let device_id = u16::from_le_bytes([reply[0], reply[1]]);
    let process_id = (reply[5] >> 4) & 0x0F;
    (device_id, process_id)
}

// --- Device families ---

/// A device sub-class; determines every row geometry decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    DsPic30F,
    DsPic33F,
    Pic24H,
    Pic24F,
}

impl Family {
    pub fn program_row_words(self) -> usize {
        match self {
            Family::DsPic30F => PM30F_ROW_WORDS,
            _ => PM33F_ROW_WORDS,
        }
    }

    pub fn program_row_count(self) -> usize {
        match self {
            Family::DsPic30F => PM30F_ROW_COUNT,
            _ => PM33F_ROW_COUNT,
        }
    }

    /// Only dsPIC30F parts carry data EEPROM.
    pub fn eeprom_row_count(self) -> usize {
        match self {
            Family::DsPic30F => EE30F_ROW_COUNT,
            _ => 0,
        }
    }

    pub fn has_eeprom(self) -> bool {
        self.eeprom_row_count() > 0
    }

    /// Configuration slots the family's bootloader accepts.
    pub fn config_slots(self) -> usize {
        match self {
            Family::DsPic30F => CONFIG_ROW_COUNT - 1,
            _ => CONFIG_ROW_COUNT,
        }
    }

    /// Address units covered by one program row.
    pub fn program_row_units(self) -> u32 {
        self.program_row_words() as u32 * WORD_UNITS
    }

    /// Size of a ReadProgramMemory reply / WriteProgramMemory payload.
    pub fn program_row_bytes(self) -> usize {
        self.program_row_words() * PM_WORD_BYTES
    }

    /// Round `addr` down to the start of its program row.
    pub fn align_program(self, addr: u32) -> u32 {
        addr - addr % self.program_row_units()
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::DsPic30F => "dsPIC30F",
            Family::DsPic33F => "dsPIC33F",
            Family::Pic24H => "PIC24H",
            Family::Pic24F => "PIC24F",
        }
    }
}

impl core::fmt::Display for Family {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

pub const EE_ROW_UNITS: u32 = EE30F_ROW_WORDS as u32 * WORD_UNITS;
pub const EE_ROW_BYTES: usize = EE30F_ROW_WORDS * EE_WORD_BYTES;

/// Round `addr` down to the start of its EEPROM row.
pub fn align_eeprom(addr: u32) -> u32 {
    addr - addr % EE_ROW_UNITS
}

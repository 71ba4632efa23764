// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for protocol types, constants and word encodings.

use picboot_common::protocol::{
    align_eeprom, decode_address, decode_id_reply, decode_read_word, decode_write_word,
    encode_address, encode_read_word, encode_write_word, is_errata_address, Family, Opcode,
    CONFIG_BASE, EEPROM_BASE, EE_ROW_BYTES,
};

// --- Opcode tests ---

#[test]
fn test_opcode_values() {
    assert_eq!(Opcode::Nack as u8, 0x00);
    assert_eq!(Opcode::Ack as u8, 0x01);
    assert_eq!(Opcode::ReadProgramMemory as u8, 0x02);
    assert_eq!(Opcode::WriteProgramMemory as u8, 0x03);
    assert_eq!(Opcode::ReadEeprom as u8, 0x04);
    assert_eq!(Opcode::WriteEeprom as u8, 0x05);
    assert_eq!(Opcode::WriteConfig as u8, 0x07);
    assert_eq!(Opcode::Reset as u8, 0x08);
    assert_eq!(Opcode::ReadId as u8, 0x09);
}

#[test]
fn test_opcode_from_u8() {
    assert_eq!(Opcode::from_u8(0x09), Some(Opcode::ReadId));
    assert_eq!(Opcode::from_u8(0x06), None);
    assert_eq!(Opcode::from_u8(0xFF), None);
}

// --- Memory map tests ---

#[test]
fn test_region_bases() {
    assert_eq!(EEPROM_BASE, 0x7F_F000);
    assert_eq!(CONFIG_BASE, 0xF8_0000);
}

// --- Encoding tests ---

#[test]
fn test_address_is_little_endian() {
    assert_eq!(encode_address(0x12_3456), [0x56, 0x34, 0x12]);
    assert_eq!(decode_address([0x00, 0xF0, 0x7F]), EEPROM_BASE);
}

#[test]
fn test_address_drops_top_byte() {
    assert_eq!(encode_address(0xAB12_3456), [0x56, 0x34, 0x12]);
}

#[test]
fn test_write_and_read_word_layouts_are_reversed() {
    let word = 0x00AB_CDEF;
    assert_eq!(encode_write_word(word), [0xEF, 0xCD, 0xAB]);
    assert_eq!(encode_read_word(word), [0xAB, 0xCD, 0xEF]);
    assert_eq!(decode_write_word(&[0xEF, 0xCD, 0xAB]), word);
    assert_eq!(decode_read_word(&[0xAB, 0xCD, 0xEF]), word);
}

#[test]
fn test_decode_id_reply() {
    let reply = [0xC1, 0x00, 0x00, 0x00, 0x03, 0x30, 0x00, 0x00];
    assert_eq!(decode_id_reply(&reply), (0x00C1, 3));
}

#[test]
fn test_decode_id_reply_ignores_low_revision_nibble() {
    let reply = [0x40, 0x00, 0x00, 0x00, 0xFF, 0x1F, 0x00, 0x00];
    assert_eq!(decode_id_reply(&reply), (0x0040, 1));
}

// --- Errata address tests ---

#[test]
fn test_errata_addresses() {
    assert!(is_errata_address(0x18));
    assert!(is_errata_address(0x38));
    assert!(is_errata_address(0x1_2318));
    assert!(!is_errata_address(0x16));
    assert!(!is_errata_address(0x1A));
    assert!(!is_errata_address(0x08));
}

// --- Family geometry tests ---

#[test]
fn test_dspic30f_geometry() {
    let f = Family::DsPic30F;
    assert_eq!(f.program_row_words(), 32);
    assert_eq!(f.program_row_count(), 1536);
    assert_eq!(f.program_row_bytes(), 96);
    assert_eq!(f.program_row_units(), 64);
    assert_eq!(f.eeprom_row_count(), 128);
    assert!(f.has_eeprom());
    assert_eq!(f.config_slots(), 7);
}

#[test]
fn test_dspic33f_geometry() {
    for f in [Family::DsPic33F, Family::Pic24H, Family::Pic24F] {
        assert_eq!(f.program_row_words(), 512);
        assert_eq!(f.program_row_count(), 172);
        assert_eq!(f.program_row_bytes(), 1536);
        assert_eq!(f.eeprom_row_count(), 0);
        assert!(!f.has_eeprom());
        assert_eq!(f.config_slots(), 8);
    }
}

#[test]
fn test_alignment() {
    assert_eq!(Family::DsPic33F.align_program(0x0523), 0x0400);
    assert_eq!(Family::DsPic30F.align_program(0x0045), 0x0040);
    assert_eq!(align_eeprom(0x7F_F013), 0x7F_F000);
    assert_eq!(align_eeprom(0x7F_F020), 0x7F_F020);
    assert_eq!(EE_ROW_BYTES, 32);
}

#[test]
fn test_family_display() {
    assert_eq!(Family::DsPic33F.to_string(), "dsPIC33F");
    assert_eq!(Family::Pic24H.to_string(), "PIC24H");
}

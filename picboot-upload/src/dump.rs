// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Text rendering of memory read back from the target.

use std::fmt::Write;

use picboot_common::protocol::{EE_WORD_BYTES, PM_WORD_BYTES, WORD_UNITS};

const PROGRAM_WORDS_PER_LINE: usize = 4;
const EEPROM_WORDS_PER_LINE: usize = 8;

fn render(address: u32, reply: &[u8], word_bytes: usize, words_per_line: usize) -> Vec<String> {
    let line_bytes = word_bytes * words_per_line;
    let line_units = words_per_line as u32 * WORD_UNITS;

    reply
        .chunks(line_bytes)
        .enumerate()
        .map(|(n, chunk)| {
            let mut line = format!("0x{:06x}:", address + n as u32 * line_units);
            for word in chunk.chunks(word_bytes) {
                line.push(' ');
                for byte in word {
                    let _ = write!(line, "{:02x}", byte);
                }
            }
            line
        })
        .collect()
}

/// One line per 4 instruction words, each printed high byte first.
pub fn program_lines(address: u32, reply: &[u8]) -> Vec<String> {
    render(address, reply, PM_WORD_BYTES, PROGRAM_WORDS_PER_LINE)
}

/// One line per 8 EEPROM words, each printed low byte first.
pub fn eeprom_lines(address: u32, reply: &[u8]) -> Vec<String> {
    render(address, reply, EE_WORD_BYTES, EEPROM_WORDS_PER_LINE)
}

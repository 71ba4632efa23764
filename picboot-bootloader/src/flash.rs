// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash operations - page erase/program with the errata write ordering,
//! page reads, device id and staged configuration words.
//!
//! The NVM controller itself is behind [`FlashController`]; a board crate
//! implements it with the table-read/table-write instructions.

use picboot_common::boot_fsm::BootDelay;
use picboot_common::protocol::{
    decode_write_word, encode_read_word, is_errata_address, BOOT_DELAY_ADDR, CONFIG_BASE, CONFIG_ROW_COUNT,
    CONFIG_SLOT_FILLED, CONFIG_SLOT_LEN, DEVICE_ID_ADDR, DEVICE_REV_ADDR, LATCH_ROW_WORDS,
    PM33F_ROW_WORDS, PM_WORD_BYTES, READ_ID_REPLY_LEN, WORD_UNITS,
};

/// Instruction words per erase page (one WriteProgramMemory payload).
pub const PAGE_WORDS: usize = PM33F_ROW_WORDS;
pub const PAGE_BYTES: usize = PAGE_WORDS * PM_WORD_BYTES;

/// Access to the target's non-volatile memory controller.
pub trait FlashController {
    /// Read the instruction word (or device register) at `addr`.
    fn read_word(&mut self, addr: u32) -> u32;

    /// Erase the page starting at `addr`.
    fn erase_page(&mut self, addr: u32);

    /// Load one instruction word into the write latches.
    fn latch_word(&mut self, addr: u32, word: u32);

    /// Program the currently latched row.
    fn commit_row(&mut self);

    /// Program a single configuration word.
    fn write_config_word(&mut self, addr: u32, value: u16);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LatchedWord {
    addr: u32,
    word: u32,
}

/// Latches the words of one row, holding back the errata-affected word.
///
/// At most one word is deferred per row: a later errata address displaces
/// the held word, which is latched on the spot. [`RowProgrammer::finish`]
/// latches the held word last and commits the row.
pub struct RowProgrammer<'a, F: FlashController> {
    flash: &'a mut F,
    deferred: Option<LatchedWord>,
}

impl<'a, F: FlashController> RowProgrammer<'a, F> {
    pub fn new(flash: &'a mut F) -> Self {
        Self {
            flash,
            deferred: None,
        }
    }

    pub fn write(&mut self, addr: u32, word: u32) {
        if is_errata_address(addr) {
            if let Some(held) = self.deferred.replace(LatchedWord { addr, word }) {
                self.flash.latch_word(held.addr, held.word);
            }
        } else {
            self.flash.latch_word(addr, word);
        }
    }

    /// Address of the word currently held back, if any.
    pub fn deferred_addr(&self) -> Option<u32> {
        self.deferred.map(|d| d.addr)
    }

    pub fn finish(mut self) {
        if let Some(held) = self.deferred.take() {
            self.flash.latch_word(held.addr, held.word);
        }
        self.flash.commit_row();
    }
}

/// Erase the page at `addr` and program it from a write payload
/// (`[low, mid, high]` per word).
pub fn program_page<F: FlashController>(flash: &mut F, addr: u32, payload: &[u8; PAGE_BYTES]) {
    flash.erase_page(addr);

    let row_bytes = LATCH_ROW_WORDS * PM_WORD_BYTES;
    let mut row_addr = addr;
    for row in payload.chunks_exact(row_bytes) {
        let mut programmer = RowProgrammer::new(&mut *flash);
        for (n, word) in row.chunks_exact(PM_WORD_BYTES).enumerate() {
            programmer.write(row_addr + n as u32 * WORD_UNITS, decode_write_word(word));
        }
        programmer.finish();
        row_addr += LATCH_ROW_WORDS as u32 * WORD_UNITS;
    }
}

/// Read one page into `buf` in read-reply layout (`[high, mid, low]` per word).
pub fn read_page<F: FlashController>(flash: &mut F, addr: u32, buf: &mut [u8; PAGE_BYTES]) {
    for (n, out) in buf.chunks_exact_mut(PM_WORD_BYTES).enumerate() {
        let word = flash.read_word(addr + n as u32 * WORD_UNITS);
        out.copy_from_slice(&encode_read_word(word));
    }
}

/// Device id and revision registers, little-endian, 4 bytes each.
pub fn read_device_id<F: FlashController>(flash: &mut F) -> [u8; READ_ID_REPLY_LEN] {
    let mut reply = [0u8; READ_ID_REPLY_LEN];
    reply[..4].copy_from_slice(&flash.read_word(DEVICE_ID_ADDR).to_le_bytes());
    reply[4..].copy_from_slice(&flash.read_word(DEVICE_REV_ADDR).to_le_bytes());
    reply
}

/// Read the configured entry window.
pub fn read_boot_delay<F: FlashController>(flash: &mut F) -> BootDelay {
    BootDelay::from_config_byte(flash.read_word(BOOT_DELAY_ADDR) as u8)
}

/// Configuration words received by WriteConfig, held until Reset.
#[derive(Clone, Debug, Default)]
pub struct ConfigStaging {
    slots: [Option<u16>; CONFIG_ROW_COUNT],
}

impl ConfigStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one `[empty, low, high]` slot frame. Empty slots clear the slot.
    pub fn stage(&mut self, slot: usize, frame: [u8; CONFIG_SLOT_LEN]) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = (frame[0] == CONFIG_SLOT_FILLED).then(|| u16::from_le_bytes([frame[1], frame[2]]));
        }
    }

    pub fn staged(&self, slot: usize) -> Option<u16> {
        self.slots.get(slot).copied().flatten()
    }

    /// Program every staged word to its configuration register.
    pub fn commit<F: FlashController>(&self, flash: &mut F) {
        for (slot, value) in self.slots.iter().enumerate() {
            if let Some(value) = value {
                flash.write_config_word(CONFIG_BASE + slot as u32 * WORD_UNITS, *value);
            }
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side tests of the bootloader command loop against simulated
//! UART, timer and flash.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;

use picboot_bootloader::flash::{
    program_page, read_device_id, ConfigStaging, FlashController, RowProgrammer, PAGE_BYTES,
};
use picboot_bootloader::uart::{EntryTimer, SerialLink};
use picboot_bootloader::update::run_update_mode;
use picboot_bootloader::{run, Exit};
use picboot_common::boot_fsm::{BootDelay, EntryWindow};
use picboot_common::protocol::{
    decode_id_reply, encode_address, encode_write_word, BOOT_DELAY_ADDR, CONFIG_BASE,
    DEVICE_ID_ADDR, DEVICE_REV_ADDR,
};

// =============================================================================
// Simulated peripherals
// =============================================================================

#[derive(Default)]
struct SimUart {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl SimUart {
    fn with_input(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            tx: Vec::new(),
        }
    }
}

impl embedded_io::ErrorType for SimUart {
    type Error = Infallible;
}

impl embedded_io::Read for SimUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for SimUart {
    fn read_ready(&mut self) -> Result<bool, Infallible> {
        Ok(!self.rx.is_empty())
    }
}

impl embedded_io::Write for SimUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Expires after a fixed number of polls.
#[derive(Default)]
struct ManualTimer {
    started: Option<u8>,
    cancelled: bool,
    expires_after: u32,
    polls: u32,
}

impl ManualTimer {
    fn expiring_after(polls: u32) -> Self {
        Self {
            expires_after: polls,
            ..Self::default()
        }
    }
}

impl EntryTimer for ManualTimer {
    fn start(&mut self, seconds: u8) {
        self.started = Some(seconds);
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn expired(&mut self) -> bool {
        self.polls += 1;
        self.polls > self.expires_after
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlashOp {
    Erase(u32),
    Latch(u32, u32),
    Commit,
    Config(u32, u16),
}

#[derive(Default)]
struct SimFlash {
    words: HashMap<u32, u32>,
    latches: Vec<(u32, u32)>,
    ops: Vec<FlashOp>,
}

impl SimFlash {
    fn new() -> Self {
        let mut flash = Self::default();
        flash.words.insert(DEVICE_ID_ADDR, 0x0000_00C1);
        flash.words.insert(DEVICE_REV_ADDR, 0x0000_3003);
        flash.words.insert(BOOT_DELAY_ADDR, 0x0000_0005);
        flash
    }

    fn latched_addrs(&self) -> Vec<u32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FlashOp::Latch(addr, _) => Some(*addr),
                _ => None,
            })
            .collect()
    }
}

impl FlashController for SimFlash {
    fn read_word(&mut self, addr: u32) -> u32 {
        self.words.get(&addr).copied().unwrap_or(0x00FF_FFFF)
    }

    fn erase_page(&mut self, addr: u32) {
        self.ops.push(FlashOp::Erase(addr));
        for n in 0..512 {
            self.words.remove(&(addr + n * 2));
        }
    }

    fn latch_word(&mut self, addr: u32, word: u32) {
        self.ops.push(FlashOp::Latch(addr, word));
        self.latches.push((addr, word));
    }

    fn commit_row(&mut self) {
        self.ops.push(FlashOp::Commit);
        for (addr, word) in self.latches.drain(..) {
            self.words.insert(addr, word);
        }
    }

    fn write_config_word(&mut self, addr: u32, value: u16) {
        self.ops.push(FlashOp::Config(addr, value));
    }
}

fn session(input: &[u8], delay: BootDelay, timer: ManualTimer, flash: &mut SimFlash) -> (Exit, Vec<u8>, ManualTimer) {
    let mut link = SerialLink::new(SimUart::with_input(input), timer, delay);
    let exit = run_update_mode(&mut link, flash, delay);
    let (uart, timer) = link.release();
    (exit, uart.tx, timer)
}

fn page_payload() -> Vec<u8> {
    (0..512u32)
        .flat_map(|n| encode_write_word(0x10_0000 | n))
        .collect()
}

// =============================================================================
// Entry window tests
// =============================================================================

#[test]
fn test_window_expiry_hands_off_once() {
    let mut flash = SimFlash::new();
    let (exit, tx, timer) = session(&[], BootDelay::Seconds(3), ManualTimer::expiring_after(4), &mut flash);
    assert_eq!(exit, Exit::Handoff);
    assert!(tx.is_empty());
    assert_eq!(timer.started, Some(3));
    assert_eq!(timer.polls, 5);
    assert!(flash.ops.is_empty());
}

#[test]
fn test_immediate_delay_never_listens() {
    let mut flash = SimFlash::new();
    let (exit, tx, timer) = session(&[0x09], BootDelay::Immediate, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Handoff);
    assert!(tx.is_empty());
    assert_eq!(timer.started, None);
    assert_eq!(timer.polls, 0);
}

#[test]
fn test_first_byte_disarms_window() {
    let mut flash = SimFlash::new();
    let (exit, tx, timer) = session(&[0x09, 0x08], BootDelay::Seconds(1), ManualTimer::expiring_after(1), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx.len(), 8);
    assert!(timer.cancelled);
    assert_eq!(timer.polls, 1);
}

#[test]
fn test_forever_delay_has_no_window() {
    let link = SerialLink::new(SimUart::default(), ManualTimer::default(), BootDelay::Forever);
    assert_eq!(link.window(), EntryWindow::Disarmed);
}

#[test]
fn test_run_reads_delay_from_flash() {
    let mut flash = SimFlash::new();
    flash.words.insert(BOOT_DELAY_ADDR, 0x0000_0000);
    let exit = run(SimUart::with_input(&[0x09]), ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Handoff);
}

// =============================================================================
// Command tests
// =============================================================================

#[test]
fn test_read_id_reply() {
    let mut flash = SimFlash::new();
    let (exit, tx, _) = session(&[0x09, 0x08], BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx, vec![0xC1, 0x00, 0x00, 0x00, 0x03, 0x30, 0x00, 0x00]);

    let reply: [u8; 8] = tx.try_into().unwrap();
    assert_eq!(decode_id_reply(&reply), (0xC1, 3));
    assert_eq!(read_device_id(&mut flash), reply);
}

#[test]
fn test_read_program_sends_high_byte_first() {
    let mut flash = SimFlash::new();
    flash.words.insert(0x0400, 0x0012_3456);
    flash.words.insert(0x0402, 0x00AB_CDEF);

    let mut input = vec![0x02];
    input.extend_from_slice(&encode_address(0x0400));
    input.push(0x08);
    let (_, tx, _) = session(&input, BootDelay::Forever, ManualTimer::default(), &mut flash);

    assert_eq!(tx.len(), PAGE_BYTES);
    assert_eq!(&tx[..6], &[0x12, 0x34, 0x56, 0xAB, 0xCD, 0xEF]);
    assert_eq!(&tx[6..9], &[0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_write_program_erases_programs_and_acks() {
    let mut flash = SimFlash::new();
    let mut input = vec![0x03];
    input.extend_from_slice(&encode_address(0x0400));
    input.extend_from_slice(&page_payload());
    input.push(0x08);

    let (exit, tx, _) = session(&input, BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx, vec![0x01]);
    assert_eq!(flash.ops[0], FlashOp::Erase(0x0400));
    assert_eq!(flash.ops.iter().filter(|op| **op == FlashOp::Commit).count(), 8);

    for n in 0..512u32 {
        assert_eq!(flash.words[&(0x0400 + n * 2)], 0x10_0000 | n);
    }
}

#[test]
fn test_write_config_staged_until_reset() {
    let mut flash = SimFlash::new();
    let mut input = vec![0x07, 0x00, 0x34, 0x12];
    for slot in 1..8u8 {
        if slot == 3 {
            input.extend_from_slice(&[0x00, 0xCD, 0xAB]);
        } else {
            input.extend_from_slice(&[0x01, 0x00, 0x00]);
        }
    }

    input.push(0x08);
    let (exit, tx, _) = session(&input, BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx, vec![0x01; 8]);
    assert_eq!(
        flash.ops,
        vec![
            FlashOp::Config(CONFIG_BASE, 0x1234),
            FlashOp::Config(CONFIG_BASE + 6, 0xABCD),
        ]
    );
}

#[test]
fn test_config_staging_starts_empty() {
    let mut staging = ConfigStaging::new();
    assert!((0..8).all(|slot| staging.staged(slot).is_none()));
    staging.stage(0, [0x00, 0x34, 0x12]);
    assert_eq!(staging.staged(0), Some(0x1234));
    staging.stage(9, [0x00, 0x34, 0x12]);
    assert_eq!(staging.staged(9), None);
}

#[test]
fn test_config_empty_frame_clears_slot() {
    let mut staging = ConfigStaging::new();
    staging.stage(2, [0x00, 0x11, 0x22]);
    staging.stage(2, [0x01, 0x11, 0x22]);
    assert_eq!(staging.staged(2), None);

    let mut flash = SimFlash::new();
    staging.commit(&mut flash);
    assert!(flash.ops.is_empty());
}

#[test]
fn test_unknown_opcode_nacks_and_resets() {
    let mut flash = SimFlash::new();
    let (exit, tx, _) = session(&[0x42, 0x09], BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx, vec![0x00]);
}

#[test]
fn test_eeprom_opcode_is_rejected() {
    let mut flash = SimFlash::new();
    let (exit, tx, _) = session(&[0x04], BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert_eq!(tx, vec![0x00]);
}

#[test]
fn test_nack_opcode_resets_silently() {
    let mut flash = SimFlash::new();
    let (exit, tx, _) = session(&[0x00, 0x09], BootDelay::Forever, ManualTimer::default(), &mut flash);
    assert_eq!(exit, Exit::Reset);
    assert!(tx.is_empty());
}

// =============================================================================
// Errata write ordering tests
// =============================================================================

#[test]
fn test_errata_word_latched_last_in_row() {
    let mut flash = SimFlash::new();
    let payload: [u8; PAGE_BYTES] = page_payload().try_into().unwrap();
    program_page(&mut flash, 0x0000, &payload);

    // First latch row covers 0x00..0x7E; 0x18, 0x38, 0x58, 0x78 are affected.
    let first_row: Vec<u32> = flash.latched_addrs().into_iter().take(64).collect();
    assert_eq!(first_row.last(), Some(&0x78));
    assert_eq!(flash.ops[65], FlashOp::Commit);
    assert_eq!(flash.ops[64], FlashOp::Latch(0x78, 0x10_003C));

    let pos = |addr: u32| first_row.iter().position(|a| *a == addr).unwrap();
    assert_eq!(pos(0x18), pos(0x36) + 1);
    assert_eq!(pos(0x38), pos(0x56) + 1);
    assert_eq!(pos(0x58), pos(0x76) + 1);

    let mut sorted = first_row.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..64u32).map(|n| n * 2).collect::<Vec<_>>());
}

#[test]
fn test_row_programmer_holds_one_word() {
    let mut flash = SimFlash::new();
    let mut row = RowProgrammer::new(&mut flash);
    row.write(0x18, 1);
    assert_eq!(row.deferred_addr(), Some(0x18));
    row.write(0x1A, 2);
    row.write(0x38, 3);
    assert_eq!(row.deferred_addr(), Some(0x38));
    row.finish();

    assert_eq!(
        flash.ops,
        vec![
            FlashOp::Latch(0x1A, 2),
            FlashOp::Latch(0x18, 1),
            FlashOp::Latch(0x38, 3),
            FlashOp::Commit,
        ]
    );
}

#[test]
fn test_row_without_errata_address_commits_in_order() {
    let mut flash = SimFlash::new();
    let mut row = RowProgrammer::new(&mut flash);
    row.write(0x00, 7);
    row.write(0x02, 8);
    row.finish();
    assert_eq!(flash.ops, vec![FlashOp::Latch(0x00, 7), FlashOp::Latch(0x02, 8), FlashOp::Commit]);
}

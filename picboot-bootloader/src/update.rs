// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command loop of the serial bootloader.
//!
//! Served commands:
//! - ReadProgramMemory: reply with one page, high byte first per word
//! - WriteProgramMemory: erase and program one page, then ACK
//! - ReadId: reply with the device id and revision registers
//! - WriteConfig: stage the configuration slots, ACK each one
//! - Reset: program staged configuration and restart
//! - NACK: restart without a reply
//!
//! Anything else is answered with NACK and the device restarts.

use embedded_io::{Read, ReadReady, Write};
use picboot_common::boot_fsm::{self, Action, BootDelay, Event, LoaderState};
use picboot_common::protocol::{decode_address, Opcode, ADDRESS_LEN, CONFIG_ROW_COUNT, CONFIG_SLOT_LEN};

use crate::flash::{self, ConfigStaging, FlashController, PAGE_BYTES};
use crate::uart::{EntryTimer, SerialLink};

/// How the loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exit {
    /// Jump to the user application.
    Handoff,
    /// Restart the device.
    Reset,
}

/// Per-session data the handlers share.
struct Session {
    config: ConfigStaging,
    page: [u8; PAGE_BYTES],
}

/// Run the command loop until a terminal state is reached.
pub fn run_update_mode<U, T, F>(link: &mut SerialLink<U, T>, flash: &mut F, delay: BootDelay) -> Exit
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
    F: FlashController,
{
    let mut state = boot_fsm::initial_state(delay);
    let mut session = Session {
        config: ConfigStaging::new(),
        page: [0xFF; PAGE_BYTES],
    };

    loop {
        state = match state {
            LoaderState::AwaitingCommand => match link.get_command() {
                Some(byte) => boot_fsm::next_state(state, Event::CommandByte(byte)),
                None => {
                    crate::debug!("entry window expired");
                    boot_fsm::next_state(state, Event::WindowExpired)
                }
            },
            LoaderState::Dispatching(action) => {
                handle_command(link, flash, &mut session, action);
                boot_fsm::next_state(state, Event::Completed)
            }
            LoaderState::HandoffToApplication => return Exit::Handoff,
            LoaderState::Reset => return Exit::Reset,
        };
    }
}

/// Dispatch an action to its handler.
fn handle_command<U, T, F>(link: &mut SerialLink<U, T>, flash: &mut F, session: &mut Session, action: Action)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
    F: FlashController,
{
    match action {
        Action::ReadProgram => handle_read_program(link, flash, session),
        Action::WriteProgram => handle_write_program(link, flash, session),
        Action::ReadId => handle_read_id(link, flash),
        Action::WriteConfig => handle_write_config(link, session),
        Action::Reset => handle_reset(flash, session),
        Action::Nack => crate::debug!("NACK received, restarting"),
        Action::Reject(byte) => handle_reject(link, byte),
    }
}

fn read_address<U, T>(link: &mut SerialLink<U, T>) -> u32
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
{
    let mut addr = [0u8; ADDRESS_LEN];
    link.read_exact(&mut addr);
    decode_address(addr)
}

/// Handle ReadProgramMemory: stream one page back to the host.
fn handle_read_program<U, T, F>(link: &mut SerialLink<U, T>, flash: &mut F, session: &mut Session)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
    F: FlashController,
{
    let addr = read_address(link);
    crate::debug!("read page 0x{:x}", addr);
    flash::read_page(flash, addr, &mut session.page);
    link.put_all(&session.page);
}

/// Handle WriteProgramMemory: receive a page, program it, acknowledge.
fn handle_write_program<U, T, F>(link: &mut SerialLink<U, T>, flash: &mut F, session: &mut Session)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
    F: FlashController,
{
    let addr = read_address(link);
    link.read_exact(&mut session.page);
    crate::debug!("write page 0x{:x}", addr);
    flash::program_page(flash, addr, &session.page);
    link.put(Opcode::Ack as u8);
}

/// Handle ReadId: reply with the two identification registers.
fn handle_read_id<U, T, F>(link: &mut SerialLink<U, T>, flash: &mut F)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
    F: FlashController,
{
    let reply = flash::read_device_id(flash);
    link.put_all(&reply);
}

/// Handle WriteConfig: every slot frame is staged and acknowledged. The
/// words are only programmed on Reset.
fn handle_write_config<U, T>(link: &mut SerialLink<U, T>, session: &mut Session)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
{
    for slot in 0..CONFIG_ROW_COUNT {
        let mut frame = [0u8; CONFIG_SLOT_LEN];
        link.read_exact(&mut frame);
        session.config.stage(slot, frame);
        link.put(Opcode::Ack as u8);
    }
}

/// Handle Reset: program the staged configuration words.
fn handle_reset<F: FlashController>(flash: &mut F, session: &mut Session) {
    crate::debug!("reset requested, committing configuration");
    session.config.commit(flash);
}

/// Unknown or unserved opcode: NACK, then the loop restarts the device.
fn handle_reject<U, T>(link: &mut SerialLink<U, T>, byte: u8)
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
{
    crate::debug!("unsupported command 0x{:x}", byte);
    link.put(Opcode::Nack as u8);
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bootloader command-loop FSM - pure logic without hardware dependencies.
//!
//! This module holds the state transitions of the target-side loop so they
//! can be tested on the host. The loop in `picboot-bootloader` feeds it
//! events (a command byte arrived, the entry window expired, a command
//! finished) and acts on the resulting state.

use crate::protocol::Opcode;

/// Entry-window setting stored in the low byte at `BOOT_DELAY_ADDR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDelay {
    /// Hand off to the application without listening for a host.
    Immediate,
    /// Listen for this many seconds before handing off.
    Seconds(u8),
    /// Listen until a host connects.
    Forever,
}

impl BootDelay {
    pub fn from_config_byte(byte: u8) -> Self {
        match byte {
            0x00 => BootDelay::Immediate,
            0xFF => BootDelay::Forever,
            n => BootDelay::Seconds(n),
        }
    }
}

/// Loop states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoaderState {
    AwaitingCommand,
    Dispatching(Action),
    /// Terminal: control leaves the bootloader for the application.
    HandoffToApplication,
    /// Terminal: the device restarts.
    Reset,
}

impl LoaderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoaderState::HandoffToApplication | LoaderState::Reset)
    }
}

/// What the loop does with a received command byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    ReadProgram,
    WriteProgram,
    ReadId,
    WriteConfig,
    /// Commit staged configuration, then restart.
    Reset,
    /// Host-requested restart, no reply.
    Nack,
    /// Reply NACK, then restart.
    Reject(u8),
}

/// Map a command byte to its action. Opcodes this bootloader does not
/// serve (ACK, EEPROM access) are rejected like unknown bytes.
pub fn classify(byte: u8) -> Action {
    match Opcode::from_u8(byte) {
        Some(Opcode::ReadProgramMemory) => Action::ReadProgram,
        Some(Opcode::WriteProgramMemory) => Action::WriteProgram,
        Some(Opcode::ReadId) => Action::ReadId,
        Some(Opcode::WriteConfig) => Action::WriteConfig,
        Some(Opcode::Reset) => Action::Reset,
        Some(Opcode::Nack) => Action::Nack,
        _ => Action::Reject(byte),
    }
}

/// Inputs to the FSM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    CommandByte(u8),
    WindowExpired,
    /// The dispatched action finished and replied.
    Completed,
}

/// State at loop entry for a given delay setting.
pub fn initial_state(delay: BootDelay) -> LoaderState {
    match delay {
        BootDelay::Immediate => LoaderState::HandoffToApplication,
        _ => LoaderState::AwaitingCommand,
    }
}

/// Apply one event. Terminal states absorb every event.
pub fn next_state(state: LoaderState, event: Event) -> LoaderState {
    match (state, event) {
        (s, _) if s.is_terminal() => s,
        (LoaderState::AwaitingCommand, Event::CommandByte(byte)) => {
            LoaderState::Dispatching(classify(byte))
        }
        (LoaderState::AwaitingCommand, Event::WindowExpired) => LoaderState::HandoffToApplication,
        (LoaderState::Dispatching(action), Event::Completed) => after_dispatch(action),
        (s, _) => s,
    }
}

fn after_dispatch(action: Action) -> LoaderState {
    match action {
        Action::ReadProgram | Action::WriteProgram | Action::ReadId | Action::WriteConfig => {
            LoaderState::AwaitingCommand
        }
        Action::Reset | Action::Nack | Action::Reject(_) => LoaderState::Reset,
    }
}

/// Tracks the command-entry window.
///
/// The window only guards the very first byte of a session: once anything
/// arrives it is disarmed for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryWindow {
    Armed,
    Disarmed,
}

impl EntryWindow {
    pub fn new(delay: BootDelay) -> Self {
        match delay {
            BootDelay::Seconds(_) => EntryWindow::Armed,
            _ => EntryWindow::Disarmed,
        }
    }

    pub fn is_armed(self) -> bool {
        self == EntryWindow::Armed
    }

    /// Record that a byte was received.
    pub fn on_byte(&mut self) {
        *self = EntryWindow::Disarmed;
    }
}

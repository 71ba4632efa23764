// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Polled serial link to the programmer.
//!
//! The protocol is unframed: the loop pulls one command byte, then exactly
//! as many operand bytes as the command implies. Reads never time out
//! except for the very first byte while the entry window is armed.

use embedded_io::{Read, ReadReady, Write};
use picboot_common::boot_fsm::{BootDelay, EntryWindow};

/// One-shot timer backing the entry window.
pub trait EntryTimer {
    fn start(&mut self, seconds: u8);
    fn cancel(&mut self);
    fn expired(&mut self) -> bool;
}

pub struct SerialLink<U, T> {
    uart: U,
    timer: T,
    window: EntryWindow,
}

impl<U, T> SerialLink<U, T>
where
    U: Read + ReadReady + Write,
    T: EntryTimer,
{
    /// Wrap the UART and arm the entry window for `delay`.
    pub fn new(uart: U, mut timer: T, delay: BootDelay) -> Self {
        if let BootDelay::Seconds(seconds) = delay {
            timer.start(seconds);
        }
        Self {
            uart,
            timer,
            window: EntryWindow::new(delay),
        }
    }

    pub fn window(&self) -> EntryWindow {
        self.window
    }

    /// Wait for the next command byte. Returns `None` if the entry window
    /// expires before the first byte of the session arrives.
    pub fn get_command(&mut self) -> Option<u8> {
        loop {
            if self.window.is_armed() && self.timer.expired() {
                return None;
            }
            if let Some(byte) = self.try_byte() {
                if self.window.is_armed() {
                    self.timer.cancel();
                    self.window.on_byte();
                }
                return Some(byte);
            }
        }
    }

    /// Block until one byte arrives.
    pub fn poll_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.try_byte() {
                return byte;
            }
        }
    }

    /// Block until `buf` is full.
    pub fn read_exact(&mut self, buf: &mut [u8]) {
        for slot in buf.iter_mut() {
            *slot = self.poll_byte();
        }
    }

    pub fn put(&mut self, byte: u8) {
        self.put_all(&[byte]);
    }

    pub fn put_all(&mut self, bytes: &[u8]) {
        // No error channel back to the host.
        let _ = self.uart.write_all(bytes);
        let _ = self.uart.flush();
    }

    /// Give the UART and timer back, e.g. to hand them to the application.
    pub fn release(self) -> (U, T) {
        (self.uart, self.timer)
    }

    fn try_byte(&mut self) -> Option<u8> {
        match self.uart.read_ready() {
            Ok(true) => {
                let mut byte = [0u8; 1];
                match self.uart.read(&mut byte) {
                    Ok(1) => Some(byte[0]),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

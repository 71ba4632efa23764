// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial bootloader for dsPIC33F / PIC24H targets.
//!
//! The crate is hardware independent: a board crate supplies the UART
//! (any `embedded-io` serial port), a one-shot [`uart::EntryTimer`] and a
//! [`flash::FlashController`], calls [`run`] from its reset handler and then
//! jumps to the application or restarts depending on the returned [`Exit`].

#![no_std]

/// Debug trace routed to defmt when that feature is on, `log` otherwise.
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        log::debug!($($arg)*);
    }};
}

pub mod flash;
pub mod uart;
pub mod update;

pub use update::Exit;

use embedded_io::{Read, ReadReady, Write};

/// Read the entry-window setting and serve the programmer until the
/// session ends.
pub fn run<U, T, F>(uart: U, timer: T, flash: &mut F) -> Exit
where
    U: Read + ReadReady + Write,
    T: uart::EntryTimer,
    F: flash::FlashController,
{
    let delay = flash::read_boot_delay(flash);
    crate::debug!("bootloader start");
    let mut link = uart::SerialLink::new(uart, timer, delay);
    update::run_update_mode(&mut link, flash, delay)
}

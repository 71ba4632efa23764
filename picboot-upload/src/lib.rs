// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side programmer for the picboot serial bootloader.

pub mod driver;
pub mod dump;
pub mod session;
pub mod transport;

pub use driver::{Driver, DriverError, Link};
pub use session::{FlashOptions, FlashReport};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and utilities for the picboot programmer and bootloader.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for the bootloader
//! - `std` feature: Enables the HEX reader and memory image for host tools
//! - `defmt` feature: Derives `defmt::Format` on state types

#![cfg_attr(not(feature = "std"), no_std)]

pub mod boot_fsm;
pub mod device;
pub mod error;
pub mod hex;
pub mod protocol;

// Row model for host tools (requires std feature)
#[cfg(feature = "std")]
pub mod image;

// Re-export commonly used types
pub use device::{lookup, DeviceDescriptor, DEVICES};
pub use error::{Error, Result};
pub use protocol::{Family, Opcode};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport layer for bootloader communication.

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::SerialPort;

use crate::driver::Link;

pub const DEFAULT_BAUD: u32 = 115_200;

/// Timeout of a single port read. Reads are only issued for bytes the
/// driver already knows are pending.
const READ_TIMEOUT_MS: u64 = 100;

/// UART connection to the bootloader.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Open `port_name` at `baud`, 8N1.
    pub fn new(port_name: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .with_context(|| format!("Failed to open serial port {}", port_name))?;
        log::debug!("opened {} at {} baud", port_name, baud);
        Ok(Self { port })
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }
}

impl Link for Transport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pending = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if pending == 0 {
            return Ok(0);
        }
        let n = pending.min(buf.len());
        self.port.read(&mut buf[..n])
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host side of the bootloader wire protocol.
//!
//! Every operation writes one command frame and then accumulates the reply
//! until exactly the number of bytes the command implies has arrived. The
//! accumulation has no deadline: the protocol has no way to abort a
//! command, so a silent target blocks the driver.

use std::io;
use std::thread;
use std::time::Duration;

use picboot_common::protocol::{
    align_eeprom, decode_id_reply, encode_address, Family, Opcode, ACK_LEN, ADDRESS_LEN,
    CONFIG_SLOT_LEN, EE_ROW_BYTES, READ_ID_REPLY_LEN,
};
use picboot_common::Error;

/// Delay between two empty drains of the link.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Byte transport to the target.
pub trait Link {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Copy whatever has been received into `buf` without blocking.
    /// Returns 0 when nothing is pending.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("target rejected {opcode:?} (reply 0x{reply:02x})")]
    Nack { opcode: Opcode, reply: u8 },

    #[error(transparent)]
    Image(#[from] Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;

pub struct Driver<L> {
    link: L,
}

impl<L: Link> Driver<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        log::trace!("tx {:02x?}", &frame[..frame.len().min(8)]);
        self.link.write_all(frame)?;
        Ok(())
    }

    /// Block until exactly `len` bytes have been received.
    fn accumulate(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut reply = vec![0u8; len];
        let mut got = 0;
        while got < len {
            let n = self.link.read_available(&mut reply[got..])?;
            if n == 0 {
                thread::sleep(POLL_INTERVAL);
            }
            got += n;
        }
        log::trace!("rx {} bytes", len);
        Ok(reply)
    }

    fn expect_ack(&mut self, opcode: Opcode) -> Result<()> {
        let reply = self.accumulate(ACK_LEN)?[0];
        if reply == Opcode::Ack as u8 {
            Ok(())
        } else {
            Err(DriverError::Nack { opcode, reply })
        }
    }

    fn addressed_frame(opcode: Opcode, address: u32, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(1 + ADDRESS_LEN + payload.len());
        frame.push(opcode as u8);
        frame.extend_from_slice(&encode_address(address));
        frame.extend_from_slice(payload);
        frame
    }

    /// Returns (device id, process id).
    pub fn read_id(&mut self) -> Result<(u16, u8)> {
        self.send(&[Opcode::ReadId as u8])?;
        let reply = self.accumulate(READ_ID_REPLY_LEN)?;
        let mut id = [0u8; READ_ID_REPLY_LEN];
        id.copy_from_slice(&reply);
        Ok(decode_id_reply(&id))
    }

    /// Read the program row containing `address`. The reply carries one
    /// row of `[high, mid, low]` words starting at the aligned address.
    pub fn read_program_row(&mut self, family: Family, address: u32) -> Result<Vec<u8>> {
        let address = family.align_program(address);
        self.send(&Self::addressed_frame(Opcode::ReadProgramMemory, address, &[]))?;
        self.accumulate(family.program_row_bytes())
    }

    /// Read the EEPROM row containing `address` as `[low, high]` words.
    pub fn read_eeprom_row(&mut self, family: Family, address: u32) -> Result<Vec<u8>> {
        if !family.has_eeprom() {
            return Err(Error::NoEeprom(family).into());
        }
        let address = align_eeprom(address);
        self.send(&Self::addressed_frame(Opcode::ReadEeprom, address, &[]))?;
        self.accumulate(EE_ROW_BYTES)
    }

    pub fn write_program_row(&mut self, address: u32, payload: &[u8]) -> Result<()> {
        self.send(&Self::addressed_frame(Opcode::WriteProgramMemory, address, payload))?;
        self.expect_ack(Opcode::WriteProgramMemory)
    }

    pub fn write_eeprom_row(&mut self, family: Family, address: u32, payload: &[u8]) -> Result<()> {
        if !family.has_eeprom() {
            return Err(Error::NoEeprom(family).into());
        }
        self.send(&Self::addressed_frame(Opcode::WriteEeprom, address, payload))?;
        self.expect_ack(Opcode::WriteEeprom)
    }

    /// Send configuration slot `index`. The first slot carries the
    /// WriteConfig opcode; the target acknowledges every slot.
    pub fn write_config_row(&mut self, index: usize, slot: [u8; CONFIG_SLOT_LEN]) -> Result<()> {
        if index == 0 {
            let mut frame = [0u8; 1 + CONFIG_SLOT_LEN];
            frame[0] = Opcode::WriteConfig as u8;
            frame[1..].copy_from_slice(&slot);
            self.send(&frame)?;
        } else {
            self.send(&slot)?;
        }
        self.expect_ack(Opcode::WriteConfig)
    }

    /// Commit staged configuration and restart the target. No reply.
    pub fn reset(&mut self) -> Result<()> {
        self.send(&[Opcode::Reset as u8])
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Catalog of supported targets, keyed by the (device id, process id) pair
//! the bootloader reports in reply to ReadId.

use crate::error::{Error, Result};
use crate::protocol::Family;

/// Static catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: &'static str,
    pub device_id: u16,
    pub process_id: u8,
    pub family: Family,
}

const fn dev(name: &'static str, device_id: u16, process_id: u8, family: Family) -> DeviceDescriptor {
    DeviceDescriptor {
        name,
        device_id,
        process_id,
        family,
    }
}

use Family::{DsPic30F, DsPic33F, Pic24F, Pic24H};

/// Supported devices, in lookup order.
pub static DEVICES: &[DeviceDescriptor] = &[
    dev("dsPIC30F2010", 0x040, 1, DsPic30F),
    dev("dsPIC30F2011", 0x0C0, 1, DsPic30F),
    dev("dsPIC30F2011", 0x240, 1, DsPic30F),
    dev("dsPIC30F2012", 0x0C2, 1, DsPic30F),
    dev("dsPIC30F2012", 0x241, 1, DsPic30F),
    dev("dsPIC30F3010", 0x1C0, 1, DsPic30F),
    dev("dsPIC30F3011", 0x1C1, 1, DsPic30F),
    dev("dsPIC30F3012", 0x0C1, 1, DsPic30F),
    dev("dsPIC30F3013", 0x0C3, 1, DsPic30F),
    dev("dsPIC30F3014", 0x160, 1, DsPic30F),
    dev("dsPIC30F4011", 0x101, 1, DsPic30F),
    dev("dsPIC30F4012", 0x100, 1, DsPic30F),
    dev("dsPIC30F4013", 0x141, 1, DsPic30F),
    dev("dsPIC30F5011", 0x080, 1, DsPic30F),
    dev("dsPIC30F5013", 0x081, 1, DsPic30F),
    dev("dsPIC30F5015", 0x200, 1, DsPic30F),
    dev("dsPIC30F5016", 0x201, 1, DsPic30F),
    dev("dsPIC30F6010", 0x188, 1, DsPic30F),
    dev("dsPIC30F6010A", 0x281, 1, DsPic30F),
    dev("dsPIC30F6011", 0x192, 1, DsPic30F),
    dev("dsPIC30F6011A", 0x2C0, 1, DsPic30F),
    dev("dsPIC30F6012", 0x193, 1, DsPic30F),
    dev("dsPIC30F6012A", 0x2C2, 1, DsPic30F),
    dev("dsPIC30F6013", 0x197, 1, DsPic30F),
    dev("dsPIC30F6013A", 0x2C1, 1, DsPic30F),
    dev("dsPIC30F6014", 0x198, 1, DsPic30F),
    dev("dsPIC30F6014A", 0x2C3, 1, DsPic30F),
    dev("dsPIC30F6015", 0x280, 1, DsPic30F),
    // dsPIC33FJ GP/MC 64-100 pin
    dev("dsPIC33FJ64GP206", 0xC1, 3, DsPic33F),
    dev("dsPIC33FJ64GP306", 0xCD, 3, DsPic33F),
    dev("dsPIC33FJ64GP310", 0xCF, 3, DsPic33F),
    dev("dsPIC33FJ64GP706", 0xD5, 3, DsPic33F),
    dev("dsPIC33FJ64GP708", 0xD6, 3, DsPic33F),
    dev("dsPIC33FJ64GP710", 0xD7, 3, DsPic33F),
    dev("dsPIC33FJ128GP206", 0xD9, 3, DsPic33F),
    dev("dsPIC33FJ128GP306", 0xE5, 3, DsPic33F),
    dev("dsPIC33FJ128GP310", 0xE7, 3, DsPic33F),
    dev("dsPIC33FJ128GP706", 0xED, 3, DsPic33F),
    dev("dsPIC33FJ128GP708", 0xEE, 3, DsPic33F),
    dev("dsPIC33FJ128GP710", 0xEF, 3, DsPic33F),
    dev("dsPIC33FJ256GP506", 0xF5, 3, DsPic33F),
    dev("dsPIC33FJ256GP510", 0xF7, 3, DsPic33F),
    dev("dsPIC33FJ256GP710", 0xFF, 3, DsPic33F),
    dev("dsPIC33FJ64MC506", 0x89, 3, DsPic33F),
    dev("dsPIC33FJ64MC508", 0x8A, 3, DsPic33F),
    dev("dsPIC33FJ64MC510", 0x8B, 3, DsPic33F),
    dev("dsPIC33FJ64MC706", 0x91, 3, DsPic33F),
    dev("dsPIC33FJ64MC710", 0x97, 3, DsPic33F),
    dev("dsPIC33FJ128MC506", 0xA1, 3, DsPic33F),
    dev("dsPIC33FJ128MC510", 0xA3, 3, DsPic33F),
    dev("dsPIC33FJ128MC706", 0xA9, 3, DsPic33F),
    dev("dsPIC33FJ128MC708", 0xAE, 3, DsPic33F),
    dev("dsPIC33FJ128MC710", 0xAF, 3, DsPic33F),
    dev("dsPIC33FJ256MC510", 0xB7, 3, DsPic33F),
    dev("dsPIC33FJ256MC710", 0xBF, 3, DsPic33F),
    // dsPIC33FJ 18-28 pin
    dev("dsPIC33FJ12GP201", 0x802, 3, DsPic33F),
    dev("dsPIC33FJ12GP202", 0x803, 3, DsPic33F),
    dev("dsPIC33FJ12MC201", 0x800, 3, DsPic33F),
    dev("dsPIC33FJ12MC202", 0x801, 3, DsPic33F),
    dev("dsPIC33FJ32GP204", 0xF0F, 3, DsPic33F),
    dev("dsPIC33FJ32GP202", 0xF0D, 3, DsPic33F),
    dev("dsPIC33FJ16GP304", 0xF07, 3, DsPic33F),
    dev("dsPIC33FJ32MC204", 0xF0B, 3, DsPic33F),
    dev("dsPIC33FJ32MC202", 0xF09, 3, DsPic33F),
    dev("dsPIC33FJ16MC304", 0xF03, 3, DsPic33F),
    dev("dsPIC33FJ128GP804", 0x62F, 3, DsPic33F),
    dev("dsPIC33FJ128GP802", 0x62D, 3, DsPic33F),
    dev("dsPIC33FJ128GP204", 0x627, 3, DsPic33F),
    dev("dsPIC33FJ128GP202", 0x625, 3, DsPic33F),
    dev("dsPIC33FJ64GP804", 0x61F, 3, DsPic33F),
    dev("dsPIC33FJ64GP802", 0x61D, 3, DsPic33F),
    dev("dsPIC33FJ64GP204", 0x617, 3, DsPic33F),
    dev("dsPIC33FJ64GP202", 0x615, 3, DsPic33F),
    dev("dsPIC33FJ32GP304", 0x607, 3, DsPic33F),
    dev("dsPIC33FJ32GP302", 0x605, 3, DsPic33F),
    dev("dsPIC33FJ128MC804", 0x62B, 3, DsPic33F),
    dev("dsPIC33FJ128MC802", 0x629, 3, DsPic33F),
    dev("dsPIC33FJ128MC204", 0x623, 3, DsPic33F),
    dev("dsPIC33FJ128MC202", 0x621, 3, DsPic33F),
    dev("dsPIC33FJ64MC804", 0x61B, 3, DsPic33F),
    dev("dsPIC33FJ64MC802", 0x619, 3, DsPic33F),
    dev("dsPIC33FJ64MC204", 0x613, 3, DsPic33F),
    dev("dsPIC33FJ64MC202", 0x611, 3, DsPic33F),
    dev("dsPIC33FJ32MC304", 0x603, 3, DsPic33F),
    dev("dsPIC33FJ32MC302", 0x601, 3, DsPic33F),
    // dsPIC33FJ GS (SMPS)
    dev("dsPIC33FJ06GS101", 0xC00, 3, DsPic33F),
    dev("dsPIC33FJ06GS102", 0xC01, 3, DsPic33F),
    dev("dsPIC33FJ06GS202", 0xC02, 3, DsPic33F),
    dev("dsPIC33FJ16GS402", 0xC04, 3, DsPic33F),
    dev("dsPIC33FJ16GS404", 0xC06, 3, DsPic33F),
    dev("dsPIC33FJ16GS502", 0xC03, 3, DsPic33F),
    dev("dsPIC33FJ16GS504", 0xC05, 3, DsPic33F),
    // PIC24HJ
    dev("PIC24HJ64GP206", 0x41, 3, Pic24H),
    dev("PIC24HJ64GP210", 0x47, 3, Pic24H),
    dev("PIC24HJ64GP506", 0x49, 3, Pic24H),
    dev("PIC24HJ64GP510", 0x4B, 3, Pic24H),
    dev("PIC24HJ128GP206", 0x5D, 3, Pic24H),
    dev("PIC24HJ128GP210", 0x5F, 3, Pic24H),
    dev("PIC24HJ128GP306", 0x65, 3, Pic24H),
    dev("PIC24HJ128GP310", 0x67, 3, Pic24H),
    dev("PIC24HJ128GP506", 0x61, 3, Pic24H),
    dev("PIC24HJ128GP510", 0x63, 3, Pic24H),
    dev("PIC24HJ256GP206", 0x71, 3, Pic24H),
    dev("PIC24HJ256GP210", 0x73, 3, Pic24H),
    dev("PIC24HJ256GP610", 0x7B, 3, Pic24H),
    dev("PIC24HJ12GP201", 0x80A, 3, Pic24H),
    dev("PIC24HJ12GP202", 0x80B, 3, Pic24H),
    dev("PIC24HJ32GP204", 0xF1F, 3, Pic24H),
    dev("PIC24HJ32GP202", 0xF1D, 3, Pic24H),
    dev("PIC24HJ16GP304", 0xF17, 3, Pic24H),
    dev("PIC24HJ128GP504", 0x67F, 3, Pic24H),
    dev("PIC24HJ128GP502", 0x67D, 3, Pic24H),
    dev("PIC24HJ128GP204", 0x667, 3, Pic24H),
    dev("PIC24HJ128GP202", 0x665, 3, Pic24H),
    dev("PIC24HJ64GP504", 0x677, 3, Pic24H),
    dev("PIC24HJ64GP502", 0x675, 3, Pic24H),
    dev("PIC24HJ64GP204", 0x657, 3, Pic24H),
    dev("PIC24HJ64GP202", 0x655, 3, Pic24H),
    dev("PIC24HJ32GP304", 0x647, 3, Pic24H),
    dev("PIC24HJ32GP302", 0x645, 3, Pic24H),
    // PIC24FJ
    dev("PIC24FJ64GA006", 0x405, 3, Pic24F),
    dev("PIC24FJ64GA008", 0x408, 3, Pic24F),
    dev("PIC24FJ64GA010", 0x40B, 3, Pic24F),
    dev("PIC24FJ96GA006", 0x406, 3, Pic24F),
    dev("PIC24FJ96GA008", 0x409, 3, Pic24F),
    dev("PIC24FJ96GA010", 0x40C, 3, Pic24F),
    dev("PIC24FJ128GA006", 0x407, 3, Pic24F),
    dev("PIC24FJ128GA008", 0x40A, 3, Pic24F),
    dev("PIC24FJ128GA010", 0x40D, 3, Pic24F),
];

/// Find the first catalog entry matching both fields.
pub fn lookup(device_id: u16, process_id: u8) -> Result<&'static DeviceDescriptor> {
    DEVICES
        .iter()
        .find(|d| d.device_id == device_id && d.process_id == process_id)
        .ok_or(Error::DeviceNotFound {
            device_id,
            process_id,
        })
}

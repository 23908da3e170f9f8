#![no_std]
#![doc = include_str!("../README.md")]

#[cfg(test)]
extern crate std;

mod address;
mod bus;
mod command;
mod driver;
mod line;
mod result;
mod search;

pub use address::{Address, AddressError};
pub use bus::Bus;
pub use command::Command;
pub use driver::Driver;
pub use line::{Inverted, Line};
pub use result::Error;
pub use search::{RomSearch, RomSearchIter};

/// Dallas/Maxim CRC-8, polynomial 0x8C, processed least significant bit first.
/// Resumable: feed the previous result back in as `crc` to continue a run.
pub fn compute_partial_crc8(crc: u8, data: &[u8]) -> u8 {
    let mut crc = crc;
    for byte in data.iter() {
        let mut byte = *byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0x00 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// CRC-8 of a whole buffer.
///
/// ```
/// assert_eq!(w1_bus::crc8(b"123456789"), 0xA1);
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    compute_partial_crc8(0, data)
}

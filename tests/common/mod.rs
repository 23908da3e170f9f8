#![allow(dead_code)]

use core::convert::Infallible;
use w1_bus::{Address, Bus, Error};

/// Builds a well formed identifier from a family code and serial.
pub fn identifier(family: u8, serial: [u8; 6]) -> Address {
    let mut raw = [0u8; 8];
    raw[0] = family;
    raw[1..7].copy_from_slice(&serial);
    raw[7] = w1_bus::crc8(&raw[..7]);
    Address::from(raw)
}

/// Discovery order key: identifier bits compared in transmission order,
/// first transmitted bit most significant.
pub fn traversal_key(address: Address) -> u64 {
    address.to_u64().reverse_bits()
}

#[derive(Clone, Copy)]
struct Device {
    rom: u64,
    alarmed: bool,
    active: bool,
}

#[derive(Clone, Copy)]
enum Phase {
    Idle,
    Command { collected: u8, value: u8 },
    Search { bit: u8, reads: u8 },
    Match { bit: u8 },
    Emit { bit: u8 },
}

/// Wired-AND model of a bus with any number of emulated devices.
///
/// Devices pull the line low to send a 0, so a read slot returns high
/// only when every participating device sends a 1. During a search pass
/// each device answers the two read slots with its identifier bit and
/// the complement, then drops out when the written direction bit differs
/// from its own.
pub struct SimBus {
    devices: Vec<Device>,
    phase: Phase,
    selected: Vec<u64>,
    muted: bool,
}

impl SimBus {
    pub fn new(roms: &[Address]) -> Self {
        SimBus {
            devices: roms
                .iter()
                .map(|a| Device {
                    rom: a.to_u64(),
                    alarmed: false,
                    active: false,
                })
                .collect(),
            phase: Phase::Idle,
            selected: Vec::new(),
            muted: false,
        }
    }

    pub fn attach(&mut self, address: Address) {
        self.devices.push(Device {
            rom: address.to_u64(),
            alarmed: false,
            active: false,
        });
    }

    pub fn detach(&mut self, address: Address) {
        let rom = address.to_u64();
        self.devices.retain(|d| d.rom != rom);
    }

    pub fn set_alarm(&mut self, address: Address) {
        let rom = address.to_u64();
        for device in &mut self.devices {
            if device.rom == rom {
                device.alarmed = true;
            }
        }
    }

    /// Devices keep answering the presence pulse but stay silent afterwards.
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Identifiers addressed by the last MATCH or SKIP ROM.
    pub fn selected(&self) -> Vec<Address> {
        self.selected
            .iter()
            .map(|rom| Address::from_u64(*rom))
            .collect()
    }

    fn rom_bit(rom: u64, bit: u8) -> bool {
        rom >> bit & 1 == 1
    }

    /// Line level under wired AND: high unless a participant pulls low.
    fn line<F: Fn(u64) -> bool>(&self, sends_one: F) -> bool {
        self.devices
            .iter()
            .filter(|d| d.active)
            .all(|d| sends_one(d.rom))
    }

    fn dispatch(&mut self, command: u8) -> Phase {
        match command {
            // SEARCH ROM and the alarm variant
            0xF0 | 0xEC => {
                for device in &mut self.devices {
                    device.active = !self.muted && (command == 0xF0 || device.alarmed);
                }
                Phase::Search { bit: 0, reads: 0 }
            }
            // MATCH ROM
            0x55 => {
                for device in &mut self.devices {
                    device.active = !self.muted;
                }
                Phase::Match { bit: 0 }
            }
            // SKIP ROM
            0xCC => {
                self.selected = self.devices.iter().map(|d| d.rom).collect();
                Phase::Idle
            }
            // READ ROM
            0x33 => {
                for device in &mut self.devices {
                    device.active = !self.muted;
                }
                Phase::Emit { bit: 0 }
            }
            _ => Phase::Idle,
        }
    }
}

impl Bus for SimBus {
    type Error = Infallible;

    fn reset(&mut self) -> Result<bool, Error<Infallible>> {
        self.phase = Phase::Command {
            collected: 0,
            value: 0,
        };
        for device in &mut self.devices {
            device.active = false;
        }
        Ok(!self.devices.is_empty())
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Error<Infallible>> {
        match self.phase {
            Phase::Command { collected, value } => {
                let value = value | (u8::from(bit) << collected);
                self.phase = if collected == 7 {
                    self.dispatch(value)
                } else {
                    Phase::Command {
                        collected: collected + 1,
                        value,
                    }
                };
            }
            Phase::Search { bit: index, reads } => {
                assert_eq!(reads, 2, "direction written before both read slots");
                for device in self.devices.iter_mut().filter(|d| d.active) {
                    if Self::rom_bit(device.rom, index) != bit {
                        device.active = false;
                    }
                }
                self.phase = if index == 63 {
                    Phase::Idle
                } else {
                    Phase::Search {
                        bit: index + 1,
                        reads: 0,
                    }
                };
            }
            Phase::Match { bit: index } => {
                for device in self.devices.iter_mut().filter(|d| d.active) {
                    if Self::rom_bit(device.rom, index) != bit {
                        device.active = false;
                    }
                }
                self.phase = if index == 63 {
                    self.selected = self
                        .devices
                        .iter()
                        .filter(|d| d.active)
                        .map(|d| d.rom)
                        .collect();
                    Phase::Idle
                } else {
                    Phase::Match { bit: index + 1 }
                };
            }
            _ => panic!("write slot outside of a command"),
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Error<Infallible>> {
        let level = match self.phase {
            Phase::Search { bit, reads } => {
                assert!(reads < 2, "more than two read slots per search step");
                let level = if reads == 0 {
                    self.line(|rom| Self::rom_bit(rom, bit))
                } else {
                    self.line(|rom| !Self::rom_bit(rom, bit))
                };
                self.phase = Phase::Search {
                    bit,
                    reads: reads + 1,
                };
                level
            }
            Phase::Emit { bit } => {
                let level = self.line(|rom| Self::rom_bit(rom, bit));
                self.phase = if bit == 63 {
                    Phase::Idle
                } else {
                    Phase::Emit { bit: bit + 1 }
                };
                level
            }
            _ => panic!("read slot outside of a command"),
        };
        Ok(level)
    }
}

use crate::{crc8, Address, Command, Error};
use core::fmt::Debug;

/// Bit level access to a single data line shared by all devices.
///
/// Implementors provide the reset and the two bit slot primitives; byte
/// transfer and the ROM addressing commands are derived from them. All
/// transfers are least significant bit first, eight bits per byte.
pub trait Bus {
    type Error: Debug;

    /// Resets the bus and returns whether any device answered
    /// with a presence pulse.
    fn reset(&mut self) -> Result<bool, Error<Self::Error>>;

    /// Emits a single write slot.
    fn write_bit(&mut self, bit: bool) -> Result<(), Error<Self::Error>>;

    /// Emits a single read slot and samples the line.
    fn read_bit(&mut self) -> Result<bool, Error<Self::Error>>;

    fn write_byte(&mut self, byte: u8) -> Result<(), Error<Self::Error>> {
        let mut byte = byte;
        for _ in 0..8 {
            self.write_bit((byte & 0x01) == 0x01)?;
            byte >>= 1;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, Error<Self::Error>> {
        let mut byte = 0_u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit()? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>> {
        for b in bytes {
            self.write_byte(*b)?;
        }
        Ok(())
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<(), Error<Self::Error>> {
        for d in dst {
            *d = self.read_byte()?;
        }
        Ok(())
    }

    /// Resets the bus and addresses one device by its identifier.
    /// The next command is accepted by that device only.
    fn select(&mut self, address: &Address) -> Result<(), Error<Self::Error>> {
        if !self.reset()? {
            return Err(Error::NoPresence);
        }
        self.write_byte(Command::MatchRom.op_code())?;
        self.write_bytes(address.as_ref())
    }

    /// Resets the bus and addresses all devices at once.
    fn skip(&mut self) -> Result<(), Error<Self::Error>> {
        if !self.reset()? {
            return Err(Error::NoPresence);
        }
        self.write_byte(Command::SkipRom.op_code())
    }

    /// Reads the identifier of the only device on the bus and checks
    /// its checksum. With more than one device present the responses
    /// collide and the checksum rejects the garbled identifier.
    fn read_rom(&mut self) -> Result<Address, Error<Self::Error>> {
        if !self.reset()? {
            return Err(Error::NoPresence);
        }
        self.write_byte(Command::ReadRom.op_code())?;
        let mut address = Address::default();
        self.read_bytes(address.as_mut())?;
        let computed = crc8(&address[..7]);
        if computed != address[7] {
            return Err(Error::CrcMismatch(computed, address[7]));
        }
        Ok(address)
    }
}

use crate::{Bus, Error, Line};
use embedded_hal::delay::DelayNs;
use log::warn;

/// Bit banged bus master over a single data line.
///
/// Slot timings are in the microsecond range and must not be stretched:
/// keep interrupts away from the line while a transaction is in flight.
pub struct Driver<L: Line, D: DelayNs> {
    line: L,
    delay: D,
}

impl<L: Line, D: DelayNs> Driver<L, D> {
    pub fn new(line: L, delay: D) -> Self {
        Driver { line, delay }
    }

    /// Gives the line and the delay source back.
    pub fn release(self) -> (L, D) {
        (self.line, self.delay)
    }

    fn ensure_line_high(&mut self) -> Result<(), Error<L::Error>> {
        for _ in 0..125 {
            if self.line.is_high()? {
                return Ok(());
            }
            self.delay.delay_us(2);
        }
        warn!("data line stuck low");
        Err(Error::WireFault)
    }
}

impl<L: Line, D: DelayNs> Bus for Driver<L, D> {
    type Error = L::Error;

    /// Emits a reset pulse and listens for a presence pulse.
    /// Returns Err(WireFault) if the line never rises before the reset,
    /// Ok(true) if a presence pulse has been received and Ok(false) if
    /// the line is idle but nobody answered.
    fn reset(&mut self) -> Result<bool, Error<L::Error>> {
        self.line.set_high()?;
        self.ensure_line_high()?;
        self.line.set_low()?;
        self.delay.delay_us(480);
        self.line.set_high()?;

        let mut presence = false;
        for _ in 0..7 {
            self.delay.delay_us(10);
            presence |= self.line.is_low()?;
        }
        self.delay.delay_us(410);
        Ok(presence)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Error<L::Error>> {
        self.line.set_low()?;
        self.delay.delay_us(if bit { 10 } else { 65 });
        self.line.set_high()?;
        self.delay.delay_us(if bit { 55 } else { 5 });
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Error<L::Error>> {
        self.line.set_low()?;
        self.delay.delay_us(3);
        self.line.set_high()?;
        self.delay.delay_us(2);
        let bit = self.line.is_high()?;
        self.delay.delay_us(61);
        Ok(bit)
    }
}

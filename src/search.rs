use crate::{Address, Bus, Command, Error};
use log::{debug, trace};

/// State of a bus enumeration in progress.
///
/// Device identifiers form a binary tree walked depth first, one pass per
/// device. Between passes only the identifier found last and the deepest
/// fork where a set bit is still unexplored need to be kept.
#[derive(Clone, Debug, Default)]
pub struct RomSearch {
    rom: Address,
    /// 1-based bit position of the deepest unexplored fork, 0 when none
    last_discrepancy: u8,
    /// Same, limited to the family code bits
    last_family_discrepancy: u8,
    last_device: bool,
}

impl RomSearch {
    pub fn new() -> RomSearch {
        RomSearch::default()
    }

    /// Search pre-seeded to start at the first device of one family.
    pub fn for_family(family_code: u8) -> RomSearch {
        let mut search = RomSearch::new();
        search.target(family_code);
        search
    }

    /// Forgets all traversal state; the next pass starts from scratch.
    pub fn reset(&mut self) {
        self.last_discrepancy = 0;
        self.last_family_discrepancy = 0;
        self.last_device = false;
    }

    /// Aims the next pass at the first device whose family code equals
    /// `family_code`. When no such device exists the walk continues with
    /// whatever follows in identifier order, so callers keep checking
    /// [`Address::family_code`] on the results.
    pub fn target(&mut self, family_code: u8) {
        self.rom = Address::from([family_code, 0, 0, 0, 0, 0, 0, 0]);
        self.last_discrepancy = Address::BITS;
        self.last_family_discrepancy = 0;
        self.last_device = false;
    }

    /// Drops the remaining devices of the family currently being walked.
    pub fn skip_family(&mut self) {
        self.last_discrepancy = self.last_family_discrepancy;
        self.last_family_discrepancy = 0;
        if self.last_discrepancy == 0 {
            self.last_device = true;
        }
    }

    /// Identifier produced by the most recent successful pass.
    pub fn address(&self) -> Address {
        self.rom
    }

    /// True once the walk has delivered the final device. Cleared by
    /// [`reset`](Self::reset), [`target`](Self::target) or a fresh
    /// [`first`](Self::first).
    pub fn exhausted(&self) -> bool {
        self.last_device
    }

    /// Restarts the enumeration and returns the first device on the bus.
    pub fn first<B: Bus>(&mut self, bus: &mut B) -> Result<Option<Address>, Error<B::Error>> {
        self.reset();
        self.search(bus, Command::SearchRom)
    }

    /// Returns the next device on the bus, continuing the previous pass.
    pub fn next<B: Bus>(&mut self, bus: &mut B) -> Result<Option<Address>, Error<B::Error>> {
        self.search(bus, Command::SearchRom)
    }

    /// Like [`next`](Self::next), but only devices in an alarm state answer.
    pub fn next_alarmed<B: Bus>(
        &mut self,
        bus: &mut B,
    ) -> Result<Option<Address>, Error<B::Error>> {
        self.search(bus, Command::SearchRomAlarmed)
    }

    /// Checks whether the device with the identifier currently stored in
    /// this session is present on the bus. All traversal state is saved
    /// and restored around the probe, so an enumeration can continue
    /// afterwards as if nothing happened.
    pub fn verify<B: Bus>(&mut self, bus: &mut B) -> Result<bool, Error<B::Error>> {
        let saved = self.clone();

        // anchor the pass so every fork replays the stored identifier bit
        self.last_discrepancy = Address::BITS;
        self.last_device = false;

        let outcome = self.search(bus, Command::SearchRom);
        let found = match outcome {
            Ok(found) => found,
            Err(error) => {
                *self = saved;
                return Err(error);
            }
        };

        let matched = found == Some(saved.rom);
        *self = saved;
        Ok(matched)
    }

    /// One search pass: resets the bus, transmits `command` and walks all
    /// 64 identifier bits. Each bit is resolved from the wired-AND of the
    /// participating devices sending the bit and its complement; at a
    /// genuine fork the stored state decides which branch to take and the
    /// written direction bit silences the devices on the other one.
    ///
    /// Nothing found (no presence, nobody answering, walk finished) is
    /// `Ok(None)`; only line faults surface as errors.
    pub fn search<B: Bus>(
        &mut self,
        bus: &mut B,
        command: Command,
    ) -> Result<Option<Address>, Error<B::Error>> {
        if self.last_device {
            trace!("search: already exhausted");
            return Ok(None);
        }

        if !bus.reset()? {
            self.reset();
            debug!("search: no presence pulse");
            return Ok(None);
        }

        bus.write_byte(command.op_code())?;

        // deepest position where this pass took a 0 while devices with a 1
        // were also present
        let mut last_zero = 0;
        let mut complete = true;

        for position in 1..=Address::BITS {
            let id_bit = bus.read_bit()?;
            let cmp_bit = bus.read_bit()?;

            // both high: nothing is driving the line on this branch
            if id_bit && cmp_bit {
                debug!("search: no answer at bit {}", position);
                complete = false;
                break;
            }

            let direction = if id_bit != cmp_bit {
                // all remaining devices agree here
                id_bit
            } else {
                let chosen = if position < self.last_discrepancy {
                    // replay the previous path up to the fork
                    self.rom.bit(position - 1)
                } else {
                    // flip to 1 at the fork itself, explore 0 below it
                    position == self.last_discrepancy
                };
                if !chosen {
                    last_zero = position;
                    if position <= Address::FAMILY_BITS {
                        self.last_family_discrepancy = position;
                    }
                }
                chosen
            };

            self.rom.set_bit(position - 1, direction);
            bus.write_bit(direction)?;
        }

        let mut found = false;
        if complete {
            self.last_discrepancy = last_zero;
            if last_zero == 0 {
                self.last_device = true;
            }
            found = true;
        }

        if !found || self.rom.family_code() == 0 {
            self.reset();
            return Ok(None);
        }

        trace!("search: found {}", self.rom);
        Ok(Some(self.rom))
    }

    pub fn into_iter<B: Bus>(self, bus: &mut B) -> RomSearchIter<'_, B> {
        RomSearchIter {
            search: Some(self),
            bus,
        }
    }
}

/// Iterator over the devices on a bus. Ends after the pass that yields
/// nothing; errors are handed through and iteration may continue.
pub struct RomSearchIter<'a, B: Bus> {
    search: Option<RomSearch>,
    bus: &'a mut B,
}

impl<'a, B: Bus> Iterator for RomSearchIter<'a, B> {
    type Item = Result<Address, Error<B::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut search = self.search.take()?;
        let result = search.next(&mut *self.bus).transpose()?;
        self.search = Some(search);
        Some(result)
    }
}

/// ROM commands understood by every device regardless of family
#[derive(Clone, Copy, Debug)]
#[repr(u8)]
pub enum Command {
    ReadRom = 0x33,
    MatchRom = 0x55,
    SkipRom = 0xCC,
    SearchRom = 0xF0,
    SearchRomAlarmed = 0xEC,
}

impl Command {
    pub fn op_code(self) -> u8 {
        self as _
    }
}

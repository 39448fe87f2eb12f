//! Register map

/// Set on the command byte to address a register for writing.
pub const WRITE_FLAG: u8 = 0x80;

/// Number of register bytes, configuration through status.
pub const REGISTER_COUNT: usize = Register::Status.addr() as usize + Register::Status.width();

/// MAX31865 registers. Two-byte registers are addressed by their MSB.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Configuration = 0x00,
    Resistance = 0x01,
    HighFaultThreshold = 0x03,
    LowFaultThreshold = 0x05,
    Status = 0x07,
}

impl Register {
    /// Register address
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Command byte for reading this register
    pub fn read_command(self) -> u8 {
        self.addr()
    }

    /// Command byte for writing this register
    pub fn write_command(self) -> u8 {
        self.addr() | WRITE_FLAG
    }

    /// Width of the register in bytes
    pub const fn width(self) -> usize {
        match self {
            Register::Configuration | Register::Status => 1,
            Register::Resistance | Register::HighFaultThreshold | Register::LowFaultThreshold => 2,
        }
    }
}

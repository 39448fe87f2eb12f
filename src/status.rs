//! Fault status register
//!
//! Fault bits are independent flags, several can be set at once.

/// Fault status bits
pub struct FaultBits;

impl FaultBits {
    /// RTD ratio above the high fault threshold
    pub const RTD_HIGH_THRESHOLD: u8 = 0x80;
    /// RTD ratio below the low fault threshold
    pub const RTD_LOW_THRESHOLD: u8 = 0x40;
    /// REFIN- > 0.85 x VBIAS
    pub const REFIN_HIGH: u8 = 0x20;
    /// REFIN- < 0.85 x VBIAS, FORCE- open
    pub const REFIN_LOW_OPEN: u8 = 0x10;
    /// RTDIN- < 0.85 x VBIAS, FORCE- open
    pub const RTDIN_LOW_OPEN: u8 = 0x08;
    /// Overvoltage or undervoltage
    pub const VOLTAGE_OUT_OF_RANGE: u8 = 0x04;
}

/// Decoded contents of the status register
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus(u8);

impl FaultStatus {
    /// Raw status byte
    pub fn bits(self) -> u8 {
        self.0
    }
    /// No bit set
    pub fn is_ok(self) -> bool {
        self.0 == 0
    }
    pub fn rtd_high_threshold(self) -> bool {
        self.0 & FaultBits::RTD_HIGH_THRESHOLD != 0
    }
    pub fn rtd_low_threshold(self) -> bool {
        self.0 & FaultBits::RTD_LOW_THRESHOLD != 0
    }
    pub fn refin_high(self) -> bool {
        self.0 & FaultBits::REFIN_HIGH != 0
    }
    pub fn refin_low_open(self) -> bool {
        self.0 & FaultBits::REFIN_LOW_OPEN != 0
    }
    pub fn rtdin_low_open(self) -> bool {
        self.0 & FaultBits::RTDIN_LOW_OPEN != 0
    }
    pub fn voltage_out_of_range(self) -> bool {
        self.0 & FaultBits::VOLTAGE_OUT_OF_RANGE != 0
    }
}

impl From<u8> for FaultStatus {
    fn from(value: u8) -> Self {
        FaultStatus(value)
    }
}

impl From<FaultStatus> for u8 {
    fn from(status: FaultStatus) -> Self {
        status.0
    }
}

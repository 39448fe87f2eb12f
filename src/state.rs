//! Driver state shared by the blocking and async drivers

use crate::configuration::{config_byte, RtdType, Wires};
use crate::conversion;
use crate::register::REGISTER_COUNT;
use crate::status::FaultStatus;

/// High fault threshold register value after power-up
pub const DEFAULT_HIGH_THRESHOLD: u16 = 0xFFFF;
/// Low fault threshold register value after power-up
pub const DEFAULT_LOW_THRESHOLD: u16 = 0x0000;

/// Configuration and last sample of one RTD channel.
///
/// The threshold fields mirror what was last written to the chip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverState {
    pub(crate) wires: Wires,
    pub(crate) rtd_type: RtdType,
    pub(crate) raw_resistance: u16,
    pub(crate) status: u8,
    pub(crate) high_threshold: u16,
    pub(crate) low_threshold: u16,
}

impl DriverState {
    pub fn new(wires: Wires, rtd_type: RtdType) -> Self {
        DriverState {
            wires,
            rtd_type,
            raw_resistance: 0,
            status: 0,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,
        }
    }

    pub fn wires(&self) -> Wires {
        self.wires
    }

    pub fn rtd_type(&self) -> RtdType {
        self.rtd_type
    }

    /// 15-bit ratio of the last sample
    pub fn raw_resistance(&self) -> u16 {
        self.raw_resistance
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    /// Mirrored high fault threshold register value
    pub fn high_threshold(&self) -> u16 {
        self.high_threshold
    }

    /// Mirrored low fault threshold register value
    pub fn low_threshold(&self) -> u16 {
        self.low_threshold
    }

    pub fn config_byte(&self) -> u8 {
        config_byte(self.wires)
    }

    /// Commits a resistance word and status byte read from the chip.
    /// Returns `true` when the configuration has to be rewritten.
    ///
    /// A zero ratio is treated as a desynchronised conversion rather than a
    /// measurement; the chip does not flag it as a fault.
    pub fn record_sample(&mut self, resistance_word: u16, status: u8) -> bool {
        self.raw_resistance = conversion::ratio_from_word(resistance_word);
        self.status = status;
        self.raw_resistance == 0 || self.status != 0
    }

    pub fn resistance(&self) -> f32 {
        conversion::resistance(self.raw_resistance, self.rtd_type.scale())
    }

    pub fn temperature(&self) -> f32 {
        conversion::temperature(self.raw_resistance)
    }

    pub fn fault_status(&self) -> FaultStatus {
        self.status.into()
    }
}

/// Contents of the whole register file, read in a single session.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterSnapshot {
    pub configuration: u8,
    /// 15-bit ratio, fault bit removed
    pub raw_resistance: u16,
    pub high_threshold: u16,
    pub low_threshold: u16,
    pub status: FaultStatus,
}

impl From<[u8; REGISTER_COUNT]> for RegisterSnapshot {
    fn from(bytes: [u8; REGISTER_COUNT]) -> Self {
        RegisterSnapshot {
            configuration: bytes[0],
            raw_resistance: conversion::ratio_from_word(u16::from_be_bytes([bytes[1], bytes[2]])),
            high_threshold: u16::from_be_bytes([bytes[3], bytes[4]]),
            low_threshold: u16::from_be_bytes([bytes[5], bytes[6]]),
            status: bytes[7].into(),
        }
    }
}

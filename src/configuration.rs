//! Configuration register and sensor settings

/// Configuration register bits
pub struct ConfigBits;

impl ConfigBits {
    /// Bias voltage on
    pub const VBIAS: u8 = 0b1000_0000;
    /// Automatic conversion mode
    pub const AUTO_CONVERSION: u8 = 0b0100_0000;
    /// Single conversion on write
    pub const ONE_SHOT: u8 = 0b0010_0000;
    /// 3-wire RTD
    pub const THREE_WIRE: u8 = 0b0001_0000;
    /// Fault detection cycle control (bits 3-2)
    pub const FAULT_CYCLE: u8 = 0b0000_1100;
    /// Clear latched faults
    pub const FAULT_CLEAR: u8 = 0b0000_0010;
    /// 50 Hz filter when set, 60 Hz when clear
    pub const FILTER_50HZ: u8 = 0b0000_0001;
}

/// RTD wiring
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wires {
    TwoWire,
    #[default]
    ThreeWire,
    FourWire,
}

impl Wires {
    fn bits(self) -> u8 {
        match self {
            Wires::ThreeWire => ConfigBits::THREE_WIRE,
            Wires::TwoWire | Wires::FourWire => 0,
        }
    }
}

/// RTD type, expressed as the scale applied to the raw ratio to get ohms.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtdType {
    #[default]
    Pt100,
    Pt500,
    Pt1000,
    /// Any other reference resistor
    Custom(u16),
}

impl RtdType {
    /// Reference resistance scale
    pub fn scale(self) -> u16 {
        match self {
            RtdType::Pt100 => 400,
            RtdType::Pt500 => 2000,
            RtdType::Pt1000 => 4000,
            RtdType::Custom(scale) => scale,
        }
    }
}

/// Configuration byte for continuous conversion with bias on, no fault cycle,
/// latched faults cleared and the 60 Hz filter.
pub fn config_byte(wires: Wires) -> u8 {
    ConfigBits::VBIAS | ConfigBits::AUTO_CONVERSION | ConfigBits::FAULT_CLEAR | wires.bits()
}

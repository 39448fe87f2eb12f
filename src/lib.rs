//! A platform agnostic driver to interface with the MAX31865 RTD-to-digital converter.
//!
//! The chip runs in continuous conversion mode. [`Max31865::sample`] reads the
//! resistance ratio and the fault status; the conversions work on that sample.
//! Temperatures use a linear approximation, apply Callendar–Van Dusen
//! downstream if you need accuracy away from 0 °C.
//!
//! ```ignore
//! let interface = SpiInterface::init(spi_device);
//! let mut rtd = Max31865Init {
//!     wires: Wires::FourWire,
//!     rtd_type: RtdType::Pt100,
//! }
//! .begin(interface)?;
//! rtd.sample()?;
//! let ohms = rtd.resistance();
//! ```
//!
//! ### Datasheets
//! - [MAX31865](https://www.analog.com/media/en/technical-documentation/data-sheets/max31865.pdf)
#![cfg_attr(feature = "async", allow(async_fn_in_trait))]
#![cfg_attr(not(test), no_std)]
#[cfg(feature = "async")]
pub mod asynch;
pub mod configuration;
pub mod conversion;
pub mod interface;
pub mod register;
pub mod state;
pub mod status;

pub use configuration::{RtdType, Wires};
pub use register::Register;
pub use state::{DriverState, RegisterSnapshot};
pub use status::FaultStatus;

use crate::interface::Interface;
use crate::register::REGISTER_COUNT;

/// MAX31865 init struct.
/// Use this struct to describe the RTD and init the MAX31865 with an interface of your choice.
#[derive(Debug, Default, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Max31865Init {
    pub wires: Wires,
    pub rtd_type: RtdType,
}

impl Max31865Init {
    /// Constructs a new MAX31865 driver instance without touching the bus.
    ///
    /// # Arguments
    /// * `interface` - `SpiInterface` or `SelectInterface`
    pub fn with_interface<T>(self, interface: T) -> Max31865<T>
    where
        T: Interface,
    {
        Max31865 {
            interface,
            state: DriverState::new(self.wires, self.rtd_type),
        }
    }

    /// Constructs a driver instance and runs [`Max31865::begin`].
    pub fn begin<T>(self, interface: T) -> Result<Max31865<T>, T::Error>
    where
        T: Interface,
    {
        let mut rtd = self.with_interface(interface);
        rtd.begin()?;
        Ok(rtd)
    }
}

/// MAX31865 RTD converter
pub struct Max31865<T>
where
    T: Interface,
{
    interface: T,
    state: DriverState,
}

impl<T> Max31865<T>
where
    T: Interface,
{
    /// Releases the select line and writes the configuration.
    pub fn begin(&mut self) -> Result<(), T::Error> {
        self.interface.deselect()?;
        self.write_config()
    }

    /// Writes the configuration register, clearing any latched fault, then
    /// rewrites both fault thresholds.
    pub fn write_config(&mut self) -> Result<(), T::Error> {
        let config = self.state.config_byte();
        log::debug!("max31865: config {:#04x}", config);
        self.write_byte(Register::Configuration, config)?;
        self.write_word(Register::HighFaultThreshold, self.state.high_threshold)?;
        self.write_word(Register::LowFaultThreshold, self.state.low_threshold)
    }

    /// Reads the resistance ratio and the fault status.
    ///
    /// The configuration is rewritten when the ratio is zero or any fault bit
    /// is set. Threshold faults clear themselves as soon as the ratio is back
    /// in range, so the latched status has to be cleared here.
    pub fn sample(&mut self) -> Result<FaultStatus, T::Error> {
        let word = self.read_word(Register::Resistance)?;
        let status = self.read_byte(Register::Status)?;

        if self.state.record_sample(word, status) {
            log::warn!(
                "max31865: ratio {} status {:#04x}, reconfiguring",
                self.state.raw_resistance,
                status
            );
            self.write_config()?;
        }
        Ok(self.state.fault_status())
    }

    /// Resistance of the last sample, in the units of the RTD type scale
    pub fn resistance(&self) -> f32 {
        self.state.resistance()
    }

    /// Temperature of the last sample in Celsius
    pub fn temperature(&self) -> f32 {
        self.state.temperature()
    }

    /// Raw status byte of the last sample
    pub fn status(&self) -> u8 {
        self.state.status
    }

    /// Status of the last sample
    pub fn fault_status(&self) -> FaultStatus {
        self.state.fault_status()
    }

    /// 15-bit resistance ratio of the last sample
    pub fn raw_resistance(&self) -> u16 {
        self.state.raw_resistance
    }

    /// Sets the high fault threshold. The value is not range checked, see
    /// [`conversion::threshold_checked`].
    pub fn set_high_fault_temperature(&mut self, celsius: f32) -> Result<(), T::Error> {
        let word = conversion::threshold(celsius);
        self.write_word(Register::HighFaultThreshold, word)?;
        self.state.high_threshold = word;
        Ok(())
    }

    /// Sets the low fault threshold. The value is not range checked, see
    /// [`conversion::threshold_checked`].
    pub fn set_low_fault_temperature(&mut self, celsius: f32) -> Result<(), T::Error> {
        let word = conversion::threshold(celsius);
        self.write_word(Register::LowFaultThreshold, word)?;
        self.state.low_threshold = word;
        Ok(())
    }

    /// High fault threshold register value
    pub fn high_fault_threshold(&self) -> u16 {
        self.state.high_threshold
    }

    /// Low fault threshold register value
    pub fn low_fault_threshold(&self) -> u16 {
        self.state.low_threshold
    }

    pub fn high_fault_temperature(&self) -> f32 {
        conversion::threshold_temperature(self.state.high_threshold)
    }

    pub fn low_fault_temperature(&self) -> f32 {
        conversion::threshold_temperature(self.state.low_threshold)
    }

    /// Reads the whole register file in one session. Driver state is left untouched.
    pub fn read_registers(&mut self) -> Result<RegisterSnapshot, T::Error> {
        let mut bytes = [0u8; REGISTER_COUNT];
        self.interface.read(Register::Configuration, &mut bytes)?;
        Ok(bytes.into())
    }

    pub fn wires(&self) -> Wires {
        self.state.wires
    }

    pub fn rtd_type(&self) -> RtdType {
        self.state.rtd_type
    }

    /// Current driver state
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Gives back the interface
    pub fn release(self) -> T {
        self.interface
    }

    /// Write a byte to a register. The chip ignores writes to read-only registers.
    pub fn write_byte(&mut self, register: Register, value: u8) -> Result<(), T::Error> {
        self.interface.write(register, &[value])
    }

    /// Write a word to a register, MSB first. The chip ignores writes to
    /// read-only registers.
    pub fn write_word(&mut self, register: Register, value: u16) -> Result<(), T::Error> {
        self.interface.write(register, &value.to_be_bytes())
    }

    /// Read a byte from the given register.
    pub fn read_byte(&mut self, register: Register) -> Result<u8, T::Error> {
        let mut reg_data = [0u8];
        self.interface.read(register, &mut reg_data)?;
        Ok(reg_data[0])
    }

    /// Read a word from the given register, MSB first.
    pub fn read_word(&mut self, register: Register) -> Result<u16, T::Error> {
        let mut reg_data = [0u8; 2];
        self.interface.read(register, &mut reg_data)?;
        Ok(u16::from_be_bytes(reg_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::SpiInterface;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn write(command: u8, data: Vec<u8>) -> [SpiTransaction<u8>; 4] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(command),
            SpiTransaction::write_vec(data),
            SpiTransaction::transaction_end(),
        ]
    }

    fn read(command: u8, response: Vec<u8>) -> [SpiTransaction<u8>; 4] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(command),
            SpiTransaction::read_vec(response),
            SpiTransaction::transaction_end(),
        ]
    }

    fn config_sessions(config: u8, high: [u8; 2], low: [u8; 2]) -> Vec<SpiTransaction<u8>> {
        let mut expectations = Vec::new();
        expectations.extend(write(0x80, vec![config]));
        expectations.extend(write(0x83, high.to_vec()));
        expectations.extend(write(0x85, low.to_vec()));
        expectations
    }

    fn driver(
        expectations: &[SpiTransaction<u8>],
        init: Max31865Init,
    ) -> Max31865<SpiInterface<SpiMock<u8>>> {
        init.with_interface(SpiInterface::init(SpiMock::new(expectations)))
    }

    #[test]
    fn begin_writes_config_and_open_thresholds() {
        let expectations = config_sessions(0xD2, [0xFF, 0xFF], [0x00, 0x00]);
        let interface = SpiInterface::init(SpiMock::new(&expectations));
        let rtd = Max31865Init::default().begin(interface).unwrap();
        rtd.release().release().done();
    }

    #[test]
    fn two_and_four_wire_config() {
        for wires in [Wires::TwoWire, Wires::FourWire] {
            let expectations = config_sessions(0xC2, [0xFF, 0xFF], [0x00, 0x00]);
            let init = Max31865Init {
                wires,
                rtd_type: RtdType::Pt1000,
            };
            let mut rtd = driver(&expectations, init);
            rtd.begin().unwrap();
            rtd.release().release().done();
        }
    }

    #[test]
    fn sample_without_fault() {
        let mut expectations = Vec::new();
        expectations.extend(read(0x01, vec![0x7E, 0x00]));
        expectations.extend(read(0x07, vec![0x00]));
        let mut rtd = driver(&expectations, Max31865Init::default());

        let status = rtd.sample().unwrap();
        assert!(status.is_ok());
        assert_eq!(rtd.raw_resistance(), 16128);
        assert!((rtd.resistance() - 196.88).abs() < 0.01);
        assert!((rtd.temperature() - 248.0).abs() < 1e-4);
        assert_eq!(rtd.status(), 0);
        rtd.release().release().done();
    }

    #[test]
    fn zero_ratio_reconfigures_once() {
        let mut expectations = Vec::new();
        expectations.extend(read(0x01, vec![0x00, 0x00]));
        expectations.extend(read(0x07, vec![0x00]));
        expectations.extend(config_sessions(0xD2, [0xFF, 0xFF], [0x00, 0x00]));
        let mut rtd = driver(&expectations, Max31865Init::default());

        rtd.sample().unwrap();
        assert_eq!(rtd.raw_resistance(), 0);
        rtd.release().release().done();
    }

    #[test]
    fn fault_reconfigures_with_mirrored_thresholds() {
        let mut expectations = Vec::new();
        expectations.extend(write(0x83, vec![0x59, 0x00]));
        expectations.extend(read(0x01, vec![0x7E, 0x00]));
        expectations.extend(read(0x07, vec![0x80]));
        expectations.extend(config_sessions(0xD2, [0x59, 0x00], [0x00, 0x00]));
        let mut rtd = driver(&expectations, Max31865Init::default());

        rtd.set_high_fault_temperature(100.0).unwrap();
        let status = rtd.sample().unwrap();
        assert!(status.rtd_high_threshold());
        assert_eq!(rtd.status(), 0x80);
        rtd.release().release().done();
    }

    #[test]
    fn thresholds() {
        let mut expectations = Vec::new();
        expectations.extend(write(0x83, vec![0x59, 0x00]));
        expectations.extend(write(0x85, vec![0x3E, 0x00]));
        let mut rtd = driver(&expectations, Max31865Init::default());

        rtd.set_high_fault_temperature(100.0).unwrap();
        rtd.set_low_fault_temperature(-8.0).unwrap();
        assert_eq!(rtd.high_fault_threshold(), 22784);
        assert_eq!(rtd.low_fault_threshold(), 0x3E00);
        assert_eq!(rtd.high_fault_temperature(), 100.0);
        assert_eq!(rtd.low_fault_temperature(), -8.0);
        rtd.release().release().done();
    }

    #[test]
    fn write_to_read_only_register_is_sent() {
        let expectations = write(0x87, vec![0x00]);
        let mut rtd = driver(&expectations, Max31865Init::default());

        rtd.write_byte(Register::Status, 0x00).unwrap();
        rtd.release().release().done();
    }

    #[test]
    fn register_snapshot() {
        let expectations = read(0x00, vec![0xD2, 0x7E, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00]);
        let mut rtd = driver(&expectations, Max31865Init::default());

        let snapshot = rtd.read_registers().unwrap();
        assert_eq!(snapshot.configuration, 0xD2);
        assert_eq!(snapshot.raw_resistance, 16128);
        assert_eq!(snapshot.high_threshold, 0xFFFF);
        assert!(snapshot.status.is_ok());
        assert_eq!(rtd.raw_resistance(), 0);
        rtd.release().release().done();
    }
}

//! SPI Interface
use super::Interface;
use crate::register::Register;
use embedded_hal::spi::{Operation, SpiDevice};

/// Interface over an `SpiDevice`, which owns the chip select pin.
pub struct SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    device: SPI,
}

impl<SPI, CommE> SpiInterface<SPI>
where
    SPI: SpiDevice<u8, Error = CommE>,
{
    /// Initializes an Interface with an `SpiDevice`
    /// # Arguments
    /// * `device` - SPI device for the MAX31865, in mode 1 or 3
    pub fn init(device: SPI) -> Self {
        Self { device }
    }

    /// Gives back the SPI device
    pub fn release(self) -> SPI {
        self.device
    }
}

/// Implementation of `Interface`
impl<SPI, CommE> Interface for SpiInterface<SPI>
where
    SPI: SpiDevice<u8, Error = CommE>,
{
    type Error = CommE;

    fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Self::Error> {
        self.device.transaction(&mut [
            Operation::Write(&[register.write_command()]),
            Operation::Write(data),
        ])
    }

    fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.device.transaction(&mut [
            Operation::Write(&[register.read_command()]),
            Operation::Read(buffer),
        ])
    }
}

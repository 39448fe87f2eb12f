//! Interface trait
pub mod select;
pub mod spi;

pub use self::select::{SelectError, SelectInterface};
pub use self::spi::SpiInterface;
use crate::register::Register;

/// SPI mode (CPOL = 1, CPHA = 1). The MAX31865 accepts mode 1 or mode 3.
pub const MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_3;

/// Interface Trait. `SpiInterface` and `SelectInterface` implement this.
///
/// Every call to `write` or `read` is one bus session: select asserted,
/// command byte, data, select de-asserted.
pub trait Interface {
    type Error;

    /// Writes bytes to a register, MSB first.
    /// # Arguments
    /// * `register` - register to write
    /// * `data` - bytes to write
    fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Self::Error>;
    /// Reads bytes from a register, MSB first.
    /// # Arguments
    /// * `register` - register to start reading at
    /// * `buffer` - buffer to store read data
    fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Self::Error>;
    /// Forces the select line inactive.
    fn deselect(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

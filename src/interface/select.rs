//! SPI bus Interface with a driver-controlled select pin
use super::Interface;
use crate::register::Register;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// Errors from a `SelectInterface` session
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectError<SpiE, PinE> {
    /// SPI bus transfer failed
    Spi(SpiE),
    /// Setting the select pin failed
    ChipSelect(PinE),
}

/// Holds the select pin asserted. The pin is released when the session ends
/// or is dropped, whichever comes first.
struct Session<'a, CS>
where
    CS: OutputPin,
{
    cs: &'a mut CS,
    active: bool,
}

impl<'a, CS> Session<'a, CS>
where
    CS: OutputPin,
{
    fn begin(cs: &'a mut CS) -> Result<Self, CS::Error> {
        cs.set_low()?;
        Ok(Session { cs, active: true })
    }

    fn end(mut self) -> Result<(), CS::Error> {
        self.active = false;
        self.cs.set_high()
    }
}

impl<CS> Drop for Session<'_, CS>
where
    CS: OutputPin,
{
    fn drop(&mut self) {
        if self.active {
            // already failing, the bus error is reported instead
            let _ = self.cs.set_high();
        }
    }
}

/// Interface over an exclusively owned `SpiBus` and an active-low select pin.
///
/// The bus has to be configured for `MODE` before it is handed over.
pub struct SelectInterface<BUS, CS>
where
    BUS: SpiBus,
    CS: OutputPin,
{
    bus: BUS,
    cs: CS,
}

impl<BUS, CS> SelectInterface<BUS, CS>
where
    BUS: SpiBus,
    CS: OutputPin,
{
    /// Initializes an Interface with an `SpiBus` and a chip select `OutputPin`
    /// # Arguments
    /// * `bus` - SPI bus
    /// * `cs` - Chip Select pin of the MAX31865
    pub fn init(bus: BUS, cs: CS) -> Self {
        Self { bus, cs }
    }

    /// Gives back the bus and the select pin
    pub fn release(self) -> (BUS, CS) {
        (self.bus, self.cs)
    }

    fn session<F>(&mut self, transfer: F) -> Result<(), SelectError<BUS::Error, CS::Error>>
    where
        F: FnOnce(&mut BUS) -> Result<(), BUS::Error>,
    {
        let session = Session::begin(&mut self.cs).map_err(SelectError::ChipSelect)?;
        let bus = &mut self.bus;
        match transfer(&mut *bus).and_then(|_| bus.flush()) {
            Ok(()) => session.end().map_err(SelectError::ChipSelect),
            Err(e) => {
                drop(session);
                Err(SelectError::Spi(e))
            }
        }
    }
}

/// Implementation of `Interface`
impl<BUS, CS> Interface for SelectInterface<BUS, CS>
where
    BUS: SpiBus,
    CS: OutputPin,
{
    type Error = SelectError<BUS::Error, CS::Error>;

    fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Self::Error> {
        self.session(|bus| {
            bus.write(&[register.write_command()])?;
            bus.write(data)
        })
    }

    fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.session(|bus| {
            bus.write(&[register.read_command()])?;
            bus.read(buffer)
        })
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(SelectError::ChipSelect)
    }
}

//! Async driver, for executors that cannot block on the bus.
//!
//! Same sessions and recovery as [`crate::Max31865`].
use crate::register::{Register, REGISTER_COUNT};
use crate::state::{DriverState, RegisterSnapshot};
use crate::status::FaultStatus;
use crate::{conversion, Max31865Init, RtdType, Wires};
use embedded_hal_async::spi::{Operation, SpiDevice};

/// Async counterpart of [`crate::interface::Interface`]
pub trait AsyncInterface {
    type Error;

    /// Writes bytes to a register, MSB first, in one session.
    async fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Self::Error>;
    /// Reads bytes from a register, MSB first, in one session.
    async fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// Async SPI Interface
pub struct AsyncSpiInterface<SPI>
where
    SPI: SpiDevice,
{
    device: SPI,
}

impl<SPI, CommE> AsyncSpiInterface<SPI>
where
    SPI: SpiDevice<u8, Error = CommE>,
{
    pub fn init(device: SPI) -> Self {
        Self { device }
    }

    pub fn release(self) -> SPI {
        self.device
    }
}

impl<SPI, CommE> AsyncInterface for AsyncSpiInterface<SPI>
where
    SPI: SpiDevice<u8, Error = CommE>,
{
    type Error = CommE;

    async fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Self::Error> {
        self.device
            .transaction(&mut [
                Operation::Write(&[register.write_command()]),
                Operation::Write(data),
            ])
            .await
    }

    async fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.device
            .transaction(&mut [
                Operation::Write(&[register.read_command()]),
                Operation::Read(buffer),
            ])
            .await
    }
}

impl Max31865Init {
    /// Constructs an async driver instance without touching the bus.
    pub fn with_async_interface<T>(self, interface: T) -> Max31865Async<T>
    where
        T: AsyncInterface,
    {
        Max31865Async {
            interface,
            state: DriverState::new(self.wires, self.rtd_type),
        }
    }
}

/// Async MAX31865 RTD converter
pub struct Max31865Async<T>
where
    T: AsyncInterface,
{
    interface: T,
    state: DriverState,
}

impl<T> Max31865Async<T>
where
    T: AsyncInterface,
{
    /// Writes the configuration. Chip select is handled by the `SpiDevice`.
    pub async fn begin(&mut self) -> Result<(), T::Error> {
        self.write_config().await
    }

    pub async fn write_config(&mut self) -> Result<(), T::Error> {
        let config = self.state.config_byte();
        log::debug!("max31865: config {:#04x}", config);
        self.write_byte(Register::Configuration, config).await?;
        self.write_word(Register::HighFaultThreshold, self.state.high_threshold)
            .await?;
        self.write_word(Register::LowFaultThreshold, self.state.low_threshold)
            .await
    }

    /// See [`crate::Max31865::sample`]
    pub async fn sample(&mut self) -> Result<FaultStatus, T::Error> {
        let word = self.read_word(Register::Resistance).await?;
        let status = self.read_byte(Register::Status).await?;

        if self.state.record_sample(word, status) {
            log::warn!(
                "max31865: ratio {} status {:#04x}, reconfiguring",
                self.state.raw_resistance,
                status
            );
            self.write_config().await?;
        }
        Ok(self.state.fault_status())
    }

    pub async fn set_high_fault_temperature(&mut self, celsius: f32) -> Result<(), T::Error> {
        let word = conversion::threshold(celsius);
        self.write_word(Register::HighFaultThreshold, word).await?;
        self.state.high_threshold = word;
        Ok(())
    }

    pub async fn set_low_fault_temperature(&mut self, celsius: f32) -> Result<(), T::Error> {
        let word = conversion::threshold(celsius);
        self.write_word(Register::LowFaultThreshold, word).await?;
        self.state.low_threshold = word;
        Ok(())
    }

    pub async fn read_registers(&mut self) -> Result<RegisterSnapshot, T::Error> {
        let mut bytes = [0u8; REGISTER_COUNT];
        self.interface
            .read(Register::Configuration, &mut bytes)
            .await?;
        Ok(bytes.into())
    }

    pub fn resistance(&self) -> f32 {
        self.state.resistance()
    }

    pub fn temperature(&self) -> f32 {
        self.state.temperature()
    }

    pub fn status(&self) -> u8 {
        self.state.status
    }

    pub fn fault_status(&self) -> FaultStatus {
        self.state.fault_status()
    }

    pub fn raw_resistance(&self) -> u16 {
        self.state.raw_resistance
    }

    pub fn high_fault_threshold(&self) -> u16 {
        self.state.high_threshold
    }

    pub fn low_fault_threshold(&self) -> u16 {
        self.state.low_threshold
    }

    pub fn wires(&self) -> Wires {
        self.state.wires
    }

    pub fn rtd_type(&self) -> RtdType {
        self.state.rtd_type
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn release(self) -> T {
        self.interface
    }

    pub async fn write_byte(&mut self, register: Register, value: u8) -> Result<(), T::Error> {
        self.interface.write(register, &[value]).await
    }

    pub async fn write_word(&mut self, register: Register, value: u16) -> Result<(), T::Error> {
        self.interface.write(register, &value.to_be_bytes()).await
    }

    pub async fn read_byte(&mut self, register: Register) -> Result<u8, T::Error> {
        let mut reg_data = [0u8];
        self.interface.read(register, &mut reg_data).await?;
        Ok(reg_data[0])
    }

    pub async fn read_word(&mut self, register: Register) -> Result<u16, T::Error> {
        let mut reg_data = [0u8; 2];
        self.interface.read(register, &mut reg_data).await?;
        Ok(u16::from_be_bytes(reg_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn session(command: u8, data: SpiTransaction<u8>) -> [SpiTransaction<u8>; 4] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(command),
            data,
            SpiTransaction::transaction_end(),
        ]
    }

    fn config_sessions(config: u8) -> Vec<SpiTransaction<u8>> {
        let mut expectations = Vec::new();
        expectations.extend(session(0x80, SpiTransaction::write(config)));
        expectations.extend(session(0x83, SpiTransaction::write_vec(vec![0xFF, 0xFF])));
        expectations.extend(session(0x85, SpiTransaction::write_vec(vec![0x00, 0x00])));
        expectations
    }

    fn driver(
        expectations: &[SpiTransaction<u8>],
        init: Max31865Init,
    ) -> Max31865Async<AsyncSpiInterface<SpiMock<u8>>> {
        init.with_async_interface(AsyncSpiInterface::init(SpiMock::new(expectations)))
    }

    /// Interface whose writes never reach the chip
    struct RejectingWrites;

    impl AsyncInterface for RejectingWrites {
        type Error = ();

        async fn write(&mut self, _register: Register, _data: &[u8]) -> Result<(), ()> {
            Err(())
        }

        async fn read(&mut self, _register: Register, buffer: &mut [u8]) -> Result<(), ()> {
            buffer.fill(0);
            Ok(())
        }
    }

    #[test]
    fn begin_writes_config() {
        let expectations = config_sessions(0xD2);
        let mut rtd = driver(&expectations, Max31865Init::default());
        block_on(rtd.begin()).unwrap();
        rtd.release().release().done();
    }

    #[test]
    fn faulted_sample_reconfigures() {
        let mut expectations = Vec::new();
        expectations.extend(session(0x01, SpiTransaction::read_vec(vec![0x7E, 0x00])));
        expectations.extend(session(0x07, SpiTransaction::read(0x08)));
        expectations.extend(config_sessions(0xC2));

        let init = Max31865Init {
            wires: Wires::FourWire,
            rtd_type: RtdType::Pt100,
        };
        let mut rtd = driver(&expectations, init);
        let status = block_on(rtd.sample()).unwrap();
        assert!(status.rtdin_low_open());
        assert_eq!(rtd.raw_resistance(), 16128);
        rtd.release().release().done();
    }

    #[test]
    fn zero_ratio_reconfigures_once() {
        let mut expectations = Vec::new();
        expectations.extend(session(0x01, SpiTransaction::read_vec(vec![0x00, 0x01])));
        expectations.extend(session(0x07, SpiTransaction::read(0x00)));
        expectations.extend(config_sessions(0xD2));

        let mut rtd = driver(&expectations, Max31865Init::default());
        let status = block_on(rtd.sample()).unwrap();
        assert!(status.is_ok());
        assert_eq!(rtd.raw_resistance(), 0);
        rtd.release().release().done();
    }

    #[test]
    fn high_threshold() {
        let expectations = session(0x83, SpiTransaction::write_vec(vec![0x59, 0x00]));
        let mut rtd = driver(&expectations, Max31865Init::default());
        block_on(rtd.set_high_fault_temperature(100.0)).unwrap();
        assert_eq!(rtd.high_fault_threshold(), 22784);
        rtd.release().release().done();
    }

    #[test]
    fn rejected_threshold_write_keeps_mirror() {
        let mut rtd = Max31865Init::default().with_async_interface(RejectingWrites);
        assert_eq!(block_on(rtd.set_high_fault_temperature(100.0)), Err(()));
        assert_eq!(block_on(rtd.set_low_fault_temperature(0.0)), Err(()));
        assert_eq!(rtd.high_fault_threshold(), 0xFFFF);
        assert_eq!(rtd.low_fault_threshold(), 0x0000);
    }

    #[test]
    fn register_snapshot() {
        let bytes = vec![0xC2, 0x7E, 0x00, 0x59, 0x00, 0x00, 0x00, 0x20];
        let expectations = session(0x00, SpiTransaction::read_vec(bytes));
        let mut rtd = driver(&expectations, Max31865Init::default());

        let snapshot = block_on(rtd.read_registers()).unwrap();
        assert_eq!(snapshot.configuration, 0xC2);
        assert_eq!(snapshot.raw_resistance, 16128);
        assert_eq!(snapshot.high_threshold, 22784);
        assert!(snapshot.status.refin_high());
        assert_eq!(rtd.raw_resistance(), 0);
        rtd.release().release().done();
    }
}

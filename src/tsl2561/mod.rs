//! Driver for the TAOS/AMS TSL2561 light-to-digital converter.
//!
//! The device integrates a full spectrum and an infrared photodiode. Each
//! acquisition powers the device up, waits out one integration cycle, reads a
//! channel and powers down again, so the bus must not be shared with another
//! acquisition until it returns.

pub mod calibration;
pub mod error;
pub mod lux;
pub mod registers;
pub mod state;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

pub use error::{Error, Result};
pub use lux::{Channels, Lux};
pub use registers::SlaveAddress;
pub use state::{DeviceState, Gain, IntegrationTime, Package};

use registers::{
    command, word_command, CONTROL_POWER_OFF, CONTROL_POWER_ON, REG_CHAN0_LOW, REG_CHAN1_LOW,
    REG_CONTROL, REG_ID, REG_TIMING,
};

/// Part number and silicon revision from the ID register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartId {
    pub part: u8,
    pub revision: u8,
}

pub struct Tsl2561<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    state: DeviceState,
}

impl<I2C: I2c, D: DelayNs> Tsl2561<I2C, D> {
    /// Wraps the bus without touching the device; call [`Tsl2561::init`]
    /// before reading.
    pub fn new(i2c: I2C, address: SlaveAddress, delay: D) -> Self {
        Tsl2561 {
            i2c,
            delay,
            address: address.bits(),
            state: DeviceState::default(),
        }
    }

    /// Gives back the bus and delay.
    #[cfg(test)]
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Power cycles the device and programs gain and integration time.
    pub fn init(
        &mut self,
        gain: Gain,
        integration_time: IntegrationTime,
        package: Package,
    ) -> Result<DeviceState> {
        let state = DeviceState::new(gain, integration_time, package);
        self.power_off()?;
        self.power_on()?;
        self.write_timing(&state)?;
        self.state = state;
        info!(
            "tsl2561 initialized: gain {gain}, integration {integration_time}, package {package}"
        );
        Ok(state)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<DeviceState> {
        let state = self.state.with_gain(gain);
        self.write_timing(&state)?;
        self.state = state;
        info!("tsl2561 gain set to {gain}");
        Ok(state)
    }

    pub fn set_integration_time(&mut self, integration_time: IntegrationTime) -> Result<DeviceState> {
        let state = self.state.with_integration_time(integration_time);
        self.write_timing(&state)?;
        self.state = state;
        info!(
            "tsl2561 integration time set to {integration_time} ({}ms wait)",
            state.delay_ms()
        );
        Ok(state)
    }

    /// Channel 0 counts, visible plus infrared.
    pub fn read_raw_full_spectrum(&mut self) -> Result<u16> {
        self.acquire(REG_CHAN0_LOW)
    }

    /// Channel 1 counts, infrared only.
    pub fn read_raw_infrared(&mut self) -> Result<u16> {
        self.acquire(REG_CHAN1_LOW)
    }

    /// Full spectrum minus infrared, from two separate acquisitions.
    pub fn read_raw_visible(&mut self) -> Result<i32> {
        Ok(self.read_channels()?.visible())
    }

    pub fn read_channels(&mut self) -> Result<Channels> {
        let full_spectrum = self.read_raw_full_spectrum()?;
        let infrared = self.read_raw_infrared()?;
        Ok(Channels {
            full_spectrum,
            infrared,
        })
    }

    pub fn compute_lux(&mut self) -> Result<Lux> {
        let channels = self.read_channels()?;
        Ok(lux::calculate(channels, &self.state))
    }

    pub fn read_id(&mut self) -> Result<PartId> {
        let mut data = [0u8; 1];
        self.i2c
            .write_read(self.address, &[command(REG_ID)], &mut data)
            .map_err(Error::bus)?;
        Ok(PartId {
            part: data[0] >> 4,
            revision: data[0] & 0x0F,
        })
    }

    fn acquire(&mut self, low_register: u8) -> Result<u16> {
        let mut data = [0u8; 2];
        self.power_on()?;
        self.delay.delay_ms(self.state.delay_ms());
        self.i2c
            .write_read(self.address, &[word_command(low_register)], &mut data)
            .map_err(Error::bus)?;
        self.power_off()?;
        let value = u16::from_le_bytes(data);
        debug!("tsl2561 register {low_register:#04x} read {value}");
        Ok(value)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[command(register), value])
            .map_err(Error::bus)
    }

    fn power_on(&mut self) -> Result<()> {
        self.write_register(REG_CONTROL, CONTROL_POWER_ON)
    }

    fn power_off(&mut self) -> Result<()> {
        self.write_register(REG_CONTROL, CONTROL_POWER_OFF)
    }

    fn write_timing(&mut self, state: &DeviceState) -> Result<()> {
        self.write_register(REG_TIMING, state.timing_bits())
    }
}

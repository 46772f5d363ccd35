// Register map and command encoding for the TSL2561.

use std::str::FromStr;

use super::error::Error;

pub const COMMAND_BIT: u8 = 0x80; // must be set to address the command register
pub const WORD_BIT: u8 = 0x20; // read/write a word rather than a byte

pub const REG_CONTROL: u8 = 0x00;
pub const REG_TIMING: u8 = 0x01;
pub const REG_ID: u8 = 0x0A;
pub const REG_CHAN0_LOW: u8 = 0x0C;
pub const REG_CHAN1_LOW: u8 = 0x0E;

pub const CONTROL_POWER_ON: u8 = 0x03;
pub const CONTROL_POWER_OFF: u8 = 0x00;

pub const GAIN_1X: u8 = 0x00;
pub const GAIN_16X: u8 = 0x10;

pub const INTEGRATION_13MS: u8 = 0x00; // 13.7ms
pub const INTEGRATION_101MS: u8 = 0x01;
pub const INTEGRATION_402MS: u8 = 0x02;

/// Command byte addressing `register` for a single byte transfer.
pub const fn command(register: u8) -> u8 {
    COMMAND_BIT | register
}

/// Command byte addressing `register` for a 16-bit word transfer.
pub const fn word_command(register: u8) -> u8 {
    COMMAND_BIT | WORD_BIT | register
}

/// Slave address, selected by how the ADDR SEL pin is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveAddress {
    /// ADDR SEL tied to ground.
    Low,
    /// ADDR SEL left floating.
    Float,
    /// ADDR SEL tied to VDD.
    High,
}

impl SlaveAddress {
    pub const fn bits(self) -> u8 {
        match self {
            SlaveAddress::Low => 0x29,
            SlaveAddress::Float => 0x39,
            SlaveAddress::High => 0x49,
        }
    }
}

impl Default for SlaveAddress {
    fn default() -> Self {
        SlaveAddress::High
    }
}

impl FromStr for SlaveAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "gnd" => Ok(SlaveAddress::Low),
            "float" | "normal" => Ok(SlaveAddress::Float),
            "high" | "vdd" => Ok(SlaveAddress::High),
            other => Err(Error::Configuration(format!(
                "unknown address pin setting {other:?}"
            ))),
        }
    }
}

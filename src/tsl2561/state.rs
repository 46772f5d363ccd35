use std::fmt;
use std::str::FromStr;

use super::error::Error;
use super::registers::{GAIN_16X, GAIN_1X, INTEGRATION_101MS, INTEGRATION_13MS, INTEGRATION_402MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    /// No gain.
    X1,
    X16,
}

impl Gain {
    /// Gain field of the timing register.
    pub const fn bits(self) -> u8 {
        match self {
            Gain::X1 => GAIN_1X,
            Gain::X16 => GAIN_16X,
        }
    }
}

/// Accepts either the gain index (0 or 1) or the timing register encoding
/// (0x00 or 0x10).
impl TryFrom<u8> for Gain {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            GAIN_1X => Ok(Gain::X1),
            1 | GAIN_16X => Ok(Gain::X16),
            other => Err(Error::Configuration(format!("unrecognized gain {other:#04x}"))),
        }
    }
}

impl FromStr for Gain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "1x" | "1" | "low" => Ok(Gain::X1),
            "16x" | "16" | "high" => Ok(Gain::X16),
            other => Err(Error::Configuration(format!("unrecognized gain {other:?}"))),
        }
    }
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gain::X1 => write!(f, "1x"),
            Gain::X16 => write!(f, "16x"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTime {
    /// 13.7ms
    Ms13,
    Ms101,
    Ms402,
}

impl IntegrationTime {
    /// Integration field of the timing register.
    pub const fn bits(self) -> u8 {
        match self {
            IntegrationTime::Ms13 => INTEGRATION_13MS,
            IntegrationTime::Ms101 => INTEGRATION_101MS,
            IntegrationTime::Ms402 => INTEGRATION_402MS,
        }
    }

    /// Time to wait after power-on before the channels hold a complete
    /// integration cycle.
    pub const fn delay_ms(self) -> u32 {
        match self {
            IntegrationTime::Ms13 => 15,
            IntegrationTime::Ms101 => 120,
            IntegrationTime::Ms402 => 450,
        }
    }
}

impl TryFrom<u8> for IntegrationTime {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            INTEGRATION_13MS => Ok(IntegrationTime::Ms13),
            INTEGRATION_101MS => Ok(IntegrationTime::Ms101),
            INTEGRATION_402MS => Ok(IntegrationTime::Ms402),
            other => Err(Error::Configuration(format!(
                "unrecognized integration time {other:#04x}"
            ))),
        }
    }
}

impl FromStr for IntegrationTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "13ms" | "13" | "13.7ms" => Ok(IntegrationTime::Ms13),
            "101ms" | "101" => Ok(IntegrationTime::Ms101),
            "402ms" | "402" => Ok(IntegrationTime::Ms402),
            other => Err(Error::Configuration(format!(
                "unrecognized integration time {other:?}"
            ))),
        }
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationTime::Ms13 => write!(f, "13ms"),
            IntegrationTime::Ms101 => write!(f, "101ms"),
            IntegrationTime::Ms402 => write!(f, "402ms"),
        }
    }
}

/// Physical package, which decides the calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Package {
    Cs,
    /// T, FN and CL packages share coefficients.
    TFnCl,
}

impl TryFrom<u8> for Package {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Package::Cs),
            1 => Ok(Package::TFnCl),
            other => Err(Error::Configuration(format!("unrecognized package {other}"))),
        }
    }
}

impl FromStr for Package {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "cs" => Ok(Package::Cs),
            "t" | "fn" | "cl" | "t/fn/cl" => Ok(Package::TFnCl),
            other => Err(Error::Configuration(format!("unrecognized package {other:?}"))),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Package::Cs => write!(f, "CS"),
            Package::TFnCl => write!(f, "T/FN/CL"),
        }
    }
}

/// Configuration the driver believes the device holds. The acquisition delay
/// is derived from the integration time and can only change with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    gain: Gain,
    integration_time: IntegrationTime,
    package: Package,
    delay_ms: u32,
}

impl DeviceState {
    pub const fn new(gain: Gain, integration_time: IntegrationTime, package: Package) -> Self {
        DeviceState {
            gain,
            integration_time,
            package,
            delay_ms: integration_time.delay_ms(),
        }
    }

    pub const fn with_gain(self, gain: Gain) -> Self {
        DeviceState::new(gain, self.integration_time, self.package)
    }

    pub const fn with_integration_time(self, integration_time: IntegrationTime) -> Self {
        DeviceState::new(self.gain, integration_time, self.package)
    }

    pub const fn gain(&self) -> Gain {
        self.gain
    }

    pub const fn integration_time(&self) -> IntegrationTime {
        self.integration_time
    }

    pub const fn package(&self) -> Package {
        self.package
    }

    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Combined gain|integration byte for the timing register.
    pub const fn timing_bits(&self) -> u8 {
        self.gain.bits() | self.integration_time.bits()
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        DeviceState::new(Gain::X16, IntegrationTime::Ms13, Package::TFnCl)
    }
}

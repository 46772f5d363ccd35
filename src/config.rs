use anyhow::{Context, Result};
use rocket::figment::Figment;
use rocket::serde::Deserialize;

use crate::tsl2561::{Gain, IntegrationTime, Package, SlaveAddress};

/// The `sensor` table of the Rocket configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct SensorConfig {
    pub bus: u8,
    pub address: String,
    pub gain: String,
    pub integration_time: String,
    pub package: String,
    /// Seconds between readings on the event stream.
    pub poll_interval: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            bus: 1,
            address: "high".to_string(),
            gain: "16x".to_string(),
            integration_time: "13ms".to_string(),
            package: "t".to_string(),
            poll_interval: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSettings {
    pub address: SlaveAddress,
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    pub package: Package,
}

impl SensorConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        if figment.find_value("sensor").is_err() {
            return Ok(SensorConfig::default());
        }
        figment
            .extract_inner("sensor")
            .context("Invalid [sensor] configuration")
    }

    pub fn settings(&self) -> Result<SensorSettings> {
        Ok(SensorSettings {
            address: self.address.parse().context("sensor.address")?,
            gain: self.gain.parse().context("sensor.gain")?,
            integration_time: self
                .integration_time
                .parse()
                .context("sensor.integration_time")?,
            package: self.package.parse().context("sensor.package")?,
        })
    }
}

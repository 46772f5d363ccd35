use anyhow::{anyhow, Result};
use rocket::tokio::task;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::tsl2561::{self, Tsl2561};

#[cfg(not(test))]
pub type SensorI2c = rppal::i2c::I2c;
#[cfg(not(test))]
pub type SensorDelay = rppal::hal::Delay;

#[cfg(test)]
pub type SensorI2c = embedded_hal_mock::eh1::i2c::Mock;
#[cfg(test)]
pub type SensorDelay = embedded_hal_mock::eh1::delay::NoopDelay;

pub type Sensor = Tsl2561<SensorI2c, SensorDelay>;
pub type LockableSensor = Mutex<Sensor>;
pub type SharedSensor = Arc<LockableSensor>;

#[cfg(not(test))]
pub fn setup_sensor(config: &crate::config::SensorConfig) -> Result<SharedSensor> {
    use log::info;
    use rppal::hal::Delay;
    use rppal::i2c::I2c;

    let settings = config.settings()?;
    let i2c = I2c::with_bus(config.bus)?;
    let mut sensor: Sensor = Tsl2561::new(i2c, settings.address, Delay::new());
    match sensor.read_id() {
        Ok(id) => info!(
            "found tsl2561 part {:#x} rev {} at {:#04x}",
            id.part,
            id.revision,
            settings.address.bits()
        ),
        Err(e) => return Err(anyhow!("No sensor at {:#04x}: {}", settings.address.bits(), e)),
    }
    sensor.init(settings.gain, settings.integration_time, settings.package)?;
    Ok(Arc::new(LockableSensor::new(sensor)))
}

pub fn lock_sensor(lockable_sensor: &LockableSensor) -> Result<MutexGuard<'_, Sensor>> {
    match lockable_sensor.lock() {
        Ok(v) => Ok(v),
        Err(_e) => Err(anyhow!("Failed to lock sensor")),
    }
}

/// Runs `f` with the sensor locked, on the blocking thread pool. Acquisitions
/// sleep through the integration time, so they must stay off the async workers.
pub async fn with_sensor<T, F>(shared_sensor: &SharedSensor, f: F) -> Result<T>
where
    F: FnOnce(&mut Sensor) -> tsl2561::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let shared_sensor = Arc::clone(shared_sensor);
    task::spawn_blocking(move || -> Result<T> {
        let mut sensor = lock_sensor(&shared_sensor)?;
        Ok(f(&mut *sensor)?)
    })
    .await?
}

/// One full lux acquisition with the sensor held for its whole duration.
pub async fn read_sensor(shared_sensor: &SharedSensor) -> Result<tsl2561::Lux> {
    with_sensor(shared_sensor, |sensor| sensor.compute_lux()).await
}

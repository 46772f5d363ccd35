use log::{debug, warn};

use super::calibration::{CalibrationTable, LUX_SCALE, RATIO_SCALE};
use super::state::{DeviceState, Gain, IntegrationTime};

const CH_SCALE: u32 = 10; // channel values are scaled by 2^10
const CH_SCALE_TINT0: u64 = 0x7517; // 322/11 * 2^CH_SCALE
const CH_SCALE_TINT1: u64 = 0x0FE7; // 322/81 * 2^CH_SCALE

const CLIPPING_13MS: u16 = 4900;
const CLIPPING_101MS: u16 = 37000;
const CLIPPING_402MS: u16 = 65000;

/// One reading of both photodiode channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    /// Channel 0, visible and infrared.
    pub full_spectrum: u16,
    /// Channel 1, infrared only.
    pub infrared: u16,
}

impl Channels {
    /// Full spectrum minus infrared. Sensor noise can make this negative.
    pub fn visible(&self) -> i32 {
        i32::from(self.full_spectrum) - i32::from(self.infrared)
    }
}

/// Result of a lux conversion. A saturated reading carries a lux of zero
/// that must not be mistaken for darkness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lux {
    pub lux: u32,
    pub saturated: bool,
}

impl Lux {
    pub const SATURATED: Lux = Lux {
        lux: 0,
        saturated: true,
    };

    /// The lux value, or `None` when the sensor was saturated.
    pub fn value(&self) -> Option<u32> {
        (!self.saturated).then_some(self.lux)
    }
}

fn clipping_threshold(time: IntegrationTime) -> u16 {
    match time {
        IntegrationTime::Ms13 => CLIPPING_13MS,
        IntegrationTime::Ms101 => CLIPPING_101MS,
        IntegrationTime::Ms402 => CLIPPING_402MS,
    }
}

fn channel_scale(time: IntegrationTime, gain: Gain) -> u64 {
    let scale = match time {
        IntegrationTime::Ms13 => CH_SCALE_TINT0,
        IntegrationTime::Ms101 => CH_SCALE_TINT1,
        IntegrationTime::Ms402 => 1 << CH_SCALE,
    };
    match gain {
        Gain::X1 => scale << 4,
        Gain::X16 => scale,
    }
}

/// Converts raw channel counts to lux with the manufacturer's fixed point
/// approximation. Every shift and truncation is part of the calibration.
pub fn calculate(channels: Channels, state: &DeviceState) -> Lux {
    let threshold = clipping_threshold(state.integration_time());
    if channels.full_spectrum > threshold || channels.infrared > threshold {
        warn!(
            "sensor saturated: full={} ir={} threshold={}",
            channels.full_spectrum, channels.infrared, threshold
        );
        return Lux::SATURATED;
    }

    let scale = channel_scale(state.integration_time(), state.gain());
    let full = (u64::from(channels.full_spectrum) * scale) >> CH_SCALE;
    let ir = (u64::from(channels.infrared) * scale) >> CH_SCALE;

    let ratio = if full != 0 {
        (ir << (RATIO_SCALE + 1)) / full
    } else {
        0
    };
    let ratio = (ratio + 1) >> 1;

    let table = CalibrationTable::for_package(state.package());
    // ratio is bounded well below u32::MAX once the channels passed clipping
    let (b, m) = table.coefficients(ratio as u32);

    let temp = (full * u64::from(b)) as i64 - (ir * u64::from(m)) as i64;
    let temp = temp.max(0) + (1 << (LUX_SCALE - 1));
    let lux = (temp >> LUX_SCALE) as u32;

    debug!(
        "lux: full={} ir={} scaled=({full}, {ir}) ratio={ratio:#x} b={b:#x} m={m:#x} -> {lux}",
        channels.full_spectrum, channels.infrared
    );
    Lux {
        lux,
        saturated: false,
    }
}

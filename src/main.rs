#[macro_use] extern crate rocket;

use rocket::serde::{Deserialize, Serialize, json::Json};
use rocket::tokio::time::{Duration, interval};
use rocket::response::stream::{Event, EventStream};
use rocket::{Build, Rocket, State};
use rocket::response::status::Custom;
use rocket::http::Status;

#[cfg(not(test))]
use rocket_slogger::Slogger;

mod config;
mod hardware;
mod tsl2561;

use config::SensorConfig;
#[cfg(not(test))]
use hardware::setup_sensor;
use hardware::{SharedSensor, read_sensor, with_sensor};
use tsl2561::{DeviceState, Gain, IntegrationTime, Lux};

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
struct SensorResponse {
    id: String,
    state: String,
    value: u32,
    saturated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
struct RawResponse {
    full_spectrum: u16,
    infrared: u16,
    visible: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
struct ChannelResponse {
    channel: String,
    value: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
struct StateResponse {
    gain: String,
    integration_time: String,
    package: String,
    delay_ms: u32,
}

fn lux_to_response(lux: Lux) -> SensorResponse {
    let state = match lux.value() {
        Some(v) => format!("{v} lx"),
        None => "saturated".to_string(),
    };
    SensorResponse {
        id: "sensor-ambient_light".to_string(),
        state,
        value: lux.lux,
        saturated: lux.saturated,
    }
}

fn state_to_response(state: DeviceState) -> StateResponse {
    StateResponse {
        gain: state.gain().to_string(),
        integration_time: state.integration_time().to_string(),
        package: state.package().to_string(),
        delay_ms: state.delay_ms(),
    }
}

fn failure(e: anyhow::Error) -> Custom<String> {
    let status = match e.downcast_ref::<tsl2561::Error>() {
        Some(tsl2561::Error::Configuration(_)) => Status::BadRequest,
        _ => Status::InternalServerError,
    };
    Custom(status, e.to_string())
}

fn channel_response(channel: &str, value: i32) -> Json<ChannelResponse> {
    Json(ChannelResponse {
        channel: channel.to_string(),
        value,
    })
}

#[get("/sensor/ambient_light")]
async fn ambient_light(managed_sensor: &State<SharedSensor>) -> Result<Json<SensorResponse>, Custom<String>> {
    match read_sensor(managed_sensor).await {
        Ok(lux) => Ok(Json(lux_to_response(lux))),
        Err(e) => Err(failure(e))
    }
}

#[get("/sensor/raw")]
async fn raw(managed_sensor: &State<SharedSensor>) -> Result<Json<RawResponse>, Custom<String>> {
    match with_sensor(managed_sensor, |sensor| sensor.read_channels()).await {
        Ok(channels) => Ok(Json(RawResponse {
            full_spectrum: channels.full_spectrum,
            infrared: channels.infrared,
            visible: channels.visible(),
        })),
        Err(e) => Err(failure(e))
    }
}

#[get("/sensor/raw/full_spectrum")]
async fn raw_full_spectrum(managed_sensor: &State<SharedSensor>) -> Result<Json<ChannelResponse>, Custom<String>> {
    match with_sensor(managed_sensor, |sensor| sensor.read_raw_full_spectrum()).await {
        Ok(value) => Ok(channel_response("full_spectrum", i32::from(value))),
        Err(e) => Err(failure(e))
    }
}

#[get("/sensor/raw/infrared")]
async fn raw_infrared(managed_sensor: &State<SharedSensor>) -> Result<Json<ChannelResponse>, Custom<String>> {
    match with_sensor(managed_sensor, |sensor| sensor.read_raw_infrared()).await {
        Ok(value) => Ok(channel_response("infrared", i32::from(value))),
        Err(e) => Err(failure(e))
    }
}

#[get("/sensor/raw/visible")]
async fn raw_visible(managed_sensor: &State<SharedSensor>) -> Result<Json<ChannelResponse>, Custom<String>> {
    match with_sensor(managed_sensor, |sensor| sensor.read_raw_visible()).await {
        Ok(value) => Ok(channel_response("visible", value)),
        Err(e) => Err(failure(e))
    }
}

#[get("/sensor/state")]
async fn sensor_state(managed_sensor: &State<SharedSensor>) -> Result<Json<StateResponse>, Custom<String>> {
    match with_sensor(managed_sensor, |sensor| Ok(sensor.state())).await {
        Ok(state) => Ok(Json(state_to_response(state))),
        Err(e) => Err(failure(e))
    }
}

#[put("/sensor/gain/<gain>")]
async fn set_gain(gain: &str, managed_sensor: &State<SharedSensor>) -> Result<Json<StateResponse>, Custom<String>> {
    let gain: Gain = gain.parse().map_err(|e: tsl2561::Error| failure(e.into()))?;
    match with_sensor(managed_sensor, move |sensor| sensor.set_gain(gain)).await {
        Ok(state) => Ok(Json(state_to_response(state))),
        Err(e) => Err(failure(e))
    }
}

#[put("/sensor/integration_time/<timing>")]
async fn set_integration_time(timing: &str, managed_sensor: &State<SharedSensor>) -> Result<Json<StateResponse>, Custom<String>> {
    let timing: IntegrationTime = timing.parse().map_err(|e: tsl2561::Error| failure(e.into()))?;
    match with_sensor(managed_sensor, move |sensor| sensor.set_integration_time(timing)).await {
        Ok(state) => Ok(Json(state_to_response(state))),
        Err(e) => Err(failure(e))
    }
}

#[get("/events")]
async fn events(managed_sensor: &State<SharedSensor>, config: &State<SensorConfig>) -> EventStream![] {
    let shared_sensor = SharedSensor::clone(managed_sensor);
    let period = Duration::from_secs(config.poll_interval.max(1));
    EventStream! {
        let mut interval = interval(period);
        loop {
            match read_sensor(&shared_sensor).await {
                Ok(lux) => yield Event::json(&lux_to_response(lux)).event("state"),
                Err(e) => yield Event::data(format!("Error: {}", e))
            }
            interval.tick().await;
        }
    }
}

fn mount(rocket: Rocket<Build>, sensor: SharedSensor, config: SensorConfig) -> Rocket<Build> {
    rocket
        .manage(sensor)
        .manage(config)
        .mount("/", routes![ambient_light, raw, sensor_state])
        .mount("/", routes![raw_full_spectrum, raw_infrared, raw_visible])
        .mount("/", routes![set_gain, set_integration_time])
        .mount("/", routes![events])
}

#[cfg(not(test))]
#[launch]
fn rocket() -> _ {
    let log_fairing = Slogger::new_terminal_logger();

    let rocket = rocket::build();
    let config = match SensorConfig::from_figment(rocket.figment()) {
        Ok(v) => v,
        Err(e) => {
            println!("Sensor configuration invalid: {:#}", e);
            panic!();
        }
    };
    let shared_sensor = match setup_sensor(&config) {
        Ok(v) => v,
        Err(e) => {
            println!("Sensor not initialized: {:#}", e);
            panic!();
        }
    };
    mount(rocket.attach(log_fairing), shared_sensor, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{LockableSensor, Sensor};
    use crate::tsl2561::{Package, SlaveAddress, Tsl2561};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use rocket::local::blocking::Client;
    use std::sync::Arc;

    const ADDR: u8 = 0x49;

    fn write(register: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(ADDR, vec![0x80 | register, value])
    }

    fn acquisition(register: u8, value: u16) -> Vec<I2cTransaction> {
        vec![
            write(0x00, 0x03),
            I2cTransaction::write_read(ADDR, vec![0xA0 | register], value.to_le_bytes().to_vec()),
            write(0x00, 0x00),
        ]
    }

    /// A client whose sensor was initialized at 16x, 13ms and then expects `rest`.
    fn client(rest: &[I2cTransaction]) -> (Client, I2cMock) {
        let mut expectations = vec![write(0x00, 0x00), write(0x00, 0x03), write(0x01, 0x10)];
        expectations.extend_from_slice(rest);
        let i2c = I2cMock::new(&expectations);
        let mut sensor: Sensor = Tsl2561::new(i2c.clone(), SlaveAddress::High, NoopDelay::new());
        sensor
            .init(Gain::X16, IntegrationTime::Ms13, Package::TFnCl)
            .unwrap();
        let shared_sensor = Arc::new(LockableSensor::new(sensor));
        let rocket = mount(rocket::build(), shared_sensor, SensorConfig::default());
        (Client::tracked(rocket).unwrap(), i2c)
    }

    #[test]
    fn ambient_light_reports_lux() {
        let mut rest = acquisition(0x0C, 0x100);
        rest.extend(acquisition(0x0E, 0x080));
        let (client, mut i2c) = client(&rest);
        let response = client.get("/sensor/ambient_light").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body: SensorResponse = response.into_json().unwrap();
        assert_eq!(body.value, 52);
        assert_eq!(body.state, "52 lx");
        assert!(!body.saturated);
        i2c.done();
    }

    #[test]
    fn ambient_light_flags_saturation() {
        let mut rest = acquisition(0x0C, 0xffff);
        rest.extend(acquisition(0x0E, 0));
        let (client, mut i2c) = client(&rest);
        let body: SensorResponse = client
            .get("/sensor/ambient_light")
            .dispatch()
            .into_json()
            .unwrap();
        assert!(body.saturated);
        assert_eq!(body.state, "saturated");
        i2c.done();
    }

    #[test]
    fn raw_channels() {
        let mut rest = acquisition(0x0C, 100);
        rest.extend(acquisition(0x0E, 150));
        let (client, mut i2c) = client(&rest);
        let body: RawResponse = client.get("/sensor/raw").dispatch().into_json().unwrap();
        assert_eq!(body.full_spectrum, 100);
        assert_eq!(body.infrared, 150);
        assert_eq!(body.visible, -50);
        i2c.done();
    }

    #[test]
    fn single_channel_routes() {
        let mut rest = acquisition(0x0C, 300);
        rest.extend(acquisition(0x0E, 120));
        rest.extend(acquisition(0x0C, 300));
        rest.extend(acquisition(0x0E, 120));
        let (client, mut i2c) = client(&rest);
        let full: ChannelResponse = client.get("/sensor/raw/full_spectrum").dispatch().into_json().unwrap();
        assert_eq!((full.channel.as_str(), full.value), ("full_spectrum", 300));
        let ir: ChannelResponse = client.get("/sensor/raw/infrared").dispatch().into_json().unwrap();
        assert_eq!((ir.channel.as_str(), ir.value), ("infrared", 120));
        let visible: ChannelResponse = client.get("/sensor/raw/visible").dispatch().into_json().unwrap();
        assert_eq!(visible.value, 180);
        i2c.done();
    }

    #[test]
    fn bus_failure_is_server_error() {
        let (client, mut i2c) = client(&[write(0x00, 0x03).with_error(ErrorKind::Other)]);
        let response = client.get("/sensor/ambient_light").dispatch();
        assert_eq!(response.status(), Status::InternalServerError);
        i2c.done();
    }

    #[test]
    fn set_gain_route() {
        let (client, mut i2c) = client(&[write(0x01, 0x00)]);
        let response = client.put("/sensor/gain/1x").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body: StateResponse = response.into_json().unwrap();
        assert_eq!(body.gain, "1x");
        assert_eq!(body.integration_time, "13ms");
        i2c.done();
    }

    #[test]
    fn invalid_gain_is_bad_request() {
        let (client, mut i2c) = client(&[]);
        let response = client.put("/sensor/gain/5x").dispatch();
        assert_eq!(response.status(), Status::BadRequest);

        let body: StateResponse = client.get("/sensor/state").dispatch().into_json().unwrap();
        assert_eq!(body.gain, "16x");
        i2c.done();
    }

    #[test]
    fn set_integration_time_route() {
        let (client, mut i2c) = client(&[write(0x01, 0x12)]);
        let body: StateResponse = client
            .put("/sensor/integration_time/402ms")
            .dispatch()
            .into_json()
            .unwrap();
        assert_eq!(body.integration_time, "402ms");
        assert_eq!(body.delay_ms, 450);

        let response = client.put("/sensor/integration_time/1s").dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        i2c.done();
    }
}

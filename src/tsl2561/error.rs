use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A gain, integration time or package value outside the recognized set.
    /// The driver state is left untouched.
    #[error("invalid sensor configuration: {0}")]
    Configuration(String),
    /// An I2C transaction failed. The acquisition in progress is abandoned and
    /// the device may be left powered on.
    #[error("sensor bus transaction failed: {0:?}")]
    Communication(ErrorKind),
}

impl Error {
    pub(crate) fn bus<E: embedded_hal::i2c::Error>(e: E) -> Self {
        log::debug!("tsl2561 i2c error: {e:?}");
        Error::Communication(e.kind())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

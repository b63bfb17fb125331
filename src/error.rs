use derive_more::derive::{Display, Error};
use embedded_hal::i2c::ErrorKind;

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Bus failures are reported as [`embedded_hal::i2c::ErrorKind`] rather than
/// the transport's concrete error type so that devices on different bus
/// implementations can share one error type (and one object-safe trait).
#[derive(Debug, Display, Error, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // `#[error(not(source))]` tells `derive_more` that `ErrorKind` does not
    // implement `core::error::Error`.
    #[display("I2C bus transaction failed: {_0:?}")]
    I2c(#[error(not(source))] ErrorKind),

    #[display("frame buffer allocation failed")]
    BufferAllocation,

    #[display("canvas device slot is empty")]
    NullDevice,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::I2c(kind)
    }
}

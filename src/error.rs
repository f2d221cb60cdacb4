//! Our error types for TCM controller communications.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Custom error type for TCM controller communications.
#[derive(Error, Debug)]
pub enum Error {
    /// No enumerated serial port carries the requested hardware serial number.
    #[error("no device found with serial number: {0}")]
    DeviceNotFound(String),
    /// The controller answered with a non-success status frame. Carries the
    /// full response text.
    #[error("error from controller: {0}")]
    Device(String),
    /// A query response did not contain a parseable temperature payload.
    #[error("could not parse temperature from response: {response:?}")]
    Parse { response: String },
    /// Serial communication error.
    #[error("serial communication error")]
    Serial(#[from] std::io::Error),
    /// Serial port enumeration or open error.
    #[error("serial port error")]
    Port(#[from] serialport::Error),
}

/// Error returned by a [`TemperatureObserver`](crate::poller::TemperatureObserver)
/// when it cannot handle a reading.
///
/// This is the one error class the polling loop swallows: the failed update is
/// logged and polling continues.
#[derive(Error, Debug)]
#[error("temperature update callback failed: {0}")]
pub struct CallbackError(pub String);

//! Error types for the accelerometer binding.
//!
//! Every call into the native driver returns an integer status code. Any
//! positive code is turned into a [`NativeDriverError`] that carries the code
//! unchanged; the out-value of the failed call is discarded. There is no
//! retry and no suppression at this layer.
//!
//! [`Error`] is the crate-level wrapper used where driver failures meet
//! configuration loading (for example the CLI and [`crate::config`]).

use std::ffi::c_int;
use std::fmt;

use phidget21_sys as sys;
use thiserror::Error;

/// Result of a single driver call.
pub type DriverResult<T> = std::result::Result<T, NativeDriverError>;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of the `phidget21` status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `EPHIDGET_NOTFOUND`: no device matched the type or serial number.
    NotFound,
    /// `EPHIDGET_NOMEMORY`
    NoMemory,
    /// `EPHIDGET_UNEXPECTED`
    Unexpected,
    /// `EPHIDGET_INVALIDARG`: an argument was rejected, e.g. a negative change trigger.
    InvalidArg,
    /// `EPHIDGET_NOTATTACHED`: the device is not open and attached.
    NotAttached,
    /// `EPHIDGET_INTERRUPTED`
    Interrupted,
    /// `EPHIDGET_INVALID`
    Invalid,
    /// `EPHIDGET_NETWORK`
    Network,
    /// `EPHIDGET_UNKNOWNVAL`: no reading received from the device yet.
    UnknownValue,
    /// `EPHIDGET_BADPASSWORD`
    BadPassword,
    /// `EPHIDGET_UNSUPPORTED`
    Unsupported,
    /// `EPHIDGET_DUPLICATE`: the object was already opened.
    Duplicate,
    /// `EPHIDGET_TIMEOUT`: attachment did not happen in time.
    Timeout,
    /// `EPHIDGET_OUTOFBOUNDS`: axis index beyond the axis count.
    OutOfBounds,
    /// `EPHIDGET_EVENT`
    Event,
    /// `EPHIDGET_NETWORK_NOTCONNECTED`
    NetworkNotConnected,
    /// `EPHIDGET_WRONGDEVICE`
    WrongDevice,
    /// `EPHIDGET_CLOSED`: the handle was closed.
    Closed,
    /// `EPHIDGET_BADVERSION`
    BadVersion,
    /// A code this crate does not know about.
    Other(i32),
}

impl ErrorCode {
    /// Map a raw status code to its kind.
    pub fn from_code(code: c_int) -> Self {
        match code {
            sys::EPHIDGET_NOTFOUND => Self::NotFound,
            sys::EPHIDGET_NOMEMORY => Self::NoMemory,
            sys::EPHIDGET_UNEXPECTED => Self::Unexpected,
            sys::EPHIDGET_INVALIDARG => Self::InvalidArg,
            sys::EPHIDGET_NOTATTACHED => Self::NotAttached,
            sys::EPHIDGET_INTERRUPTED => Self::Interrupted,
            sys::EPHIDGET_INVALID => Self::Invalid,
            sys::EPHIDGET_NETWORK => Self::Network,
            sys::EPHIDGET_UNKNOWNVAL => Self::UnknownValue,
            sys::EPHIDGET_BADPASSWORD => Self::BadPassword,
            sys::EPHIDGET_UNSUPPORTED => Self::Unsupported,
            sys::EPHIDGET_DUPLICATE => Self::Duplicate,
            sys::EPHIDGET_TIMEOUT => Self::Timeout,
            sys::EPHIDGET_OUTOFBOUNDS => Self::OutOfBounds,
            sys::EPHIDGET_EVENT => Self::Event,
            sys::EPHIDGET_NETWORK_NOTCONNECTED => Self::NetworkNotConnected,
            sys::EPHIDGET_WRONGDEVICE => Self::WrongDevice,
            sys::EPHIDGET_CLOSED => Self::Closed,
            sys::EPHIDGET_BADVERSION => Self::BadVersion,
            other => Self::Other(other),
        }
    }

    /// Human-readable description, worded as in the vendor headers.
    pub fn description(self) -> &'static str {
        match self {
            Self::NotFound => {
                "A Phidget matching the type and or serial number could not be found."
            }
            Self::NoMemory => "Memory could not be allocated.",
            Self::Unexpected => "Unexpected Error.",
            Self::InvalidArg => "Invalid argument passed to function.",
            Self::NotAttached => "Phidget not physically attached.",
            Self::Interrupted => "Read/Write operation was interrupted.",
            Self::Invalid => "The Error Code is not defined.",
            Self::Network => "Network Error.",
            Self::UnknownValue => {
                "Value is Unknown (State not yet received from device, or not yet set by user)."
            }
            Self::BadPassword => "Authorization Failed.",
            Self::Unsupported => "Not Supported.",
            Self::Duplicate => "Duplicated request.",
            Self::Timeout => "Given timeout has been exceeded.",
            Self::OutOfBounds => "Index out of Bounds.",
            Self::Event => "A non-null error code was returned from an event handler.",
            Self::NetworkNotConnected => "A connection to the server does not exist.",
            Self::WrongDevice => "Function is not applicable for this device.",
            Self::Closed => "Phidget handle was closed.",
            Self::BadVersion => "Webservice and Client protocol versions don't match.",
            Self::Other(_) => "Unrecognised error code.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

fn describe(code: &c_int) -> &'static str {
    ErrorCode::from_code(*code).description()
}

/// Failure status returned by a native driver entry point.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("native driver error {code}: {}", describe(.code))]
pub struct NativeDriverError {
    code: c_int,
}

impl NativeDriverError {
    /// Wrap a raw status code.
    pub fn new(code: c_int) -> Self {
        Self { code }
    }

    /// The raw status code returned by the driver.
    pub fn code(&self) -> c_int {
        self.code
    }

    /// The classified status code.
    pub fn kind(&self) -> ErrorCode {
        ErrorCode::from_code(self.code)
    }

    /// Turn a driver status into a result. Zero and negative codes are success.
    pub fn check(code: c_int) -> DriverResult<()> {
        if code > sys::EPHIDGET_OK {
            Err(Self::new(code))
        } else {
            Ok(())
        }
    }
}

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A driver call failed.
    #[error(transparent)]
    Driver(#[from] NativeDriverError),

    /// The configuration could not be read or parsed.
    #[error("Configuration load error: {0}")]
    Config(#[from] figment::Error),

    /// The configuration parsed but holds unusable values.
    #[error("Configuration validation error: {0}")]
    ConfigValidation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_ok_and_negative() {
        assert!(NativeDriverError::check(0).is_ok());
        assert!(NativeDriverError::check(-1).is_ok());
    }

    #[test]
    fn test_check_rejects_positive() {
        let err = NativeDriverError::check(sys::EPHIDGET_NOTATTACHED).unwrap_err();
        assert_eq!(err.code(), 5);
        assert_eq!(err.kind(), ErrorCode::NotAttached);
    }

    #[test]
    fn test_error_display() {
        let err = NativeDriverError::new(sys::EPHIDGET_OUTOFBOUNDS);
        assert_eq!(
            err.to_string(),
            "native driver error 14: Index out of Bounds."
        );
    }

    #[test]
    fn test_unknown_code_kept() {
        let err = NativeDriverError::new(99);
        assert_eq!(err.kind(), ErrorCode::Other(99));
        assert_eq!(err.code(), 99);
    }

    #[test]
    fn test_crate_error_is_transparent_for_driver() {
        let err: Error = NativeDriverError::new(sys::EPHIDGET_TIMEOUT).into();
        assert!(matches!(err, Error::Driver(_)));
        assert!(err.to_string().contains("Given timeout has been exceeded."));
    }
}

//! Error type for sio.
//!
//! One variant per libsoundio error code, with the library's own message as
//! `Display`, plus the failures that only exist on the Rust side.

use crate::channel_layout::MAX_CHANNELS;
use std::os::raw::c_int;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("out of memory")]
    NoMem,

    #[error("unable to initialize audio backend")]
    InitAudioBackend,

    #[error("system resource not available")]
    SystemResources,

    #[error("unable to open device")]
    OpeningDevice,

    #[error("no such device")]
    NoSuchDevice,

    #[error("invalid value")]
    Invalid,

    #[error("backend unavailable")]
    BackendUnavailable,

    #[error("unrecoverable streaming failure")]
    Streaming,

    #[error("incompatible device")]
    IncompatibleDevice,

    #[error("no such client")]
    NoSuchClient,

    #[error("incompatible backend")]
    IncompatibleBackend,

    #[error("backend disconnected")]
    BackendDisconnected,

    #[error("interrupted; try again")]
    Interrupted,

    #[error("buffer underflow")]
    Underflow,

    #[error("failed to encode string")]
    EncodingString,

    #[error("(invalid error) code {0}")]
    Unknown(i32),

    #[error(transparent)]
    Library(#[from] sio_sys::LoadError),

    #[error("string contains an interior nul byte: {0:?}")]
    InvalidName(String),

    #[error("too many channels: {0} (max {max})", max = MAX_CHANNELS)]
    TooManyChannels(usize),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps a native error code; `0` is success and yields `None`.
    pub fn from_code(code: c_int) -> Option<Self> {
        let err = match code {
            0 => return None,
            1 => Error::NoMem,
            2 => Error::InitAudioBackend,
            3 => Error::SystemResources,
            4 => Error::OpeningDevice,
            5 => Error::NoSuchDevice,
            6 => Error::Invalid,
            7 => Error::BackendUnavailable,
            8 => Error::Streaming,
            9 => Error::IncompatibleDevice,
            10 => Error::NoSuchClient,
            11 => Error::IncompatibleBackend,
            12 => Error::BackendDisconnected,
            13 => Error::Interrupted,
            14 => Error::Underflow,
            15 => Error::EncodingString,
            other => Error::Unknown(other),
        };
        Some(err)
    }

    /// `Ok(())` for `0`, the mapped error otherwise.
    pub fn check(code: c_int) -> Result<()> {
        match Self::from_code(code) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// The native code, for variants that came from the library.
    pub fn code(&self) -> Option<i32> {
        let code = match self {
            Error::NoMem => 1,
            Error::InitAudioBackend => 2,
            Error::SystemResources => 3,
            Error::OpeningDevice => 4,
            Error::NoSuchDevice => 5,
            Error::Invalid => 6,
            Error::BackendUnavailable => 7,
            Error::Streaming => 8,
            Error::IncompatibleDevice => 9,
            Error::NoSuchClient => 10,
            Error::IncompatibleBackend => 11,
            Error::BackendDisconnected => 12,
            Error::Interrupted => 13,
            Error::Underflow => 14,
            Error::EncodingString => 15,
            Error::Unknown(code) => *code,
            Error::Library(_) | Error::InvalidName(_) | Error::TooManyChannels(_) => return None,
        };
        Some(code)
    }
}

/// Human-readable message for a native error code, as `soundio_strerror`.
pub fn error_name(code: c_int) -> &'static str {
    match code {
        0 => "(no error)",
        1 => "out of memory",
        2 => "unable to initialize audio backend",
        3 => "system resource not available",
        4 => "unable to open device",
        5 => "no such device",
        6 => "invalid value",
        7 => "backend unavailable",
        8 => "unrecoverable streaming failure",
        9 => "incompatible device",
        10 => "no such client",
        11 => "incompatible backend",
        12 => "backend disconnected",
        13 => "interrupted; try again",
        14 => "buffer underflow",
        15 => "failed to encode string",
        _ => "(invalid error)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        assert!(Error::from_code(0).is_none());
        assert!(Error::check(0).is_ok());
        assert_eq!(error_name(0), "(no error)");
    }

    #[test]
    fn test_codes_map_one_to_one_with_messages() {
        for code in 1..=15 {
            let err = Error::from_code(code).unwrap();
            assert_eq!(err.code(), Some(code));
            assert_eq!(err.to_string(), error_name(code));
        }
    }

    #[test]
    fn test_unknown_code_survives() {
        let err = Error::check(42).unwrap_err();
        assert!(matches!(err, Error::Unknown(42)));
        assert_eq!(err.code(), Some(42));
        assert_eq!(error_name(42), "(invalid error)");
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_rust_side_errors_have_no_code() {
        assert_eq!(Error::InvalidName("a\0b".into()).code(), None);
        let err = Error::TooManyChannels(30);
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("30"));
        assert!(err.to_string().contains("24"));
    }

    #[test]
    fn test_specific_messages() {
        assert_eq!(Error::Interrupted.to_string(), "interrupted; try again");
        assert_eq!(
            Error::Streaming.to_string(),
            "unrecoverable streaming failure"
        );
    }
}

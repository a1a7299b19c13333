//! Errors raised while locating and binding the native library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("libsoundio not found (tried: {})", .tried.join(", "))]
    NotFound { tried: Vec<String> },

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("libsoundio is missing symbol `{symbol}`: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("unsupported libsoundio version {found}, need {required}.x")]
    UnsupportedVersion { found: i32, required: i32 },
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_candidates() {
        let err = LoadError::NotFound {
            tried: vec!["libsoundio.so.2".into(), "libsoundio.so".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("libsoundio.so.2, libsoundio.so"));
    }

    #[test]
    fn test_version_display() {
        let err = LoadError::UnsupportedVersion {
            found: 1,
            required: 2,
        };
        assert_eq!(err.to_string(), "unsupported libsoundio version 1, need 2.x");
    }
}

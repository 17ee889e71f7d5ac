//! Centralized error handling for the span engine
//!
//! This module provides a unified error type that covers the error scenarios
//! of the crate: configuration I/O, span detection and the wrap/unwrap
//! editing primitive.
//!
//! Span-level failures (`SpanError`) never reach the host: they are logged and
//! the offending element is dropped. Editing failures (`WrapError`) are
//! returned to the caller, which decides whether to no-op or show feedback.

use log::warn;
use std::fmt;
use std::io;
use std::ops::Range;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ─────────────────────────────────────────────────────────────────────────────
// Wrap Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures of the wrap/unwrap editing primitive.
///
/// The buffer is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    /// Wrap or unwrap was requested on a zero-length selection
    EmptySelection,
    /// The selection or the marker removal range exceeds the buffer
    OutOfBounds {
        range: Range<isize>,
        buffer_len: usize,
    },
    /// Strict unwrap found text around the selection that is not the marker
    MarkerMismatch { expected: String, found: String },
    /// The variant has no marker for the requested side
    MissingMarker { variant: String },
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapError::EmptySelection => write!(f, "Selection is empty"),
            WrapError::OutOfBounds { range, buffer_len } => write!(
                f,
                "Range {}..{} is outside the buffer (length {})",
                range.start, range.end, buffer_len
            ),
            WrapError::MarkerMismatch { expected, found } => write!(
                f,
                "Expected marker '{}' around the selection, found '{}'",
                expected, found
            ),
            WrapError::MissingMarker { variant } => {
                write!(f, "'{}' has no marker for this action", variant)
            }
        }
    }
}

impl std::error::Error for WrapError {}

// ─────────────────────────────────────────────────────────────────────────────
// Span Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures isolated to a single variant or a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// The splitter computed offsets outside the text or the match
    MalformedSpan {
        variant: String,
        range: Range<usize>,
    },
    /// The variant's pattern did not compile; the variant is disabled
    PatternCompileFailure { variant: String, message: String },
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::MalformedSpan { variant, range } => write!(
                f,
                "Malformed {} span at {}..{}",
                variant, range.start, range.end
            ),
            SpanError::PatternCompileFailure { variant, message } => {
                write!(f, "Pattern for {} failed to compile: {}", variant, message)
            }
        }
    }
}

impl std::error::Error for SpanError {}

// ─────────────────────────────────────────────────────────────────────────────
// Crate Error
// ─────────────────────────────────────────────────────────────────────────────

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // I/O and Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Engine Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Wrap/unwrap failure
    Wrap(WrapError),

    /// Span detection failure
    Span(SpanError),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<WrapError> for Error {
    fn from(err: WrapError) -> Self {
        Error::Wrap(err)
    }
}

impl From<SpanError> for Error {
    fn from(err: SpanError) -> Self {
        Error::Span(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => write!(f, "Configuration directory not found"),
            Error::Wrap(err) => write!(f, "Wrap failed: {}", err),
            Error::Span(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Wrap(err) => Some(err),
            Error::Span(err) => Some(err),
            Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_wrap_error_conversion() {
        let err = Error::from(WrapError::EmptySelection);
        assert!(matches!(err, Error::Wrap(WrapError::EmptySelection)));
        assert_eq!(format!("{}", err), "Wrap failed: Selection is empty");
    }

    #[test]
    fn test_display_out_of_bounds() {
        let err = WrapError::OutOfBounds {
            range: -2..5,
            buffer_len: 4,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("-2..5"));
        assert!(msg.contains("length 4"));
    }

    #[test]
    fn test_display_marker_mismatch() {
        let err = WrapError::MarkerMismatch {
            expected: "**".to_string(),
            found: "ab".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'**'"));
        assert!(msg.contains("'ab'"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_display_config_dir_not_found() {
        let err = Error::ConfigDirNotFound;
        assert_eq!(format!("{}", err), "Configuration directory not found");
    }

    #[test]
    fn test_error_source_chains() {
        use std::error::Error as StdError;
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(err.source().is_some());

        let err = Error::from(SpanError::MalformedSpan {
            variant: "bold".to_string(),
            range: 0..1,
        });
        assert!(err.source().is_some());

        assert!(Error::ConfigDirNotFound.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: super::Result<i32> = Ok(42);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: super::Result<i32> = Err(Error::ConfigDirNotFound);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 0);
    }
}

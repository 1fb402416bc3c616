// Decode error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;
use std::path::PathBuf;

/// Decode error code constants
///
/// Error code range: 1001-1007
pub struct DecodeErrorCodes {}

impl DecodeErrorCodes {
    /// Input file does not exist
    pub const INPUT_NOT_FOUND: i32 = 1001;

    /// External decoder could not be started
    pub const DECODER_UNAVAILABLE: i32 = 1002;

    /// External decoder exited with a failure status
    pub const DECODER_FAILED: i32 = 1003;

    /// Decoded PCM could not be read
    pub const INVALID_PCM: i32 = 1004;

    /// Decoded PCM contained no samples
    pub const EMPTY_SIGNAL: i32 = 1005;

    /// Temporary file could not be created or written
    pub const TEMP_FILE: i32 = 1006;

    /// Input sample rate differs from the requested one
    pub const SAMPLE_RATE_MISMATCH: i32 = 1007;
}

/// Log a decode error with structured context
///
/// This function logs decode errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_decode_error(err: &DecodeError, context: &str) {
    error!(
        "Decode error in {}: code={}, component=Decoder, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Decode-related errors
///
/// These errors cover turning an input file into a mono PCM signal:
/// spawning the external decoder, reading its output and managing the
/// temporary file it writes. All of them are fatal for the input concerned;
/// decoding is deterministic so nothing is retried.
///
/// Error code range: 1001-1007
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Input file does not exist
    InputNotFound { path: PathBuf },

    /// External decoder could not be started (missing binary, permissions)
    DecoderUnavailable { program: String, reason: String },

    /// External decoder exited with a failure status
    DecoderFailed {
        path: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    /// Decoded PCM could not be parsed
    InvalidPcm { path: PathBuf, reason: String },

    /// Decoded PCM contained no samples
    EmptySignal { path: PathBuf },

    /// Temporary file could not be created or written
    TempFile { reason: String },

    /// Input sample rate differs from the requested one
    SampleRateMismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },
}

impl ErrorCode for DecodeError {
    fn code(&self) -> i32 {
        match self {
            DecodeError::InputNotFound { .. } => DecodeErrorCodes::INPUT_NOT_FOUND,
            DecodeError::DecoderUnavailable { .. } => DecodeErrorCodes::DECODER_UNAVAILABLE,
            DecodeError::DecoderFailed { .. } => DecodeErrorCodes::DECODER_FAILED,
            DecodeError::InvalidPcm { .. } => DecodeErrorCodes::INVALID_PCM,
            DecodeError::EmptySignal { .. } => DecodeErrorCodes::EMPTY_SIGNAL,
            DecodeError::TempFile { .. } => DecodeErrorCodes::TEMP_FILE,
            DecodeError::SampleRateMismatch { .. } => DecodeErrorCodes::SAMPLE_RATE_MISMATCH,
        }
    }

    fn message(&self) -> String {
        match self {
            DecodeError::InputNotFound { path } => {
                format!("Input file not found: {}", path.display())
            }
            DecodeError::DecoderUnavailable { program, reason } => {
                format!("Failed to start decoder '{}': {}", program, reason)
            }
            DecodeError::DecoderFailed {
                path,
                status,
                stderr,
            } => {
                let status = status
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                if stderr.is_empty() {
                    format!("Decoder failed on {} (exit status {})", path.display(), status)
                } else {
                    format!(
                        "Decoder failed on {} (exit status {}): {}",
                        path.display(),
                        status,
                        stderr
                    )
                }
            }
            DecodeError::InvalidPcm { path, reason } => {
                format!("Invalid PCM in {}: {}", path.display(), reason)
            }
            DecodeError::EmptySignal { path } => {
                format!("Decoded signal from {} is empty", path.display())
            }
            DecodeError::TempFile { reason } => {
                format!("Temporary file error: {}", reason)
            }
            DecodeError::SampleRateMismatch {
                path,
                expected,
                actual,
            } => format!(
                "{} has sample rate {} Hz, expected {} Hz",
                path.display(),
                actual,
                expected
            ),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodeError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DecodeError {}

/// Convert from std::io::Error to DecodeError
impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::TempFile {
            reason: err.to_string(),
        }
    }
}

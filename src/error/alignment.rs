// Alignment error types and constants

use crate::error::{DecodeError, ErrorCode};
use log::error;
use std::fmt;

/// Alignment error code constants
///
/// Decode failures surfaced through [`AlignmentError::Decode`] keep their
/// own 1001-1007 codes.
///
/// Error code range: 2001-2007
pub struct AlignmentErrorCodes {}

impl AlignmentErrorCodes {
    /// Signal shorter than one analysis window
    pub const INSUFFICIENT_SAMPLES: i32 = 2001;

    /// Feature sequence shorter than the correlation window
    pub const INSUFFICIENT_FRAMES: i32 = 2002;

    /// Feature sequences are not comparable
    pub const FEATURE_MISMATCH: i32 = 2003;

    /// Matcher used before initialize()
    pub const NOT_INITIALIZED: i32 = 2004;

    /// initialize() called on an initialized matcher
    pub const ALREADY_INITIALIZED: i32 = 2005;

    /// Matcher used after teardown()
    pub const TORN_DOWN: i32 = 2006;

    /// Configuration values are inconsistent
    pub const INVALID_CONFIG: i32 = 2007;
}

/// Which side of a correlation a feature sequence was on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSide {
    Reference,
    Query,
}

impl fmt::Display for SequenceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSide::Reference => write!(f, "reference"),
            SequenceSide::Query => write!(f, "query"),
        }
    }
}

/// Log an alignment error with structured context
///
/// This function logs alignment errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_alignment_error(err: &AlignmentError, context: &str) {
    error!(
        "Alignment error in {}: code={}, component=OffsetFinder, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Alignment-related errors
///
/// These errors cover feature extraction, correlation and the matcher
/// lifecycle. A flat correlation curve is not an error: it is reported as a
/// NaN score on an otherwise complete result.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// Decoding one of the inputs failed
    Decode(DecodeError),

    /// Signal shorter than one analysis window
    InsufficientSamples { samples: usize, required: usize },

    /// Feature sequence shorter than the correlation window
    InsufficientFrames {
        side: SequenceSide,
        frames: usize,
        required: usize,
    },

    /// Feature sequences differ in shape or time base
    FeatureMismatch { reason: String },

    /// Matcher used before initialize()
    NotInitialized,

    /// initialize() called twice
    AlreadyInitialized,

    /// Matcher used after teardown()
    TornDown,

    /// Configuration values are inconsistent
    InvalidConfig { reason: String },
}

impl ErrorCode for AlignmentError {
    fn code(&self) -> i32 {
        match self {
            AlignmentError::Decode(err) => err.code(),
            AlignmentError::InsufficientSamples { .. } => AlignmentErrorCodes::INSUFFICIENT_SAMPLES,
            AlignmentError::InsufficientFrames { .. } => AlignmentErrorCodes::INSUFFICIENT_FRAMES,
            AlignmentError::FeatureMismatch { .. } => AlignmentErrorCodes::FEATURE_MISMATCH,
            AlignmentError::NotInitialized => AlignmentErrorCodes::NOT_INITIALIZED,
            AlignmentError::AlreadyInitialized => AlignmentErrorCodes::ALREADY_INITIALIZED,
            AlignmentError::TornDown => AlignmentErrorCodes::TORN_DOWN,
            AlignmentError::InvalidConfig { .. } => AlignmentErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            AlignmentError::Decode(err) => err.message(),
            AlignmentError::InsufficientSamples { samples, required } => format!(
                "Signal too short for feature extraction: {} samples, need at least {}",
                samples, required
            ),
            AlignmentError::InsufficientFrames {
                side,
                frames,
                required,
            } => format!(
                "The {} has {} feature frames, the correlation window needs {}",
                side, frames, required
            ),
            AlignmentError::FeatureMismatch { reason } => {
                format!("Feature sequences are not comparable: {}", reason)
            }
            AlignmentError::NotInitialized => {
                "Matcher not initialized. Call initialize() first.".to_string()
            }
            AlignmentError::AlreadyInitialized => "Matcher already initialized".to_string(),
            AlignmentError::TornDown => "Matcher has been torn down".to_string(),
            AlignmentError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlignmentError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AlignmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlignmentError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for AlignmentError {
    fn from(err: DecodeError) -> Self {
        AlignmentError::Decode(err)
    }
}

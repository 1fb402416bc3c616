// Error types for the audio offset finder
//
// This module defines custom error types for decoding and alignment operations,
// providing structured error handling with stable numeric codes that the CLI
// and library callers can match on.

mod alignment;
mod decode;

pub use alignment::{log_alignment_error, AlignmentError, AlignmentErrorCodes, SequenceSide};
pub use decode::{log_decode_error, DecodeError, DecodeErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

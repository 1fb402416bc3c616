// Audio Offset Finder - locate a clip inside a longer recording
// MFCC features, standardized per coefficient, matched by sliding correlation

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod matching;

// Re-exports for convenience
pub use analysis::{AlignmentResult, CorrelationCurve, Correlator, FeatureExtractor, FeatureSequence};
pub use audio::{Decoder, Dither, FfmpegDecoder, Signal, WavDecoder};
pub use config::AppConfig;
pub use error::{AlignmentError, DecodeError, ErrorCode};
pub use matching::{find_offset, IncrementalMatcher, OffsetFinder};

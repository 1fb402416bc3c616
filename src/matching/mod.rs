// Matching - orchestration of decode → extract → correlate
//
// Two entry points share the same pipeline:
// - OffsetFinder: stateless, decodes both inputs on every call
// - IncrementalMatcher: decodes the reference once, then matches many queries

mod incremental;
mod one_shot;

pub use incremental::IncrementalMatcher;
pub use one_shot::{find_offset, OffsetFinder};

use rand::Rng;
use std::path::Path;
use tracing::debug;

use crate::analysis::{AlignmentResult, Correlator, FeatureExtractor, FeatureSequence};
use crate::audio::{DecodeRequest, DecodedAudio, Decoder, Signal};
use crate::config::AppConfig;
use crate::error::{log_decode_error, AlignmentError, DecodeError};

/// Feature extractor and correlator configured from one `AppConfig`
struct Pipeline {
    config: AppConfig,
    extractor: FeatureExtractor,
    correlator: Correlator,
}

impl Pipeline {
    fn new(config: AppConfig) -> Result<Self, AlignmentError> {
        config.validate()?;
        let extractor =
            FeatureExtractor::new(config.features.clone(), config.alignment.sample_rate)?;
        let correlator = Correlator::new(config.alignment.correlation_frames);
        Ok(Self {
            config,
            extractor,
            correlator,
        })
    }

    /// Decode an input and read it into memory
    ///
    /// The decoded temporary is returned alongside the signal so the caller
    /// decides how long it lives. On error it has already been dropped.
    fn load<D: Decoder + ?Sized, R: Rng + ?Sized>(
        &self,
        decoder: &D,
        input: &Path,
        rng: &mut R,
    ) -> Result<(DecodedAudio, Signal), AlignmentError> {
        let request = DecodeRequest {
            input,
            sample_rate: self.config.alignment.sample_rate,
            max_duration_secs: self.config.alignment.trim_seconds,
        };
        let context = format!("{} via {}", input.display(), decoder.name());
        let log_failure = |err: DecodeError| {
            log_decode_error(&err, &context);
            err
        };
        let decoded = decoder.decode(&request).map_err(log_failure)?;
        let signal = decoded.read_signal(rng).map_err(log_failure)?;
        debug!(
            "[Matcher] Decoded {} with {}: {:.2}s",
            input.display(),
            decoder.name(),
            signal.duration_seconds()
        );
        Ok((decoded, signal))
    }

    /// Decode, release the temporary, and extract features
    fn features_of<D: Decoder + ?Sized, R: Rng + ?Sized>(
        &self,
        decoder: &D,
        input: &Path,
        rng: &mut R,
    ) -> Result<FeatureSequence, AlignmentError> {
        let (decoded, signal) = self.load(decoder, input, rng)?;
        decoded.release();
        self.extractor.extract(&signal)
    }

    fn align(
        &self,
        reference: &FeatureSequence,
        query: &FeatureSequence,
    ) -> Result<AlignmentResult, AlignmentError> {
        self.correlator.align(reference, query)
    }
}

// OffsetFinder - one-shot alignment of two files

use std::path::Path;
use tracing::info;

use super::Pipeline;
use crate::analysis::AlignmentResult;
use crate::audio::{Decoder, Dither, FfmpegDecoder};
use crate::config::AppConfig;
use crate::error::{log_alignment_error, AlignmentError};

/// Find where `query` starts inside `reference` using the default settings
/// (8000 Hz, 900 s trim, 1000 correlation frames) and ffmpeg.
///
/// # Example
/// ```no_run
/// let result = audio_offset_finder::find_offset("archive.mp3", "clip.mp3")?;
/// println!("{:.2}s (score {:.2})", result.offset_seconds, result.score);
/// # Ok::<(), audio_offset_finder::AlignmentError>(())
/// ```
pub fn find_offset(
    reference: impl AsRef<Path>,
    query: impl AsRef<Path>,
) -> Result<AlignmentResult, AlignmentError> {
    OffsetFinder::new(AppConfig::default())?.find_offset(reference.as_ref(), query.as_ref())
}

/// Stateless decode → extract → correlate for pairs of files
///
/// Nothing is kept between calls: every decoded temporary is released and
/// every signal dropped before `find_offset` returns, on success or error.
pub struct OffsetFinder<D: Decoder = FfmpegDecoder> {
    decoder: D,
    pipeline: Pipeline,
    dither: Dither,
}

impl OffsetFinder<FfmpegDecoder> {
    /// Finder decoding through ffmpeg as configured in `config.decoder`
    pub fn new(config: AppConfig) -> Result<Self, AlignmentError> {
        let decoder = FfmpegDecoder::from_config(&config.decoder);
        Self::with_decoder(config, decoder)
    }
}

impl<D: Decoder> OffsetFinder<D> {
    /// Finder using a custom decoder
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation
    pub fn with_decoder(config: AppConfig, decoder: D) -> Result<Self, AlignmentError> {
        Ok(Self {
            decoder,
            pipeline: Pipeline::new(config)?,
            dither: Dither::entropy(),
        })
    }

    /// Replace the dither source (seed it for reproducible results)
    pub fn with_dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.pipeline.config
    }

    /// Locate the start of `query` inside `reference`
    ///
    /// # Arguments
    /// * `reference` - The longer recording searched through
    /// * `query` - The clip whose opening frames are looked for
    ///
    /// # Errors
    /// - `Decode` if either input cannot be decoded
    /// - `InsufficientSamples` if either decoded signal is shorter than one window
    /// - `InsufficientFrames` if either side is shorter than the correlation window
    pub fn find_offset(
        &self,
        reference: &Path,
        query: &Path,
    ) -> Result<AlignmentResult, AlignmentError> {
        self.run(reference, query).map_err(|err| {
            log_alignment_error(&err, "find_offset");
            err
        })
    }

    fn run(&self, reference: &Path, query: &Path) -> Result<AlignmentResult, AlignmentError> {
        let reference_features =
            self.pipeline
                .features_of(&self.decoder, reference, &mut self.dither.rng(0))?;
        let query_features = self
            .pipeline
            .features_of(&self.decoder, query, &mut self.dither.rng(1))?;

        let result = self.pipeline.align(&reference_features, &query_features)?;
        info!(
            "[Matcher] {} found in {} at {:.3}s (score {:.3})",
            query.display(),
            reference.display(),
            result.offset_seconds,
            result.score
        );
        Ok(result)
    }
}

// IncrementalMatcher - one reference, many queries
//
// Lifecycle: Uninitialized → Initialized → TornDown
// - initialize(): decode the reference, extract and cache its features
// - match_query(): per-query decode/extract plus one correlation sweep
// - teardown(): release the cached temporary and features (also on drop)

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::Pipeline;
use crate::analysis::{AlignmentResult, FeatureSequence};
use crate::audio::{DecodedAudio, Decoder, Dither, FfmpegDecoder};
use crate::config::AppConfig;
use crate::error::{log_alignment_error, AlignmentError};

/// Dither stream used for the reference; queries use 1, 2, ...
const REFERENCE_STREAM: u64 = 0;

/// Reference-side resources held while initialized
struct ReferenceCache {
    decoded: DecodedAudio,
    features: FeatureSequence,
}

enum MatcherState {
    Uninitialized,
    Initialized(ReferenceCache),
    TornDown,
}

/// Matches many clips against one reference, decoding the reference once
///
/// `match_query` takes `&self` and only reads the cached features, so an
/// initialized matcher can be shared across threads and queried concurrently.
///
/// # Example
/// ```no_run
/// use audio_offset_finder::{AppConfig, IncrementalMatcher};
/// use std::path::Path;
///
/// let mut matcher = IncrementalMatcher::new("archive.mp3", AppConfig::default())?;
/// matcher.initialize()?;
/// for clip in ["a.mp3", "b.mp3"] {
///     let result = matcher.match_query(Path::new(clip))?;
///     println!("{clip}: {:.2}s", result.offset_seconds);
/// }
/// matcher.teardown();
/// # Ok::<(), audio_offset_finder::AlignmentError>(())
/// ```
pub struct IncrementalMatcher<D: Decoder = FfmpegDecoder> {
    reference: PathBuf,
    decoder: D,
    pipeline: Pipeline,
    dither: Dither,
    state: MatcherState,
    queries: AtomicU64,
}

impl IncrementalMatcher<FfmpegDecoder> {
    /// Bind a matcher to a reference file; nothing is decoded yet
    pub fn new(reference: impl Into<PathBuf>, config: AppConfig) -> Result<Self, AlignmentError> {
        let decoder = FfmpegDecoder::from_config(&config.decoder);
        Self::with_decoder(reference, config, decoder)
    }
}

impl<D: Decoder> IncrementalMatcher<D> {
    /// Bind a matcher using a custom decoder
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation
    pub fn with_decoder(
        reference: impl Into<PathBuf>,
        config: AppConfig,
        decoder: D,
    ) -> Result<Self, AlignmentError> {
        Ok(Self {
            reference: reference.into(),
            decoder,
            pipeline: Pipeline::new(config)?,
            dither: Dither::entropy(),
            state: MatcherState::Uninitialized,
            queries: AtomicU64::new(0),
        })
    }

    /// Replace the dither source (seed it for reproducible results)
    pub fn with_dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    pub fn reference(&self) -> &Path {
        &self.reference
    }

    pub fn config(&self) -> &AppConfig {
        &self.pipeline.config
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, MatcherState::Initialized(_))
    }

    /// Cached reference features, once initialized
    pub fn reference_features(&self) -> Option<&FeatureSequence> {
        match &self.state {
            MatcherState::Initialized(cache) => Some(&cache.features),
            _ => None,
        }
    }

    /// Path of the cached decoded reference, once initialized
    pub fn reference_temp_path(&self) -> Option<&Path> {
        match &self.state {
            MatcherState::Initialized(cache) => Some(cache.decoded.path()),
            _ => None,
        }
    }

    /// Decode the reference and cache its features
    ///
    /// # Errors
    /// - `AlreadyInitialized` / `TornDown` if called in the wrong state
    /// - Any decode or extraction error for the reference; the matcher then
    ///   stays uninitialized and holds no resources
    pub fn initialize(&mut self) -> Result<(), AlignmentError> {
        let result = match self.state {
            MatcherState::Uninitialized => self.load_reference(),
            MatcherState::Initialized(_) => Err(AlignmentError::AlreadyInitialized),
            MatcherState::TornDown => Err(AlignmentError::TornDown),
        };

        match result {
            Ok(cache) => {
                info!(
                    "[Matcher] Cached {} reference frames from {}",
                    cache.features.frames(),
                    self.reference.display()
                );
                self.state = MatcherState::Initialized(cache);
                Ok(())
            }
            Err(err) => {
                log_alignment_error(&err, "initialize");
                Err(err)
            }
        }
    }

    /// Locate the start of `query` inside the cached reference
    ///
    /// # Errors
    /// - `NotInitialized` before `initialize`, `TornDown` after `teardown`
    /// - Any decode, extraction or correlation error for the query
    pub fn match_query(&self, query: &Path) -> Result<AlignmentResult, AlignmentError> {
        self.run_query(query).map_err(|err| {
            log_alignment_error(&err, "match_query");
            err
        })
    }

    /// Release the cached reference temporary and features
    ///
    /// Safe to call in any state and more than once; only the first call
    /// after a successful `initialize` releases anything.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.state, MatcherState::TornDown) {
            MatcherState::Initialized(cache) => {
                cache.decoded.release();
                info!(
                    "[Matcher] Released reference cache for {}",
                    self.reference.display()
                );
            }
            MatcherState::Uninitialized => {
                debug!("[Matcher] Teardown before initialize, nothing to release");
            }
            MatcherState::TornDown => {}
        }
    }

    fn load_reference(&self) -> Result<ReferenceCache, AlignmentError> {
        let (decoded, signal) = self.pipeline.load(
            &self.decoder,
            &self.reference,
            &mut self.dither.rng(REFERENCE_STREAM),
        )?;
        let features = self.pipeline.extractor.extract(&signal)?;
        Ok(ReferenceCache { decoded, features })
    }

    fn run_query(&self, query: &Path) -> Result<AlignmentResult, AlignmentError> {
        let reference = match &self.state {
            MatcherState::Initialized(cache) => &cache.features,
            MatcherState::Uninitialized => return Err(AlignmentError::NotInitialized),
            MatcherState::TornDown => return Err(AlignmentError::TornDown),
        };

        let stream = self.queries.fetch_add(1, Ordering::Relaxed) + 1;
        let query_features =
            self.pipeline
                .features_of(&self.decoder, query, &mut self.dither.rng(stream))?;
        let result = self.pipeline.align(reference, &query_features)?;
        info!(
            "[Matcher] {} found at {:.3}s (score {:.3})",
            query.display(),
            result.offset_seconds,
            result.score
        );
        Ok(result)
    }
}

impl<D: Decoder> Drop for IncrementalMatcher<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

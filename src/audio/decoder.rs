// Decoder capability - path, rate and duration in; decoded WAV file out
//
// The core never decodes anything itself. Implementations turn an arbitrary
// input into a mono WAV file at the requested rate, owned as a temporary
// that is deleted when the `DecodedAudio` is released or dropped.

use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;
use tracing::{debug, warn};

use super::signal::Signal;
use super::wav::read_pcm;
use crate::error::DecodeError;

/// Parameters for one decode
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    /// File to decode
    pub input: &'a Path,
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Decoded audio is truncated to this many seconds
    pub max_duration_secs: f64,
}

/// Decodes an input file to mono PCM at a fixed rate
pub trait Decoder: Send + Sync {
    /// Decode `request.input` into a temporary mono WAV file
    ///
    /// # Errors
    /// Any [`DecodeError`]; the input is unusable and retrying will not help.
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedAudio, DecodeError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedAudio, DecodeError> {
        (**self).decode(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<D: Decoder + ?Sized> Decoder for Arc<D> {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedAudio, DecodeError> {
        (**self).decode(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Reject inputs that do not exist before handing them to a decoder
pub fn ensure_input_exists(path: &Path) -> Result<(), DecodeError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DecodeError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// A decoded mono WAV file on disk
///
/// The file is deleted by [`DecodedAudio::release`], or on drop if release
/// is never reached.
#[derive(Debug)]
pub struct DecodedAudio {
    path: TempPath,
}

impl DecodedAudio {
    /// Take ownership of a temporary file that already holds decoded PCM
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    /// Reserve a fresh temporary `.wav` path for a decoder to write to
    pub fn create_temp() -> Result<TempPath, DecodeError> {
        let file = tempfile::Builder::new()
            .prefix("offset_")
            .suffix(".wav")
            .tempfile()?;
        Ok(file.into_temp_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the decoded PCM into a dithered [`Signal`]
    pub fn read_signal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Signal, DecodeError> {
        let (samples, sample_rate) = read_pcm(self.path())?;
        debug!(
            "[Decoder] Read {} samples at {} Hz from {}",
            samples.len(),
            sample_rate,
            self.path().display()
        );
        Signal::from_pcm(samples, sample_rate, rng).ok_or_else(|| DecodeError::EmptySignal {
            path: self.path().to_path_buf(),
        })
    }

    /// Delete the temporary file now
    ///
    /// A failed deletion is logged and otherwise ignored; the signal has
    /// already been read, so the result of the operation is unaffected.
    pub fn release(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => debug!("[Decoder] Released {}", shown),
            Err(err) => warn!("[Decoder] Failed to remove {}: {}", shown, err),
        }
    }
}

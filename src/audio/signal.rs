// Signal - decoded, dithered mono waveform

use rand::Rng;

use super::dither::Dither;

/// Mono waveform at a fixed sample rate, samples in [-1, 1]
///
/// Every sample carries a tiny positive dither so that no frame downstream
/// is exactly silent; see [`Dither::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Build a signal from normalized PCM samples, dithering every sample
    ///
    /// # Arguments
    /// * `samples` - Mono samples scaled to [-1, 1]
    /// * `sample_rate` - Sample rate in Hz
    /// * `rng` - Random source for the dither
    ///
    /// # Returns
    /// `None` if `samples` is empty
    pub fn from_pcm<R: Rng + ?Sized>(
        mut samples: Vec<f64>,
        sample_rate: u32,
        rng: &mut R,
    ) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Dither::apply(&mut samples, rng);
        Some(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

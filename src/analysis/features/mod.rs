// FeatureExtractor - MFCC front-end producing standardized feature sequences
//
// This module turns a dithered mono signal into a compact per-frame feature
// matrix that is invariant to recording gain and DC offset, so the same
// acoustic event looks the same in two recordings made at different levels.
//
// Module organization:
// - types: Data structures (FeatureSequence)
// - fft: Windowed magnitude spectra
// - mel: Triangular filter bank and log energies
// - dct: Cepstral transform
// - mod.rs: Coordinator (FeatureExtractor)
//
// Pipeline per frame:
// 1. Pre-emphasis: y[n] = x[n] - 0.97 x[n-1]
// 2. Hamming window (256 samples), zero-pad to 512, magnitude FFT
// 3. 40 triangular filters (13 linear, 27 log-spaced), log10 energies
// 4. Orthonormal DCT-II, first 13 coefficients kept
// Then each coefficient column is standardized across all frames.
//
// References:
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric
//   representations for monosyllabic word recognition
// - Slaney, M. (1998). Auditory Toolbox, Technical Report #1998-010

mod dct;
mod fft;
mod mel;
mod types;

pub use types::FeatureSequence;

use tracing::debug;

use crate::audio::Signal;
use crate::config::FeatureConfig;
use crate::error::AlignmentError;
use dct::Dct;
use fft::FftProcessor;
use mel::FilterBank;

/// FeatureExtractor coordinates the MFCC pipeline
///
/// Built once per sample rate; `extract` may be called any number of times
/// and from several threads.
pub struct FeatureExtractor {
    config: FeatureConfig,
    sample_rate: u32,
    fft_processor: FftProcessor,
    filter_bank: FilterBank,
    dct: Dct,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor for signals at `sample_rate`
    ///
    /// # Errors
    /// `InvalidConfig` if `sample_rate` is zero or `config` fails
    /// [`FeatureConfig::validate`].
    pub fn new(config: FeatureConfig, sample_rate: u32) -> Result<Self, AlignmentError> {
        if sample_rate == 0 {
            return Err(AlignmentError::InvalidConfig {
                reason: "sample_rate must be > 0".to_string(),
            });
        }
        config.validate()?;

        let fft_processor = FftProcessor::new(config.window_samples, config.fft_size);
        let filter_bank = FilterBank::new(&config, sample_rate);
        let dct = Dct::new(filter_bank.len(), config.coefficients);

        Ok(Self {
            config,
            sample_rate,
            fft_processor,
            filter_bank,
            dct,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of whole frames in `samples` samples (a trailing partial frame is dropped)
    pub fn frame_count(&self, samples: usize) -> usize {
        if samples < self.config.window_samples {
            0
        } else {
            (samples - self.config.window_samples) / self.config.hop_samples + 1
        }
    }

    /// Minimum number of samples that yields `frames` frames
    pub fn samples_for_frames(&self, frames: usize) -> usize {
        match frames {
            0 => 0,
            n => (n - 1) * self.config.hop_samples + self.config.window_samples,
        }
    }

    /// Extract the standardized feature sequence of a signal
    ///
    /// # Errors
    /// - `InsufficientSamples` if the signal is shorter than one window
    /// - `FeatureMismatch` if the signal's rate differs from the extractor's
    pub fn extract(&self, signal: &Signal) -> Result<FeatureSequence, AlignmentError> {
        let mut features = self.extract_unstandardized(signal)?;
        features.standardize();
        Ok(features)
    }

    /// Extract raw cepstral coefficients without column standardization
    pub fn extract_unstandardized(
        &self,
        signal: &Signal,
    ) -> Result<FeatureSequence, AlignmentError> {
        if signal.sample_rate() != self.sample_rate {
            return Err(AlignmentError::FeatureMismatch {
                reason: format!(
                    "signal is at {} Hz, extractor expects {} Hz",
                    signal.sample_rate(),
                    self.sample_rate
                ),
            });
        }

        let samples = signal.samples();
        let window = self.config.window_samples;
        let hop = self.config.hop_samples;
        let coefficients = self.config.coefficients;
        let pre_emphasis = self.config.pre_emphasis;

        let frames = self.frame_count(samples.len());
        if frames == 0 {
            return Err(AlignmentError::InsufficientSamples {
                samples: samples.len(),
                required: window,
            });
        }

        let mut scratch = self.fft_processor.scratch();
        let mut frame = vec![0.0; window];
        let mut spectrum = vec![0.0; self.fft_processor.fft_size()];
        let mut log_energies = vec![0.0; self.filter_bank.len()];
        let mut data = vec![0.0; frames * coefficients];

        for (t, row) in data.chunks_exact_mut(coefficients).enumerate() {
            let start = t * hop;
            for (i, slot) in frame.iter_mut().enumerate() {
                let n = start + i;
                let previous = if n > 0 { samples[n - 1] } else { 0.0 };
                *slot = samples[n] - pre_emphasis * previous;
            }

            self.fft_processor
                .magnitude_spectrum(&frame, &mut scratch, &mut spectrum);
            self.filter_bank.log_energies(&spectrum, &mut log_energies);
            self.dct.transform(&log_energies, row);
        }

        debug!(
            "[Features] Extracted {} frames x {} coefficients from {:.2}s of audio",
            frames,
            coefficients,
            signal.duration_seconds()
        );

        Ok(FeatureSequence::from_raw(data, coefficients, hop, self.sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    const SAMPLE_RATE: u32 = 8000;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default(), SAMPLE_RATE).unwrap()
    }

    fn signal_from(samples: Vec<f64>) -> Signal {
        let mut rng = StdRng::seed_from_u64(11);
        Signal::from_pcm(samples, SAMPLE_RATE, &mut rng).unwrap()
    }

    /// Generate pure sine wave for testing
    fn generate_sine_wave(frequency: f64, duration_samples: usize) -> Vec<f64> {
        (0..duration_samples)
            .map(|i| 0.5 * (2.0 * PI * frequency * i as f64 / SAMPLE_RATE as f64).sin())
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(seed: u64, duration_samples: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..duration_samples)
            .map(|_| rng.gen_range(-0.5..0.5))
            .collect()
    }

    #[test]
    fn test_frame_count_matches_hop() {
        let extractor = extractor();
        assert_eq!(extractor.frame_count(255), 0);
        assert_eq!(extractor.frame_count(256), 1);
        assert_eq!(extractor.frame_count(415), 1);
        assert_eq!(extractor.frame_count(416), 2);
        assert_eq!(extractor.frame_count(8000), 49);
        assert_eq!(extractor.samples_for_frames(1000), 160_096);
        assert_eq!(extractor.frame_count(160_096), 1000);
    }

    #[test]
    fn test_new_rejects_what_app_config_rejects() {
        let mut oversized_window = FeatureConfig::default();
        oversized_window.window_samples = 1024;
        let mut too_many_coefficients = FeatureConfig::default();
        too_many_coefficients.coefficients = 41;
        let mut zero_hop = FeatureConfig::default();
        zero_hop.hop_samples = 0;

        for features in [oversized_window, too_many_coefficients, zero_hop] {
            let app = crate::config::AppConfig {
                features: features.clone(),
                ..Default::default()
            };
            let from_app = app.validate().unwrap_err();
            let from_extractor = FeatureExtractor::new(features, SAMPLE_RATE)
                .err()
                .expect("invalid feature config must be rejected");
            assert_eq!(from_app, from_extractor);
        }

        assert!(matches!(
            FeatureExtractor::new(FeatureConfig::default(), 0),
            Err(AlignmentError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_extract_shape_and_standardization() {
        let extractor = extractor();
        let features = extractor
            .extract(&signal_from(generate_white_noise(1, 16000)))
            .unwrap();

        assert_eq!(features.frames(), 99);
        assert_eq!(features.coefficients(), 13);
        assert_eq!(features.hop_samples(), 160);
        assert!(features.is_standardized());
        for column in 0..13 {
            let (mean, std) = features.column_stats(column);
            assert!(mean.abs() < 1e-9, "column {} mean {}", column, mean);
            assert!((std - 1.0).abs() < 1e-9, "column {} std {}", column, std);
        }
    }

    #[test]
    fn test_short_signal_is_rejected() {
        let extractor = extractor();
        let err = extractor
            .extract(&signal_from(generate_sine_wave(440.0, 255)))
            .unwrap_err();
        assert_eq!(
            err,
            AlignmentError::InsufficientSamples {
                samples: 255,
                required: 256
            }
        );
    }

    #[test]
    fn test_wrong_rate_is_rejected() {
        let extractor = extractor();
        let mut rng = StdRng::seed_from_u64(0);
        let signal = Signal::from_pcm(vec![0.1; 4000], 16000, &mut rng).unwrap();
        assert!(matches!(
            extractor.extract(&signal),
            Err(AlignmentError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_silence_stays_finite() {
        let extractor = extractor();
        let features = extractor.extract(&signal_from(vec![0.0; 8000])).unwrap();
        assert!(features.rows().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_raw_features_are_gain_sensitive_standardized_are_not() {
        let extractor = extractor();
        let noise = generate_white_noise(5, 8000);
        let quiet: Vec<f64> = noise.iter().map(|s| s * 0.1).collect();

        let raw_loud = extractor
            .extract_unstandardized(&signal_from(noise.clone()))
            .unwrap();
        let raw_quiet = extractor
            .extract_unstandardized(&signal_from(quiet.clone()))
            .unwrap();
        // 0.1x gain lowers all 40 log10 energies by 1, which only moves c0, by sqrt(40)
        let shift = raw_loud.frame(10)[0] - raw_quiet.frame(10)[0];
        assert!((shift - 40f64.sqrt()).abs() < 1e-6, "c0 shift {}", shift);

        let loud = extractor.extract(&signal_from(noise)).unwrap();
        let soft = extractor.extract(&signal_from(quiet)).unwrap();
        for (a, b) in loud.rows().zip(soft.rows()) {
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).abs() < 1e-6, "standardized features differ: {} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_sine_and_noise_differ() {
        let extractor = extractor();
        let sine = extractor
            .extract_unstandardized(&signal_from(generate_sine_wave(1000.0, 4000)))
            .unwrap();
        let noise = extractor
            .extract_unstandardized(&signal_from(generate_white_noise(2, 4000)))
            .unwrap();
        let distance: f64 = sine
            .frame(5)
            .iter()
            .zip(noise.frame(5).iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        assert!(distance > 1.0, "expected distinct cepstra, distance {}", distance);
    }
}

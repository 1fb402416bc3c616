//! Configuration management for alignment parameters
//!
//! This module provides runtime configuration loading from JSON files, so
//! decode, feature and correlation parameters can be adjusted without
//! recompilation. Every section falls back to the defaults used by the
//! command line tool.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AlignmentError;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub alignment: AlignmentConfig,
    pub features: FeatureConfig,
    pub decoder: DecoderConfig,
}

/// Decode and correlation parameters shared by both matching entry points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Sample rate both inputs are decoded to, in Hz
    pub sample_rate: u32,
    /// Maximum decoded duration per input, in seconds
    pub trim_seconds: f64,
    /// Number of leading query frames matched against the reference
    pub correlation_frames: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            trim_seconds: 900.0,
            correlation_frames: 1000,
        }
    }
}

/// MFCC front-end parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Analysis window length in samples
    pub window_samples: usize,
    /// FFT length (window is zero-padded up to this)
    pub fft_size: usize,
    /// Stride between consecutive frames in samples.
    /// Also the time quantum of reported offsets.
    pub hop_samples: usize,
    /// Number of cepstral coefficients kept per frame
    pub coefficients: usize,
    /// Pre-emphasis filter coefficient
    pub pre_emphasis: f64,
    /// Number of linearly spaced filters at the bottom of the bank
    pub linear_filters: usize,
    /// Number of log-spaced filters above the linear ones
    pub log_filters: usize,
    /// Lower edge of the first filter in Hz
    pub low_freq_hz: f64,
    /// Spacing of the linear filters in Hz
    pub linear_spacing_hz: f64,
    /// Ratio between consecutive log-spaced filter edges
    pub log_spacing: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_samples: 256,
            fft_size: 512,
            hop_samples: 160,
            coefficients: 13,
            pre_emphasis: 0.97,
            linear_filters: 13,
            log_filters: 27,
            low_freq_hz: 400.0 / 3.0,
            linear_spacing_hz: 200.0 / 3.0,
            log_spacing: 1.071_170_3,
        }
    }
}

impl FeatureConfig {
    /// Total number of triangular filters in the bank
    pub fn filter_count(&self) -> usize {
        self.linear_filters + self.log_filters
    }

    /// Check that the front-end parameters describe a usable MFCC pipeline
    ///
    /// # Returns
    /// * `Ok(())` - Parameters are consistent
    /// * `Err(AlignmentError::InvalidConfig)` - First inconsistency found
    pub fn validate(&self) -> Result<(), AlignmentError> {
        let invalid = |reason: String| Err(AlignmentError::InvalidConfig { reason });

        if self.window_samples == 0 || self.hop_samples == 0 {
            return invalid("window_samples and hop_samples must be > 0".to_string());
        }
        if self.window_samples > self.fft_size {
            return invalid(format!(
                "window_samples ({}) exceeds fft_size ({})",
                self.window_samples, self.fft_size
            ));
        }
        if self.coefficients == 0 || self.coefficients > self.filter_count() {
            return invalid(format!(
                "coefficients must be in 1..={} (got {})",
                self.filter_count(),
                self.coefficients
            ));
        }
        if self.log_spacing <= 1.0 || self.linear_spacing_hz <= 0.0 {
            return invalid("filter spacing must be increasing".to_string());
        }
        Ok(())
    }
}

/// External decoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Program invoked to decode and resample inputs
    pub program: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// the JSON is invalid (a warning is logged in both cases)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check that the parameters describe a usable pipeline
    ///
    /// # Returns
    /// * `Ok(())` - Configuration is consistent
    /// * `Err(AlignmentError::InvalidConfig)` - First inconsistency found
    pub fn validate(&self) -> Result<(), AlignmentError> {
        let invalid = |reason: String| Err(AlignmentError::InvalidConfig { reason });
        let alignment = &self.alignment;

        if alignment.sample_rate == 0 {
            return invalid("sample_rate must be > 0".to_string());
        }
        if alignment.trim_seconds.is_nan() || alignment.trim_seconds <= 0.0 {
            return invalid(format!(
                "trim_seconds must be > 0 (got {})",
                alignment.trim_seconds
            ));
        }
        if alignment.correlation_frames == 0 {
            return invalid("correlation_frames must be > 0".to_string());
        }
        self.features.validate()?;
        if self.decoder.program.trim().is_empty() {
            return invalid("decoder program must not be empty".to_string());
        }
        Ok(())
    }
}

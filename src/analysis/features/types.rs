// Types module - feature matrix produced by the extractor
//
// A `FeatureSequence` is a row-major `frames x coefficients` matrix plus the
// time base needed to turn a frame index back into seconds.

use crate::error::AlignmentError;

/// Per-frame cepstral feature vectors of one recording
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSequence {
    data: Vec<f64>,
    frames: usize,
    coefficients: usize,
    hop_samples: usize,
    sample_rate: u32,
    standardized: bool,
}

impl FeatureSequence {
    pub(crate) fn from_raw(
        data: Vec<f64>,
        coefficients: usize,
        hop_samples: usize,
        sample_rate: u32,
    ) -> Self {
        debug_assert!(coefficients > 0 && data.len() % coefficients == 0);
        Self {
            frames: data.len() / coefficients,
            data,
            coefficients,
            hop_samples,
            sample_rate,
            standardized: false,
        }
    }

    /// Build a sequence from explicit rows (one row per frame)
    ///
    /// Rows are taken as they are; call [`FeatureSequence::standardize`] if
    /// they are not already standardized.
    ///
    /// # Errors
    /// `FeatureMismatch` if there are no rows, rows are empty, or rows differ
    /// in length.
    pub fn from_frames(
        rows: Vec<Vec<f64>>,
        hop_samples: usize,
        sample_rate: u32,
    ) -> Result<Self, AlignmentError> {
        let coefficients = rows.first().map(Vec::len).unwrap_or(0);
        if coefficients == 0 {
            return Err(AlignmentError::FeatureMismatch {
                reason: "feature rows must be non-empty".to_string(),
            });
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != coefficients) {
            return Err(AlignmentError::FeatureMismatch {
                reason: format!(
                    "row {} has {} coefficients, expected {}",
                    bad,
                    rows[bad].len(),
                    coefficients
                ),
            });
        }
        let data = rows.into_iter().flatten().collect();
        Ok(Self::from_raw(data, coefficients, hop_samples, sample_rate))
    }

    /// Number of frames (T)
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Coefficients per frame (C)
    pub fn coefficients(&self) -> usize {
        self.coefficients
    }

    pub fn hop_samples(&self) -> usize {
        self.hop_samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_standardized(&self) -> bool {
        self.standardized
    }

    /// Seconds between consecutive frames
    pub fn frame_seconds(&self) -> f64 {
        self.hop_samples as f64 / f64::from(self.sample_rate)
    }

    pub fn frame(&self, index: usize) -> &[f64] {
        &self.data[index * self.coefficients..(index + 1) * self.coefficients]
    }

    /// Rows `start..start + count` as one contiguous slice
    pub fn window(&self, start: usize, count: usize) -> &[f64] {
        &self.data[start * self.coefficients..(start + count) * self.coefficients]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.coefficients)
    }

    /// Mean and population standard deviation of one coefficient column
    pub fn column_stats(&self, column: usize) -> (f64, f64) {
        let n = self.frames as f64;
        let mean = self.rows().map(|row| row[column]).sum::<f64>() / n;
        let variance = self
            .rows()
            .map(|row| {
                let d = row[column] - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        (mean, variance.sqrt())
    }

    /// Give every column zero mean and unit variance
    ///
    /// A column with zero variance is only centered, leaving it all zeros.
    pub fn standardize(&mut self) {
        for column in 0..self.coefficients {
            let (mean, std) = self.column_stats(column);
            let scale = if std > 0.0 { 1.0 / std } else { 1.0 };
            for row in self.data.chunks_exact_mut(self.coefficients) {
                row[column] = (row[column] - mean) * scale;
            }
        }
        self.standardized = true;
    }
}

// Correlator - locating the opening of a query inside a reference
//
// This is clip localization, not a symmetric cross-correlation: only the
// first `window_frames` frames of the query are used, slid across every
// position of the reference.
//
// For each reference position k:
//   curve[k] = || sum_t R[k + t] * Q[t] ||_2   (t < window_frames, elementwise *)
// i.e. per coefficient column, the dot product of the reference window and
// the query prefix over time, then the L2 norm over columns.
//
// The best alignment is the first maximum of the curve; its confidence is
// the standard score (peak - mean) / std of the whole curve.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::features::FeatureSequence;
use crate::error::{AlignmentError, SequenceSide};

/// Offset of a query inside a reference and how clearly it stands out
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentResult {
    /// Start of the query within the reference, in seconds (a multiple of the hop time)
    pub offset_seconds: f64,
    /// Standard score of the correlation peak; NaN when the curve is flat
    pub score: f64,
    /// Reference frame at which the query starts
    pub frame_index: usize,
}

impl AlignmentResult {
    /// False when the score is undefined (flat curve, e.g. silent input)
    pub fn is_reliable(&self) -> bool {
        self.score.is_finite()
    }
}

/// Correlation strength at every reference position
///
/// Never empty: the correlator refuses inputs that would produce an empty
/// curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationCurve {
    values: Vec<f64>,
}

impl CorrelationCurve {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index and value of the first maximum
    pub fn peak(&self) -> (usize, f64) {
        let mut best = (0, self.values[0]);
        for (index, &value) in self.values.iter().enumerate().skip(1) {
            if value > best.1 {
                best = (index, value);
            }
        }
        best
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / self.values.len() as f64;
        variance.sqrt()
    }

    /// `(curve[index] - mean) / std`, or NaN if every value is the same
    ///
    /// # Panics
    /// If `index >= self.len()`, flat curve or not.
    pub fn standard_score(&self, index: usize) -> f64 {
        let value = self.values[index];
        let first = self.values[0];
        if self.values.iter().all(|&v| v == first) {
            return f64::NAN;
        }
        let std = self.std_dev();
        if std > 0.0 {
            (value - self.mean()) / std
        } else {
            f64::NAN
        }
    }
}

/// Slides a query prefix of fixed length across a reference
#[derive(Debug, Clone, Copy)]
pub struct Correlator {
    window_frames: usize,
}

impl Correlator {
    /// # Arguments
    /// * `window_frames` - Number of leading query frames to match (W)
    pub fn new(window_frames: usize) -> Self {
        Self { window_frames }
    }

    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    /// Compute the correlation curve (length `T_ref - W + 1`)
    ///
    /// # Errors
    /// - `InvalidConfig` if W is zero
    /// - `FeatureMismatch` if the sequences differ in width or time base
    /// - `InsufficientFrames` if either side has fewer than W frames
    pub fn correlate(
        &self,
        reference: &FeatureSequence,
        query: &FeatureSequence,
    ) -> Result<CorrelationCurve, AlignmentError> {
        self.check_inputs(reference, query)?;

        let w = self.window_frames;
        let coefficients = reference.coefficients();
        let prefix = query.window(0, w);
        let positions = reference.frames() - w + 1;
        let score_at = |k: usize| window_score(reference.window(k, w), prefix, coefficients);

        #[cfg(feature = "parallel")]
        let values: Vec<f64> = (0..positions).into_par_iter().map(score_at).collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<f64> = (0..positions).map(score_at).collect();

        debug!(
            "[Correlator] {} positions over {} reference frames (window {})",
            positions,
            reference.frames(),
            w
        );
        Ok(CorrelationCurve { values })
    }

    /// Correlate and convert the curve's peak into an offset and score
    pub fn align(
        &self,
        reference: &FeatureSequence,
        query: &FeatureSequence,
    ) -> Result<AlignmentResult, AlignmentError> {
        let curve = self.correlate(reference, query)?;
        let (frame_index, peak) = curve.peak();
        let score = curve.standard_score(frame_index);
        let offset_seconds = frame_index as f64 * reference.frame_seconds();

        debug!(
            "[Correlator] Peak {:.3} at frame {} ({:.3}s), score {:.3}",
            peak, frame_index, offset_seconds, score
        );
        Ok(AlignmentResult {
            offset_seconds,
            score,
            frame_index,
        })
    }

    fn check_inputs(
        &self,
        reference: &FeatureSequence,
        query: &FeatureSequence,
    ) -> Result<(), AlignmentError> {
        if self.window_frames == 0 {
            return Err(AlignmentError::InvalidConfig {
                reason: "correlation window must be at least one frame".to_string(),
            });
        }
        if reference.coefficients() != query.coefficients() {
            return Err(AlignmentError::FeatureMismatch {
                reason: format!(
                    "reference has {} coefficients per frame, query has {}",
                    reference.coefficients(),
                    query.coefficients()
                ),
            });
        }
        if reference.hop_samples() != query.hop_samples()
            || reference.sample_rate() != query.sample_rate()
        {
            return Err(AlignmentError::FeatureMismatch {
                reason: format!(
                    "reference frames are {} samples at {} Hz, query frames are {} samples at {} Hz",
                    reference.hop_samples(),
                    reference.sample_rate(),
                    query.hop_samples(),
                    query.sample_rate()
                ),
            });
        }
        for (side, sequence) in [
            (SequenceSide::Reference, reference),
            (SequenceSide::Query, query),
        ] {
            if sequence.frames() < self.window_frames {
                return Err(AlignmentError::InsufficientFrames {
                    side,
                    frames: sequence.frames(),
                    required: self.window_frames,
                });
            }
        }
        Ok(())
    }
}

/// L2 norm of the per-column dot products of two equally sized windows
fn window_score(reference: &[f64], prefix: &[f64], coefficients: usize) -> f64 {
    let mut sums = vec![0.0; coefficients];
    for (r_row, q_row) in reference
        .chunks_exact(coefficients)
        .zip(prefix.chunks_exact(coefficients))
    {
        for ((sum, r), q) in sums.iter_mut().zip(r_row).zip(q_row) {
            *sum += r * q;
        }
    }
    sums.iter().map(|s| s * s).sum::<f64>().sqrt()
}

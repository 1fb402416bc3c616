// DCT module - orthonormal type-II discrete cosine transform
//
// Only the first `outputs` coefficients are ever needed, so the transform is
// a precomputed `outputs x inputs` matrix rather than an FFT-based DCT.

use std::f64::consts::PI;

/// Truncated orthonormal DCT-II
pub struct Dct {
    inputs: usize,
    basis: Vec<f64>,
}

impl Dct {
    /// # Arguments
    /// * `inputs` - Length of the transformed vector (number of filters)
    /// * `outputs` - Number of leading coefficients kept (<= inputs)
    pub fn new(inputs: usize, outputs: usize) -> Self {
        let n = inputs as f64;
        let mut basis = Vec::with_capacity(inputs * outputs);
        for k in 0..outputs {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            for i in 0..inputs {
                basis.push(scale * (PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n)).cos());
            }
        }
        Self { inputs, basis }
    }

    pub fn transform(&self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), self.inputs);
        for (out, row) in output.iter_mut().zip(self.basis.chunks_exact(self.inputs)) {
            *out = row.iter().zip(input.iter()).map(|(b, x)| b * x).sum();
        }
    }
}

// FFT module - windowed magnitude spectra of analysis frames
//
// Frames are Hamming-windowed, zero-padded to the FFT length and transformed.
// The full (two-sided) magnitude spectrum is returned because the filter bank
// is laid out over all `fft_size` bins.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Reusable work buffers for [`FftProcessor::magnitude_spectrum`]
pub struct FftScratch {
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

/// FFT processor that computes magnitude spectra from audio frames
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    fft_size: usize,
    /// Periodic Hamming window (pre-computed)
    window: Vec<f64>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `window_size` - Frame length in samples (<= fft_size)
    /// * `fft_size` - FFT length; frames are zero-padded up to it
    pub fn new(window_size: usize, fft_size: usize) -> Self {
        debug_assert!(window_size <= fft_size);
        let window = hamming_window(window_size);
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Allocate work buffers sized for this processor
    pub fn scratch(&self) -> FftScratch {
        FftScratch {
            buffer: vec![Complex::new(0.0, 0.0); self.fft_size],
            scratch: vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()],
        }
    }

    /// Compute the magnitude spectrum of one frame
    ///
    /// # Arguments
    /// * `frame` - Samples of one frame (length == window_size)
    /// * `scratch` - Work buffers from [`FftProcessor::scratch`]
    /// * `magnitudes` - Output, length == fft_size
    pub fn magnitude_spectrum(
        &self,
        frame: &[f64],
        scratch: &mut FftScratch,
        magnitudes: &mut [f64],
    ) {
        for (slot, (&sample, &weight)) in scratch
            .buffer
            .iter_mut()
            .zip(frame.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample * weight, 0.0);
        }
        for slot in scratch.buffer[self.window.len()..].iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft
            .process_with_scratch(&mut scratch.buffer, &mut scratch.scratch);

        for (magnitude, bin) in magnitudes.iter_mut().zip(scratch.buffer.iter()) {
            *magnitude = bin.norm();
        }
    }
}

/// Periodic Hamming window: `0.54 - 0.46 cos(2πn / N)`
pub fn hamming_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / size as f64).cos())
        .collect()
}

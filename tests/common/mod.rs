//! Shared helpers for integration tests: synthetic recordings written as WAV
#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use audio_offset_finder::audio::write_pcm16;
use audio_offset_finder::config::AppConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SAMPLE_RATE: u32 = 8000;

/// Speech-like test audio: short segments of coloured noise and tones with
/// varying level, so every part of the recording has a distinct spectrum.
pub fn speech_like(seed: u64, seconds: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let total = (seconds * SAMPLE_RATE as f64).round() as usize;
    let mut samples = Vec::with_capacity(total);

    while samples.len() < total {
        let length = rng.gen_range(320..1600).min(total - samples.len());
        let amplitude = rng.gen_range(0.05..0.5);
        let colour: f64 = rng.gen_range(-0.9..0.9);
        let tone_hz = rng.gen_range(100.0..3000.0);
        let tone_mix = rng.gen_range(0.0..1.0);
        let start = samples.len();

        let mut state = 0.0;
        for i in 0..length {
            let white: f64 = rng.gen_range(-1.0..1.0);
            state = colour * state + (1.0 - colour.abs()) * white;
            let t = (start + i) as f64 / SAMPLE_RATE as f64;
            let tone = (2.0 * PI * tone_hz * t).sin();
            samples.push(amplitude * ((1.0 - tone_mix) * state + tone_mix * tone));
        }
    }
    samples
}

pub fn write_wav(dir: &Path, name: &str, samples: &[f64]) -> PathBuf {
    let path = dir.join(name);
    write_pcm16(&path, samples, SAMPLE_RATE).expect("write test wav");
    path
}

pub fn seconds_to_samples(seconds: f64) -> usize {
    (seconds * SAMPLE_RATE as f64).round() as usize
}

/// Defaults with a shorter correlation window so clips of a few seconds match
pub fn test_config(correlation_frames: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.alignment.correlation_frames = correlation_frames;
    config
}

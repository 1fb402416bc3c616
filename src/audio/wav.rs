// WAV I/O - reading decoded PCM and a passthrough decoder for WAV inputs

use std::path::Path;
use tracing::debug;

use super::decoder::{ensure_input_exists, DecodeRequest, DecodedAudio, Decoder};
use crate::error::DecodeError;

/// Read a WAV file into mono samples scaled to [-1, 1]
///
/// Integer PCM is divided by its full-scale value `2^(bits - 1)` (2^15 for
/// 16-bit). Float PCM is taken as is. Multi-channel files are averaged down
/// to mono.
///
/// Bit depths outside the usual 8/16/24/32 are tolerated as long as the
/// samples themselves decode: some decoders write odd header fields (e.g. an
/// 18-byte format block) for ordinary 16-bit data.
///
/// # Returns
/// `(samples, sample_rate)`
pub fn read_pcm(path: &Path) -> Result<(Vec<f64>, u32), DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidPcm {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = hound::WavReader::open(path).map_err(|err| invalid(err.to_string()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(invalid("zero channels".to_string()));
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|err| invalid(err.to_string()))?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(invalid(format!(
                    "unsupported bits_per_sample={}",
                    spec.bits_per_sample
                )));
            }
            let full_scale = f64::from(1u32 << (spec.bits_per_sample - 1));
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| f64::from(v) / full_scale))
                .collect::<Result<_, _>>()
                .map_err(|err| invalid(err.to_string()))?
        }
    };

    let channels = usize::from(spec.channels);
    let samples = if channels == 1 {
        interleaved
    } else {
        debug!(
            "[Decoder] Downmixing {} channels in {}",
            channels,
            path.display()
        );
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

/// Write mono samples in [-1, 1] as 16-bit PCM
pub fn write_pcm16(path: &Path, samples: &[f64], sample_rate: u32) -> Result<(), DecodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_temp_err = |err: hound::Error| DecodeError::TempFile {
        reason: format!("writing {}: {}", path.display(), err),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_temp_err)?;
    for &sample in samples {
        let scaled = (sample * 32768.0).round().clamp(i16::MIN as f64, i16::MAX as f64);
        writer.write_sample(scaled as i16).map_err(to_temp_err)?;
    }
    writer.finalize().map_err(to_temp_err)
}

/// Decoder for inputs that are already WAV at the target rate
///
/// Downmixes to mono, truncates to the requested duration and writes a
/// 16-bit temporary, the same output contract as the ffmpeg decoder. No
/// resampling is done: a rate mismatch is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for WavDecoder {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedAudio, DecodeError> {
        ensure_input_exists(request.input)?;
        let (mut samples, sample_rate) = read_pcm(request.input)?;
        if sample_rate != request.sample_rate {
            return Err(DecodeError::SampleRateMismatch {
                path: request.input.to_path_buf(),
                expected: request.sample_rate,
                actual: sample_rate,
            });
        }

        let max_samples = (request.max_duration_secs * f64::from(sample_rate)).floor() as usize;
        samples.truncate(max_samples);

        let output = DecodedAudio::create_temp()?;
        write_pcm16(&output, &samples, sample_rate)?;
        debug!(
            "[Decoder] Copied {} samples from {} to {}",
            samples.len(),
            request.input.display(),
            output.display()
        );
        Ok(DecodedAudio::new(output))
    }

    fn name(&self) -> &str {
        "wav"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_stereo(path: &Path, frames: &[(i16, i16)], sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &(left, right) in frames {
            writer.write_sample(left).unwrap();
            writer.write_sample(right).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_scales_by_full_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scale.wav");
        write_pcm16(&path, &[0.5, -0.5, -1.0], 8000).unwrap();

        let (samples, rate) = read_pcm(&path).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples, vec![0.5, -0.5, -1.0]);
    }

    /// RIFF/WAVE bytes with an 18-byte `fmt ` chunk (cbSize = 0), as ffmpeg writes
    fn wav_with_extended_fmt(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4 + 8 + 18 + 8 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes()); // cbSize
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_read_tolerates_extended_fmt_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffmpeg_style.wav");
        std::fs::write(&path, wav_with_extended_fmt(&[0, 16384, -16384, 32767], 8000)).unwrap();

        let (samples, rate) = read_pcm(&path).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples.len(), 4);
        assert_eq!(&samples[..3], &[0.0, 0.5, -0.5]);
        assert!((samples[3] - 32767.0 / 32768.0).abs() < 1e-12);
    }

    #[test]
    fn test_read_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_stereo(&path, &[(16384, 0), (-16384, -16384)], 8000);

        let (samples, _) = read_pcm(&path).unwrap();
        assert_eq!(samples, vec![0.25, -0.5]);
    }

    #[test]
    fn test_read_garbage_is_invalid_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not a RIFF file").unwrap();
        assert!(matches!(
            read_pcm(&path),
            Err(DecodeError::InvalidPcm { .. })
        ));
    }

    #[test]
    fn test_wav_decoder_truncates_to_trim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("long.wav");
        write_pcm16(&input, &vec![0.1; 8000 * 3], 8000).unwrap();

        let decoded = WavDecoder::new()
            .decode(&DecodeRequest {
                input: &input,
                sample_rate: 8000,
                max_duration_secs: 1.5,
            })
            .unwrap();
        let (samples, rate) = read_pcm(decoded.path()).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples.len(), 12000);
        decoded.release();
    }

    #[test]
    fn test_wav_decoder_rejects_other_rates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cd.wav");
        write_pcm16(&input, &[0.0; 441], 44100).unwrap();

        let err = WavDecoder::new()
            .decode(&DecodeRequest {
                input: &input,
                sample_rate: 8000,
                max_duration_secs: 900.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::SampleRateMismatch {
                expected: 8000,
                actual: 44100,
                ..
            }
        ));
    }
}

// FFmpeg decoder - external process that decodes, downmixes and resamples

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use super::decoder::{ensure_input_exists, DecodeRequest, DecodedAudio, Decoder};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Decodes any input ffmpeg understands into 16-bit mono WAV
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: String,
}

impl FfmpegDecoder {
    /// Decoder running `ffmpeg` from `PATH`
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Decoder running a specific ffmpeg binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::with_program(config.program.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_args(request: &DecodeRequest<'_>, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-loglevel", "panic", "-y", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(request.input.as_os_str().to_owned());
        for arg in [
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            request.sample_rate.to_string(),
            "-ss".to_string(),
            "0".to_string(),
            "-t".to_string(),
            request.max_duration_secs.to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
        ] {
            args.push(OsString::from(arg));
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FfmpegDecoder {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedAudio, DecodeError> {
        ensure_input_exists(request.input)?;
        let output = DecodedAudio::create_temp()?;
        let args = Self::build_args(request, &output);
        debug!("[Decoder] Running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| DecodeError::DecoderUnavailable {
                program: self.program.clone(),
                reason: err.to_string(),
            })?;

        if !result.status.success() {
            // `output` is dropped here, removing the partial file
            return Err(DecodeError::DecoderFailed {
                path: request.input.to_path_buf(),
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(DecodedAudio::new(output))
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

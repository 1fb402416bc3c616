// Audio module - signal acquisition from arbitrary input files
//
// Decoding itself is delegated to a `Decoder` (an external ffmpeg process in
// production, an in-process WAV reader or a test fake otherwise). This module
// owns what happens around it: the temporary decoded file, reading PCM back
// into memory, scaling to [-1, 1] and dithering.

mod decoder;
mod dither;
mod ffmpeg;
mod signal;
mod wav;

pub use decoder::{ensure_input_exists, DecodeRequest, DecodedAudio, Decoder};
pub use dither::{Dither, DITHER_AMPLITUDE};
pub use ffmpeg::FfmpegDecoder;
pub use signal::Signal;
pub use wav::{read_pcm, write_pcm16, WavDecoder};

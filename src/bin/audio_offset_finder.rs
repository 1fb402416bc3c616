use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use audio_offset_finder::audio::{Decoder, Dither, FfmpegDecoder, WavDecoder};
use audio_offset_finder::config::AppConfig;
use audio_offset_finder::{AlignmentResult, IncrementalMatcher, OffsetFinder};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "audio_offset_finder",
    version,
    about = "Find the offset of an audio clip within a longer recording"
)]
struct Cli {
    /// JSON configuration file (missing or invalid files fall back to defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Sample rate both inputs are decoded to, in Hz
    #[arg(long, global = true)]
    sr: Option<u32>,
    /// Only the first TRIM seconds of each input are decoded
    #[arg(long, global = true)]
    trim: Option<f64>,
    /// Number of leading query frames matched against the reference
    #[arg(long, global = true)]
    correlation_frames: Option<usize>,
    /// Decoder used for both inputs
    #[arg(long, value_enum, global = true, default_value_t = DecoderKind::Ffmpeg)]
    decoder: DecoderKind,
    /// ffmpeg executable (name on PATH or full path)
    #[arg(long, global = true)]
    ffmpeg: Option<String>,
    /// Seed the dither for reproducible scores
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the offset of one clip within a reference recording
    Find {
        /// Reference recording searched through
        #[arg(long)]
        within: PathBuf,
        /// Clip whose start is located
        #[arg(long = "find-offset-of")]
        find_offset_of: PathBuf,
    },
    /// Decode the reference once and locate every clip in it
    Scan {
        /// Reference recording searched through
        #[arg(long)]
        within: PathBuf,
        /// Clips whose starts are located
        #[arg(required = true)]
        queries: Vec<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DecoderKind {
    /// Any format ffmpeg understands, resampled and downmixed
    Ffmpeg,
    /// WAV files already at the target rate
    Wav,
}

#[derive(Serialize)]
struct ScanReport<'a> {
    query: &'a Path,
    #[serde(flatten)]
    result: AlignmentResult,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli);
    let decoder = build_decoder(cli.decoder, &config);
    let dither = cli.seed.map(Dither::seeded).unwrap_or_default();

    match cli.command {
        Commands::Find {
            within,
            find_offset_of,
        } => run_find(config, decoder, dither, &within, &find_offset_of, cli.json),
        Commands::Scan { within, queries } => {
            run_scan(config, decoder, dither, &within, &queries, cli.json)
        }
    }
}

/// Configuration file (or defaults), then command line overrides
fn build_config(cli: &Cli) -> AppConfig {
    let mut config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    if let Some(sr) = cli.sr {
        config.alignment.sample_rate = sr;
    }
    if let Some(trim) = cli.trim {
        config.alignment.trim_seconds = trim;
    }
    if let Some(frames) = cli.correlation_frames {
        config.alignment.correlation_frames = frames;
    }
    if let Some(program) = &cli.ffmpeg {
        config.decoder.program = program.clone();
    }
    config
}

fn build_decoder(kind: DecoderKind, config: &AppConfig) -> Box<dyn Decoder> {
    match kind {
        DecoderKind::Ffmpeg => Box::new(FfmpegDecoder::from_config(&config.decoder)),
        DecoderKind::Wav => Box::new(WavDecoder::new()),
    }
}

fn run_find(
    config: AppConfig,
    decoder: Box<dyn Decoder>,
    dither: Dither,
    reference: &Path,
    query: &Path,
    json: bool,
) -> Result<ExitCode> {
    let finder = OffsetFinder::with_decoder(config, decoder)
        .context("invalid configuration")?
        .with_dither(dither);
    let result = finder
        .find_offset(reference, query)
        .with_context(|| format!("finding {} in {}", query.display(), reference.display()))?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        print_result(&result);
    }
    Ok(ExitCode::from(0))
}

fn run_scan(
    config: AppConfig,
    decoder: Box<dyn Decoder>,
    dither: Dither,
    reference: &Path,
    queries: &[PathBuf],
    json: bool,
) -> Result<ExitCode> {
    let mut matcher = IncrementalMatcher::with_decoder(reference, config, decoder)
        .context("invalid configuration")?
        .with_dither(dither);
    matcher
        .initialize()
        .with_context(|| format!("loading reference {}", reference.display()))?;

    let mut failures = 0usize;
    for query in queries {
        let result = match matcher.match_query(query) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("Error: {}: {err}", query.display());
                failures += 1;
                continue;
            }
        };

        if json {
            let report = ScanReport { query, result };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", query.display());
            print_result(&result);
        }
    }
    matcher.teardown();

    if failures > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn print_result(result: &AlignmentResult) {
    println!("Offset: {:.3} (seconds)", result.offset_seconds);
    if result.is_reliable() {
        println!("Standard score: {:.2}", result.score);
    } else {
        println!("Standard score: undefined");
    }
}

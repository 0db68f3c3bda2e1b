//! Command-line front end: reads a `.PBP`, runs the extraction pipeline, and reports a
//! summary of what was recovered.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eboot2cue::audio::{FakeCodec, SubprocessCodec};
use eboot2cue::crypto::PassthroughCodecs;
use eboot2cue::{pipeline, CoreError, Config, ExtractionContext};

/// Reconstruct a PSOne Classic `BIN`/`CUE` disc image from a `.PBP` EBOOT package.
#[derive(Parser, Debug)]
#[command(name = "eboot2cue", version, about)]
struct Args {
    /// Path to the input `.PBP` file.
    input: PathBuf,

    /// Directory extracted artifacts are written under (defaults to the input's directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// PGD key override, as 32 hex characters, for titles whose key isn't derivable from
    /// the PGD's own MAC.
    #[arg(long, value_name = "HEX32")]
    key: Option<String>,

    /// Path to an external ATRAC3 decoder binary; audio tracks are skipped without one.
    #[arg(long)]
    codec: Option<PathBuf>,

    /// Path to a standalone `DOCUMENT.DAT` (the game manual), if the title shipped one
    /// separately from the `.PBP`.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Verify the fixed data track's MD5 against the bundled catalog.
    #[arg(long)]
    verify_md5: bool,

    /// Keep intermediate artifacts (`DATA_TRACK.BIN`, `TRASH.BIN`, ...) after extraction.
    #[arg(long)]
    keep_intermediate: bool,

    /// Increase log verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

fn parse_key(hex: &str) -> Option<[u8; 16]> {
    if hex.len() != 32 {
        return None;
    }

    let mut key = [0u8; 16];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(key)
}

fn exit_code_for(err: &CoreError) -> u8 {
    match err {
        CoreError::IoError(_) => 1,
        CoreError::InvalidMagic { .. } => 2,
        CoreError::Truncated { .. } => 3,
        CoreError::DecryptFailed { .. } => 4,
        CoreError::DecompressFailed { .. } => 5,
        CoreError::UnsupportedMode(_) => 6,
        CoreError::UnexpectedMode { .. } => 7,
        CoreError::Mode0NotZero(_) => 8,
        CoreError::OutOfMemory(_) => 9,
        CoreError::BadCueEntry(_) => 10,
        CoreError::UnknownSerial => 11,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let verbosity = args.verbose as i32 - args.quiet as i32;
    let level = match verbosity {
        i32::MIN..=-1 => log::LevelFilter::Error,
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    eboot2cue::crypto::kirk_init();

    let pbp = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("failed to read `{}`: {}", args.input.display(), e);
            return ExitCode::from(exit_code_for(&CoreError::IoError(e)));
        }
    };

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| args.input.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let pgd_key = match args.key.as_deref().map(parse_key) {
        Some(None) => {
            log::error!("--key must be exactly 32 hex characters");
            return ExitCode::from(2);
        }
        Some(Some(k)) => Some(k),
        None => None,
    };

    let config = Config {
        input: args.input.clone(),
        output_dir,
        pgd_key,
        codec_path: args.codec.clone(),
        document_path: args.document.clone(),
        verify_md5: args.verify_md5,
        keep_intermediate: args.keep_intermediate,
    };

    let codec: Box<dyn eboot2cue::audio::AudioCodec> = match &config.codec_path {
        Some(path) => Box::new(SubprocessCodec { binary: path.clone() }),
        None => Box::new(FakeCodec),
    };

    let mut ctx = ExtractionContext::new(
        config.output_dir.clone(),
        Box::new(PassthroughCodecs),
        Box::new(PassthroughCodecs),
        Box::new(PassthroughCodecs),
        codec,
    );

    match pipeline::run(&pbp, &config, &mut ctx) {
        Ok(summary) => {
            for disc in &summary.discs {
                println!(
                    "{} ({}): {} sectors, {} audio tracks recovered, {} skipped",
                    disc.serial,
                    disc.title,
                    disc.sector_counts.total(),
                    disc.audio_tracks_recovered,
                    disc.audio_tracks_skipped,
                );
                println!("  wrote {} / {}", disc.bin_path.display(), disc.cue_path.display());
                match disc.md5_verified {
                    Some(true) => println!("  MD5: OK"),
                    Some(false) => println!("  MD5: MISMATCH"),
                    None => {}
                }
            }
            if ctx.warning_overflow() > 0 {
                println!("{} additional warnings were dropped", ctx.warning_overflow());
            }
            for warning in ctx.warnings() {
                log::warn!("{:?}: {}", warning.kind, warning.details);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("extraction failed: {}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

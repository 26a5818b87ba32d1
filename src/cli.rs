use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use tonecraft::effects::{EqMode, MasterMode, OneClickMaster, PitchMode, SmartEq, SmartPitch};
use tonecraft::export::{self, StaffFormat};
use tonecraft::{AudioError, AudioSession, TranscriptionPipeline};

/// Offline audio post-production tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a smart EQ preset to a WAV file
    Eq(EqArgs),

    /// Apply smart pitch correction to a WAV file
    Pitch(PitchArgs),

    /// Apply one-click mastering to a WAV file
    Master(MasterArgs),

    /// Transcribe a WAV file to MIDI, staff image, or text
    Transcribe(TranscribeArgs),
}

#[derive(Parser)]
struct EqArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    input: PathBuf,

    /// Path for the processed WAV file
    #[arg(required = true)]
    output: PathBuf,

    /// EQ preset: smart, vocal, instrumental, mix, flat, bright, warm
    #[arg(short, long, default_value = "smart", value_parser = parse_eq_mode)]
    mode: EqMode,

    /// Disable curve naturalization
    #[arg(long)]
    plain: bool,

    /// Naturalization seed (random per run when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct PitchArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    input: PathBuf,

    /// Path for the processed WAV file
    #[arg(required = true)]
    output: PathBuf,

    /// Correction mode: smart, aggressive, gentle, adaptive
    #[arg(short, long, default_value = "smart", value_parser = parse_pitch_mode)]
    mode: PitchMode,

    /// Disable expression retention
    #[arg(long)]
    plain: bool,

    /// Naturalization seed (random per run when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct MasterArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    input: PathBuf,

    /// Path for the processed WAV file
    #[arg(required = true)]
    output: PathBuf,

    /// Mastering mode: smart, loud, dynamic, radio, streaming, vinyl
    #[arg(short, long, default_value = "smart", value_parser = parse_master_mode)]
    mode: MasterMode,
}

#[derive(Parser)]
struct TranscribeArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    input: PathBuf,

    /// Output path; format follows the extension (.mid, .png, .svg, .txt)
    #[arg(required = true)]
    output: PathBuf,

    /// Track name embedded in MIDI and text output
    #[arg(short, long, default_value = "Transcription")]
    name: String,
}

fn parse_eq_mode(s: &str) -> Result<EqMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "smart" => Ok(EqMode::Smart),
        "vocal" => Ok(EqMode::Vocal),
        "instrumental" => Ok(EqMode::Instrumental),
        "mix" => Ok(EqMode::Mix),
        "flat" => Ok(EqMode::Flat),
        "bright" => Ok(EqMode::Bright),
        "warm" => Ok(EqMode::Warm),
        other => Err(format!("unknown EQ mode: {}", other)),
    }
}

fn parse_pitch_mode(s: &str) -> Result<PitchMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "smart" => Ok(PitchMode::Smart),
        "aggressive" => Ok(PitchMode::Aggressive),
        "gentle" => Ok(PitchMode::Gentle),
        "adaptive" => Ok(PitchMode::Adaptive),
        other => Err(format!("unknown pitch mode: {}", other)),
    }
}

fn parse_master_mode(s: &str) -> Result<MasterMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "smart" => Ok(MasterMode::Smart),
        "loud" => Ok(MasterMode::Loud),
        "dynamic" => Ok(MasterMode::Dynamic),
        "radio" => Ok(MasterMode::Radio),
        "streaming" => Ok(MasterMode::Streaming),
        "vinyl" => Ok(MasterMode::Vinyl),
        other => Err(format!("unknown mastering mode: {}", other)),
    }
}

/// Per-run seed when the user does not pin one.
fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn seed_arg(plain: bool, seed: Option<u64>) -> Option<u64> {
    if plain {
        None
    } else {
        Some(seed.unwrap_or_else(random_seed))
    }
}

fn process_file(
    input: &Path,
    output: &Path,
    effect: &dyn tonecraft::effects::Effect,
) -> Result<(), AudioError> {
    let mut session = AudioSession::load(input)?;
    if !session.apply_effect(effect) {
        return Err(AudioError::Processing(format!(
            "{} failed to process {}",
            effect.name(),
            input.display()
        )));
    }
    session.save(output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_transcribe_command(args: &TranscribeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = AudioSession::load(&args.input)?;
    let result = TranscriptionPipeline::new().transcribe(session.current());
    println!(
        "Detected {} notes and {} chords",
        result.notes.len(),
        result.chords.len()
    );

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mid" | "midi") => export::write_midi(&result.notes, &args.output, &args.name)?,
        Some("png" | "svg") => {
            let format = StaffFormat::from_path(&args.output)?;
            export::render_staff(&result.notes, &result.chords, &args.output, format)?;
        }
        Some("txt") => export::write_text(&result, &args.output, &args.name)?,
        other => {
            return Err(Box::new(export::ExportError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )))
        }
    }
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Eq(args) => process_file(
            &args.input,
            &args.output,
            &SmartEq {
                mode: args.mode,
                naturalize: seed_arg(args.plain, args.seed),
            },
        )?,
        Commands::Pitch(args) => process_file(
            &args.input,
            &args.output,
            &SmartPitch {
                mode: args.mode,
                naturalize: seed_arg(args.plain, args.seed),
            },
        )?,
        Commands::Master(args) => {
            process_file(&args.input, &args.output, &OneClickMaster { mode: args.mode })?
        }
        Commands::Transcribe(args) => run_transcribe_command(args)?,
    }

    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(err) => {
            eprintln!("\nERROR: {}\n", err);
            if let Some(AudioError::Io(io_err)) = err.downcast_ref::<AudioError>() {
                if io_err.kind() == io::ErrorKind::NotFound {
                    eprintln!("Please check that:");
                    eprintln!("1. The file path is correct");
                    eprintln!("2. The file exists");
                    eprintln!("3. You have permission to read the file");
                }
            }
            process::exit(1);
        }
    }
}

//! tonewav CLI: reads `<frequency> <offset> <duration>` records from stdin and renders them
//! to a mono WAV file. The `tape` subcommand encodes a file as an MSX cassette block instead.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use tonewav::config::{
    Encoding, NormalizeMode, RenderConfig, Waveform, DEFAULT_FRAME_COUNT, DEFAULT_OUTPUT,
    DEFAULT_SAMPLE_RATE,
};
use tonewav::render;
use tonewav::tape::{write_tape, DEFAULT_BAUD, DEFAULT_TAPE_OUTPUT};

#[derive(Parser, Debug)]
#[command(name = "tonewav", version)]
#[command(about = "Additive tone synthesizer. Reads `<freq> <offset> <duration>` records from stdin.")]
struct Cli {
    /// Output WAV file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Buffer length in frames
    #[arg(short = 'n', long, default_value_t = DEFAULT_FRAME_COUNT)]
    frames: usize,

    /// Sample encoding of the output file
    #[arg(long, value_enum, default_value_t = Encoding::Pcm16)]
    encoding: Encoding,

    /// Peak used for normalization
    #[arg(long, value_enum, default_value_t = NormalizeMode::PositivePeak)]
    normalize: NormalizeMode,

    /// Shape used for every tone
    #[arg(long, value_enum, default_value_t = Waveform::Sine)]
    waveform: Waveform,

    /// Read tones from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Suppress the banner and per-tone echo
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a file as an MSX cassette block (long header, then the bytes)
    Tape(TapeArgs),
}

#[derive(Args, Debug)]
struct TapeArgs {
    /// Bytes to encode. Only the header is written when omitted
    data: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, default_value = DEFAULT_TAPE_OUTPUT)]
    output: PathBuf,

    /// Tape speed in baud
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: f64,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Sample encoding of the output file
    #[arg(long, value_enum, default_value_t = Encoding::Pcm8)]
    encoding: Encoding,
}

impl Cli {
    fn config(&self) -> RenderConfig {
        RenderConfig {
            frames: self.frames,
            sample_rate: self.sample_rate,
            output: self.output.clone(),
            encoding: self.encoding,
            normalize: self.normalize,
            waveform: self.waveform,
        }
    }
}

fn run_tape(args: &TapeArgs) -> tonewav::error::Result<()> {
    let data = match &args.data {
        Some(path) => std::fs::read(path)?,
        None => Vec::new(),
    };
    write_tape(&args.output, &data, args.baud, args.sample_rate, args.encoding)?;
    Ok(())
}

fn run(cli: &Cli) -> tonewav::error::Result<()> {
    if let Some(Command::Tape(args)) = &cli.command {
        return run_tape(args);
    }
    let config = cli.config();
    let stdout = io::stdout();
    let mut sink = io::sink();
    let mut out = stdout.lock();
    let status: &mut dyn Write = if cli.quiet { &mut sink } else { &mut out };

    match &cli.input {
        Some(path) => render(&config, BufReader::new(File::open(path)?), status)?,
        None => render(&config, io::stdin().lock(), status)?,
    };
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tonewav: {e}");
            ExitCode::FAILURE
        }
    }
}

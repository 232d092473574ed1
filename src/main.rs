//! Render the demo patch (two-harmonic chord frequency-modulating a 4 Hz
//! carrier) to raw PCM.
//!
//! Run with: cargo run -- out.raw --duration 2 --encoding i16

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};

use tongraph::{harmony, DumpNode, Encoding, FrameRate, Input, ModNode, Modulation, Node};

#[derive(Parser)]
#[command(name = "tongraph")]
#[command(about = "Render a frequency-modulated chord to raw mono PCM", long_about = None)]
struct Cli {
    /// Output file; renders into an anonymous temporary file when omitted
    output: Option<PathBuf>,

    /// Duration in seconds
    #[arg(short, long, default_value = "1.0")]
    duration: f64,

    /// Frame rate in Hz
    #[arg(short, long, default_value = "192000")]
    rate: u32,

    /// Frame encoding: f32 or i16
    #[arg(short, long, default_value = "f32")]
    encoding: Encoding,

    /// Bit depth for integer frames (2-16)
    #[arg(short, long, default_value = "16")]
    bit_depth: u32,

    /// Deviation accumulation strategy of the modulator
    #[arg(short, long, value_enum, default_value = "simple")]
    modulation: ModulationArg,

    /// Fundamental of the modulating chord in Hz
    #[arg(long, default_value = "640.0")]
    fundamental: f64,

    /// Number of harmonics in the modulating chord
    #[arg(long, default_value = "2")]
    harmonics: usize,

    /// Carrier frequency in Hz
    #[arg(long, default_value = "4.0")]
    carrier: f64,

    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModulationArg {
    Simple,
    Dc,
}

impl Cli {
    fn encoding(&self) -> Encoding {
        match self.encoding {
            Encoding::Int16 { .. } => Encoding::Int16 {
                bit_depth: self.bit_depth,
            },
            other => other,
        }
    }

    fn modulation(&self) -> Modulation {
        match self.modulation {
            ModulationArg::Simple => Modulation::Simple,
            ModulationArg::Dc => Modulation::dc_compensated(),
        }
    }
}

fn render(cli: &Cli, output: &mut dyn Write) -> tongraph::Result<usize> {
    let rate = FrameRate::new(cli.rate)?;

    let chord = harmony(rate, cli.fundamental, cli.harmonics)?;
    let mut modulator = ModNode::new(rate, cli.carrier)?.with_modulation(cli.modulation());
    modulator.attach(Input::node(chord))?;

    let mut out = DumpNode::new(rate, cli.encoding())?;
    out.attach(Input::node(modulator))?;

    let frames = out.dump(&mut *output, cli.duration)?;
    output.flush()?;
    Ok(frames)
}

fn run(cli: &Cli) -> tongraph::Result<()> {
    let file = match &cli.output {
        Some(path) => {
            info!(path = %path.display(), "rendering to file");
            File::create(path)?
        }
        None => {
            info!("no output given, rendering to a temporary file");
            tempfile::tempfile()?
        }
    };

    let mut writer = BufWriter::new(file);
    let frames = render(cli, &mut writer)?;
    info!(frames, encoding = %cli.encoding(), "done");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        error!("{e}");
        process::exit(1);
    }
}

//! ps2pdf - convert PostScript and EPS input to PDF.
//!
//! Recognizes the Ghostscript-style subset of flags described in §6.3:
//! paper size, a PDF compatibility level, a quality/device preset, and
//! the conventional `-q`/`-dBATCH`/`-dNOPAUSE` switches, which this
//! pipeline accepts for compatibility but doesn't need to act on since
//! there's no interactive mode to suppress.

use clap::{Parser, ValueEnum};
use ps2pdf::{
    CompatibilityLevel, PaperSize, ProcessingOptions, ProgressEvent, Quality, Summary,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaperSizeArg {
    A4,
    Letter,
    Legal,
    A3,
    A5,
    Executive,
    Custom,
}

impl From<PaperSizeArg> for PaperSize {
    fn from(value: PaperSizeArg) -> Self {
        match value {
            PaperSizeArg::A4 => PaperSize::A4,
            PaperSizeArg::Letter => PaperSize::Letter,
            PaperSizeArg::Legal => PaperSize::Legal,
            PaperSizeArg::A3 => PaperSize::A3,
            PaperSizeArg::A5 => PaperSize::A5,
            PaperSizeArg::Executive => PaperSize::Executive,
            PaperSizeArg::Custom => PaperSize::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompatibilityArg {
    #[value(name = "1.4")]
    Pdf14,
    #[value(name = "1.5")]
    Pdf15,
    #[value(name = "1.6")]
    Pdf16,
    #[value(name = "1.7")]
    Pdf17,
}

impl From<CompatibilityArg> for CompatibilityLevel {
    fn from(value: CompatibilityArg) -> Self {
        match value {
            CompatibilityArg::Pdf14 => CompatibilityLevel::Pdf14,
            CompatibilityArg::Pdf15 => CompatibilityLevel::Pdf15,
            CompatibilityArg::Pdf16 => CompatibilityLevel::Pdf16,
            CompatibilityArg::Pdf17 => CompatibilityLevel::Pdf17,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QualityArg {
    Screen,
    Default,
    Ebook,
    Printer,
    Prepress,
}

impl From<QualityArg> for Quality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Screen => Quality::Screen,
            QualityArg::Default => Quality::Default,
            QualityArg::Ebook => Quality::Ebook,
            QualityArg::Printer => Quality::Printer,
            QualityArg::Prepress => Quality::Prepress,
        }
    }
}

/// Convert PostScript and EPS input to PDF.
#[derive(Parser, Debug)]
#[command(name = "ps2pdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more PostScript/EPS input files, processed in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF path
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Ghostscript device name, accepted for compatibility (§6.3)
    #[arg(long = "device", default_value = "pdfwrite")]
    device: String,

    /// Target paper size
    #[arg(long = "paper-size", value_enum, default_value = "a4")]
    paper_size: PaperSizeArg,

    /// Custom page width in points, used when the paper size isn't one
    /// of the named presets
    #[arg(long = "custom-width")]
    custom_width: Option<f64>,

    /// Custom page height in points
    #[arg(long = "custom-height")]
    custom_height: Option<f64>,

    /// PDF compatibility level written into the file header
    #[arg(long = "compatibility-level", value_enum, default_value = "1.7")]
    compatibility_level: CompatibilityArg,

    /// Rendering quality preset; informational only (§6.3)
    #[arg(long = "quality", value_enum, default_value = "default")]
    quality: QualityArg,

    /// Suppress progress output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Accepted for Ghostscript compatibility; this pipeline has no
    /// interactive mode to batch through
    #[arg(long = "batch")]
    batch: bool,

    /// Accepted for Ghostscript compatibility
    #[arg(long = "no-pause")]
    no_pause: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = ProcessingOptions {
        input_files: args.inputs,
        output_file: args.output,
        device_name: args.device,
        paper_size: args.paper_size.into(),
        custom_width_points: args.custom_width,
        custom_height_points: args.custom_height,
        compatibility_level: args.compatibility_level.into(),
        quality: args.quality.into(),
        quiet: args.quiet,
        batch_mode: args.batch,
        no_pause: args.no_pause,
    };

    let quiet = options.quiet;
    let mut progress = move |event: ProgressEvent| {
        if quiet {
            return;
        }
        match event {
            ProgressEvent::FileStarted { index, total, path } => {
                eprintln!("[{}/{}] {}", index + 1, total, path.display());
            }
            ProgressEvent::FileFinished { .. } => {}
            ProgressEvent::SerializationStarted => eprintln!("writing output..."),
            ProgressEvent::Done => {}
        }
    };

    match ps2pdf::Processor::process(&options, &mut progress, None) {
        Ok(Summary { pages_written, bytes_written, warnings }) => {
            if !options.quiet {
                eprintln!("{pages_written} page(s), {bytes_written} bytes written");
                for warning in &warnings {
                    eprintln!("warning: {warning}");
                }
            }
        }
        Err(err) => {
            eprintln!("ps2pdf: {err}");
            std::process::exit(1);
        }
    }
}

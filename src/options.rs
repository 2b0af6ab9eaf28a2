//! `ProcessingOptions` and the small enums that back them (§6.3).

use std::path::PathBuf;

/// Standard paper sizes, plus `Custom` which is paired with
/// `custom_width_points`/`custom_height_points` on `ProcessingOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
    A3,
    A5,
    Executive,
    Custom,
}

impl PaperSize {
    /// `(width_pts, height_pts)` for every variant except `Custom`, whose
    /// dimensions instead come from `ProcessingOptions::custom_*_points`.
    pub fn dimensions_pts(self) -> Option<(f64, f64)> {
        match self {
            PaperSize::A4 => Some((595.276, 841.890)),
            PaperSize::Letter => Some((612.0, 792.0)),
            PaperSize::Legal => Some((612.0, 1008.0)),
            PaperSize::A3 => Some((841.890, 1190.551)),
            PaperSize::A5 => Some((419.528, 595.276)),
            PaperSize::Executive => Some((522.0, 756.0)),
            PaperSize::Custom => None,
        }
    }
}

/// PDF minor version written in the file header (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityLevel {
    Pdf14,
    Pdf15,
    Pdf16,
    #[default]
    Pdf17,
}

impl CompatibilityLevel {
    pub fn minor_digit(self) -> u8 {
        match self {
            CompatibilityLevel::Pdf14 => 4,
            CompatibilityLevel::Pdf15 => 5,
            CompatibilityLevel::Pdf16 => 6,
            CompatibilityLevel::Pdf17 => 7,
        }
    }
}

/// Informational rendering intent; influences no emitted bytes in the
/// base emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Screen,
    #[default]
    Default,
    Ebook,
    Printer,
    Prepress,
}

/// The recognized subset of processing options.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    pub input_files: Vec<PathBuf>,
    pub output_file: PathBuf,
    pub device_name: String,
    pub paper_size: PaperSize,
    pub custom_width_points: Option<f64>,
    pub custom_height_points: Option<f64>,
    pub compatibility_level: CompatibilityLevel,
    pub quality: Quality,
    pub quiet: bool,
    pub batch_mode: bool,
    pub no_pause: bool,
}

impl ProcessingOptions {
    /// Resolve `paper_size` (and, for `Custom`, the `custom_*_points`
    /// fields) to concrete page dimensions in points.
    pub fn paper_dimensions_pts(&self) -> (f64, f64) {
        self.paper_size.dimensions_pts().unwrap_or((
            self.custom_width_points.unwrap_or(595.276),
            self.custom_height_points.unwrap_or(841.890),
        ))
    }
}

/// Successful outcome of `Processor::process`.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub pages_written: usize,
    pub bytes_written: u64,
    pub warnings: Vec<String>,
}

/// Progress events emitted once per input file begin/end and at
/// serializer start.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    FileStarted { index: usize, total: usize, path: PathBuf },
    FileFinished { index: usize, total: usize, path: PathBuf },
    SerializationStarted,
    Done,
}

/// Callback consuming `ProgressEvent`s. The default is a no-op.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

/// A `ProgressSink` that ignores every event.
#[derive(Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

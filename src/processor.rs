//! `Processor`: the façade that turns `ProcessingOptions` into one
//! serialized PDF, driving the interpreter over each input file in
//! order and reporting progress along the way.

use crate::errors::{PsToPdfError, Result};
use crate::interpreter::Interpreter;
use crate::options::{ProcessingOptions, ProgressEvent, ProgressSink, Summary};
use crate::pdf::PdfDocument;
use std::fs;
use std::io::BufWriter;
use tracing::{info, info_span};

/// Set by the caller between files (and checked before the final
/// serialization step) to support cooperative cancellation.
/// `AtomicBool` rather than a plain flag so it can be shared across
/// threads without extra synchronization machinery.
pub type CancelFlag = std::sync::atomic::AtomicBool;

pub struct Processor;

impl Processor {
    /// Runs the full pipeline: validates `options`, interprets every
    /// input file in order, and serializes the combined pages to
    /// `options.output_file`.
    pub fn process(
        options: &ProcessingOptions,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelFlag>,
    ) -> Result<Summary> {
        if options.input_files.is_empty() {
            return Err(PsToPdfError::InvalidArgument(
                "no input files given".to_string(),
            ));
        }
        if options.device_name != "pdfwrite" {
            return Err(PsToPdfError::InvalidArgument(format!(
                "unsupported device `{}`; this core only renders for `pdfwrite`",
                options.device_name
            )));
        }

        let (paper_w, paper_h) = options.paper_dimensions_pts();
        let total = options.input_files.len();
        let mut document = PdfDocument::new();
        let mut pages_written = 0usize;
        let mut warnings = Vec::new();

        for (index, path) in options.input_files.iter().enumerate() {
            if is_cancelled(cancel) {
                return Err(PsToPdfError::Cancelled);
            }

            sink.on_progress(ProgressEvent::FileStarted {
                index,
                total,
                path: path.clone(),
            });

            let span = info_span!("interpret_file", file = %path.display());
            let _enter = span.enter();

            if !path.exists() {
                return Err(PsToPdfError::InputNotFound(path.clone()));
            }
            let bytes = fs::read(path)
                .map_err(|source| PsToPdfError::InputUnreadable { path: path.clone(), source })?;

            let interpreted = Interpreter::new(path, paper_w, paper_h).run(&bytes)?;
            info!(pages = interpreted.pages.len(), "interpreted file");

            for page in &interpreted.pages {
                document.add_page(page);
                pages_written += 1;
            }
            warnings.extend(interpreted.warnings);

            drop(_enter);
            sink.on_progress(ProgressEvent::FileFinished {
                index,
                total,
                path: path.clone(),
            });
        }

        if is_cancelled(cancel) {
            return Err(PsToPdfError::Cancelled);
        }

        sink.on_progress(ProgressEvent::SerializationStarted);
        let bytes_written = write_output(options, document)?;
        sink.on_progress(ProgressEvent::Done);

        Ok(Summary { pages_written, bytes_written, warnings })
    }
}

fn is_cancelled(cancel: Option<&CancelFlag>) -> bool {
    cancel
        .map(|flag| flag.load(std::sync::atomic::Ordering::Relaxed))
        .unwrap_or(false)
}

fn write_output(options: &ProcessingOptions, document: PdfDocument) -> Result<u64> {
    let file = fs::File::create(&options.output_file).map_err(PsToPdfError::OutputUnwritable)?;
    let mut writer = CountingFile { inner: BufWriter::new(file), bytes: 0 };
    document
        .write(&mut writer, options.compatibility_level.minor_digit())
        .map_err(PsToPdfError::OutputUnwritable)?;
    use std::io::Write;
    writer.inner.flush().map_err(PsToPdfError::OutputUnwritable)?;
    Ok(writer.bytes)
}

/// Tracks bytes written to the output file so `Summary::bytes_written`
/// doesn't need a second pass over the finished file.
struct CountingFile<W> {
    inner: W,
    bytes: u64,
}

impl<W: std::io::Write> std::io::Write for CountingFile<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompatibilityLevel, NoopProgressSink, PaperSize};
    use std::io::Write as _;

    fn opts(inputs: Vec<std::path::PathBuf>, output: std::path::PathBuf) -> ProcessingOptions {
        ProcessingOptions {
            input_files: inputs,
            output_file: output,
            device_name: "pdfwrite".to_string(),
            paper_size: PaperSize::A4,
            custom_width_points: None,
            custom_height_points: None,
            compatibility_level: CompatibilityLevel::Pdf17,
            quality: Default::default(),
            quiet: true,
            batch_mode: true,
            no_pause: true,
        }
    }

    #[test]
    fn empty_input_list_is_an_invalid_argument() {
        let o = opts(vec![], std::env::temp_dir().join("never-written.pdf"));
        let mut sink = NoopProgressSink;
        let err = Processor::process(&o, &mut sink, None).unwrap_err();
        assert!(matches!(err, PsToPdfError::InvalidArgument(_)));
    }

    #[test]
    fn unsupported_device_is_an_invalid_argument() {
        let mut o = opts(
            vec![std::env::temp_dir().join("does-not-exist-ps2pdf-test.ps")],
            std::env::temp_dir().join("never-written-device.pdf"),
        );
        o.device_name = "ljet4".to_string();
        let mut sink = NoopProgressSink;
        let err = Processor::process(&o, &mut sink, None).unwrap_err();
        assert!(matches!(err, PsToPdfError::InvalidArgument(_)));
    }

    #[test]
    fn missing_input_file_is_reported() {
        let o = opts(
            vec![std::env::temp_dir().join("does-not-exist-ps2pdf-test.ps")],
            std::env::temp_dir().join("never-written-2.pdf"),
        );
        let mut sink = NoopProgressSink;
        let err = Processor::process(&o, &mut sink, None).unwrap_err();
        assert!(matches!(err, PsToPdfError::InputNotFound(_)));
    }

    #[test]
    fn single_file_round_trip_produces_one_page() {
        let dir = std::env::temp_dir();
        let input = dir.join("ps2pdf-processor-test-input.ps");
        let output = dir.join("ps2pdf-processor-test-output.pdf");
        let mut f = fs::File::create(&input).unwrap();
        f.write_all(b"%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\n0 0 moveto 10 10 lineto stroke showpage\n")
            .unwrap();
        drop(f);

        let o = opts(vec![input.clone()], output.clone());
        let mut sink = NoopProgressSink;
        let summary = Processor::process(&o, &mut sink, None).unwrap();
        assert_eq!(summary.pages_written, 1);
        assert!(summary.bytes_written > 0);

        let written = fs::read(&output).unwrap();
        assert!(written.starts_with(b"%PDF-1.7\n"));

        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
    }

    #[test]
    fn cancellation_before_any_file_is_reported() {
        let dir = std::env::temp_dir();
        let input = dir.join("ps2pdf-processor-test-cancel.ps");
        fs::write(&input, b"%!PS-Adobe-3.0\nshowpage\n").unwrap();
        let o = opts(vec![input.clone()], dir.join("ps2pdf-processor-test-cancel.pdf"));
        let flag = CancelFlag::new(true);
        let mut sink = NoopProgressSink;
        let err = Processor::process(&o, &mut sink, Some(&flag)).unwrap_err();
        assert!(matches!(err, PsToPdfError::Cancelled));
        let _ = fs::remove_file(&input);
    }
}

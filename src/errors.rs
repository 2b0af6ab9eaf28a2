//! Error types for the PostScript-to-PDF conversion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type surfaced by the processor façade.
#[derive(Error, Debug)]
pub enum PsToPdfError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("could not read input {}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: tokenize error: {msg}", .path.display())]
    TokenizeError {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("{}:{line}: interpreter error: {msg}", .path.display())]
    InterpreterError {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("graphics state stack overflow (depth > {max})")]
    StackOverflow { max: usize },

    #[error("could not write output: {0}")]
    OutputUnwritable(#[source] std::io::Error),

    #[error("processing cancelled")]
    Cancelled,
}

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, PsToPdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreter_error_carries_path_and_line_in_its_message() {
        // The interpreter's own local-recovery policy never constructs this
        // variant (operand-stack underflow degrades to a warning instead);
        // it exists for forward compatibility, so it's exercised directly.
        let err = PsToPdfError::InterpreterError {
            path: "input.ps".into(),
            line: 42,
            msg: "operand stack underflow".to_string(),
        };
        assert_eq!(err.to_string(), "input.ps:42: interpreter error: operand stack underflow");
    }

    #[test]
    fn stack_overflow_message_reports_the_bound() {
        let err = PsToPdfError::StackOverflow { max: 256 };
        assert_eq!(err.to_string(), "graphics state stack overflow (depth > 256)");
    }
}

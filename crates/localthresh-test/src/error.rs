//! Regression harness errors

use thiserror::Error;

/// Failure of the harness itself, as opposed to a failed check
#[derive(Debug, Error)]
pub enum TestError {
    /// An output image could not be written to the regout directory
    #[error("cannot write regression output '{path}': {message}")]
    ImageWrite { path: String, message: String },

    /// Copying or reading a golden file failed
    #[error("golden file access failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type TestResult<T> = Result<T, TestError>;

//! Error type shared by the tracker, the reporter and the output sinks.

use std::{error, fmt, io};

/// Convenience alias used throughout the crate.
pub type Result<T, E = ProgressError> = std::result::Result<T, E>;

/// Everything that can go wrong while tracking or rendering progress.
///
/// Overrunning the total step count is deliberately *not* an error: extra
/// increments are accepted and simply produce no output.
#[derive(Debug)]
#[non_exhaustive]
pub enum ProgressError {
    /// A tracker was constructed with a total of zero steps.
    InvalidTotal,

    /// A remaining-time estimate was requested before any step completed.
    NoStepsTaken,

    /// The output sink failed to erase or write a line.
    Io(io::Error),
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTotal => f.write_str("total step count must be greater than zero"),
            Self::NoStepsTaken => {
                f.write_str("time remaining is undefined until at least one step has completed")
            }
            Self::Io(e) => write!(f, "failed to write progress output: {e}"),
        }
    }
}

impl error::Error for ProgressError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProgressError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

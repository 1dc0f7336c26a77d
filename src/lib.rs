//! # `step_progress`
//!
//! Thread-safe, single-line progress reporting for command-line tools.
//!
//! `step_progress` counts completed steps against a known total and redraws one line of
//! terminal output per step. It is designed to be:
//!
//! * **Concurrent**: a [`ProgressReporter`] is cheap to clone ([`Arc`](std::sync::Arc)-based)
//!   and every increment, including its output, runs under one lock. Any number of workers
//!   can share a reporter without lost steps or a duplicated completion message.
//! * **Template-driven**: lines are rendered from `:name` templates over a fixed set of
//!   built-in tokens plus caller-supplied ones.
//! * **Testable**: output goes through an [`OutputSink`]; [`CaptureSink`] records every
//!   call for assertions.
//!
//! ```
//! use step_progress::{CaptureSink, ProgressConfig, ProgressReporter};
//!
//! let sink = CaptureSink::new();
//! let progress = ProgressReporter::with_sink(2, ProgressConfig::default(), sink.clone())?;
//! progress.increment()?;
//! progress.increment()?;
//!
//! assert_eq!(sink.lines()[1], "Process complete");
//! # Ok::<(), step_progress::ProgressError>(())
//! ```
//!
//! ## Modules
//!
//! * [`config`]: [`ProgressConfig`], the look of a progress line.
//! * [`drive`]: Helpers that run a step function over a sequence, sequentially or in parallel.
//! * [`error`]: [`ProgressError`] and the crate [`Result`] alias.
//! * [`prompt`]: Masked password prompt.
//! * [`reporter`]: [`ProgressReporter`], the serialized increment-and-render handle.
//! * [`sink`]: [`OutputSink`] and its terminal and capturing implementations.
//! * [`template`]: [`Tokens`] and `:name` substitution.
//! * [`tracker`]: [`ProgressTracker`], the step counter and its derived metrics.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod drive;
pub mod error;
pub mod prompt;
pub mod reporter;
pub mod sink;
pub mod template;
pub mod tracker;

pub use config::ProgressConfig;
pub use drive::{ReportIteratorExt, drive_parallel, drive_sequence, drive_sequence_with};
pub use error::{ProgressError, Result};
pub use reporter::ProgressReporter;
pub use sink::{CaptureSink, OutputSink, SinkEvent, TermSink};
pub use template::{Tokens, substitute};
pub use tracker::{ProgressSnapshot, ProgressTracker, ReportState};

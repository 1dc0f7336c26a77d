//! Serialized increment-and-render on top of a [`ProgressTracker`].
//!
//! A [`ProgressReporter`] is a cheap, cloneable handle. All clones share one tracker and
//! one output sink behind a single [`Mutex`](parking_lot::Mutex), and every
//! [`increment`](ProgressReporter::increment_with) holds that lock from the token merge
//! to the final write. Concurrent workers therefore never lose a step, never both see
//! the completed state, and never interleave partial lines.
//!
//! # Render rules
//!
//! Evaluated after each increment:
//!
//! * **Running**: erase the previous line, render the format followed by a space.
//! * **Completed**: erase the previous line, render the completion message if one is
//!   configured.
//! * **Finished**: render nothing. Extra increments are tolerated and stay silent.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    config::ProgressConfig,
    error::Result,
    sink::{OutputSink, TermSink},
    template::{Tokens, substitute},
    tracker::{ProgressSnapshot, ProgressTracker, ReportState},
};

const LOG_TARGET: &str = "step_progress::reporter";

/// A thread-safe, cloneable handle that reports progress one line at a time.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    tracker: ProgressTracker,
    sink: Box<dyn OutputSink>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ProgressReporter")
            .field("step", &snapshot.step())
            .field("total", &snapshot.total())
            .field("state", &snapshot.state())
            .finish()
    }
}

impl ProgressReporter {
    /// Creates a reporter that draws on standard output.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidTotal`](crate::ProgressError::InvalidTotal) if
    /// `total_steps` is zero.
    pub fn new(total_steps: u64, config: ProgressConfig) -> Result<Self> {
        Self::with_sink(total_steps, config, TermSink::stdout())
    }

    /// Creates a reporter that draws on `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidTotal`](crate::ProgressError::InvalidTotal) if
    /// `total_steps` is zero.
    pub fn with_sink(
        total_steps: u64,
        config: ProgressConfig,
        sink: impl OutputSink + 'static,
    ) -> Result<Self> {
        let tracker = ProgressTracker::new(total_steps, config)?;
        log::debug!(target: LOG_TARGET, "Tracking {total_steps} steps");

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                tracker,
                sink: Box::new(sink),
            })),
        })
    }

    /// Records one completed step and redraws.
    ///
    /// # Errors
    ///
    /// Propagates sink failures as [`ProgressError::Io`](crate::ProgressError::Io).
    pub fn increment(&self) -> Result<()> {
        self.increment_with(&Tokens::new())
    }

    /// Merges `extra` into the reporter's tokens, records one completed step and redraws.
    ///
    /// Merged tokens override built-in tokens of the same name and persist into every
    /// later render until overwritten again.
    ///
    /// # Errors
    ///
    /// Propagates sink failures as [`ProgressError::Io`](crate::ProgressError::Io).
    pub fn increment_with(&self, extra: &Tokens) -> Result<()> {
        let mut inner = self.inner.lock();
        let Inner { tracker, sink } = &mut *inner;

        tracker.merge_tokens(extra);
        tracker.increment();

        let line = match tracker.state() {
            ReportState::Finished => {
                let overrun = tracker.current_step() - tracker.total_steps();
                if overrun == 1 {
                    log::debug!(target: LOG_TARGET, "Finished, further increments are ignored");
                } else {
                    log::trace!(target: LOG_TARGET, "Ignoring increment {overrun} past the total");
                }
                return Ok(());
            }
            ReportState::Completed => match tracker.config().complete_message() {
                Some(message) => {
                    log::debug!(
                        target: LOG_TARGET,
                        "Completed {} steps in {:.3}s",
                        tracker.total_steps(),
                        tracker.time_elapsed().as_secs_f64()
                    );
                    Some(substitute(message, &tracker.tokens()?))
                }
                None => None,
            },
            ReportState::Running => {
                let mut line = substitute(tracker.config().format(), &tracker.tokens()?);
                line.push(' ');
                log::trace!(
                    target: LOG_TARGET,
                    "Step {}/{}",
                    tracker.current_step(),
                    tracker.total_steps()
                );
                Some(line)
            }
        };

        sink.erase_last_line()?;
        if let Some(line) = line {
            sink.write_line(&line)?;
        }
        Ok(())
    }

    /// Current state relative to the total.
    #[must_use]
    pub fn state(&self) -> ReportState {
        self.inner.lock().tracker.state()
    }

    /// Steps recorded so far.
    #[must_use]
    pub fn current_step(&self) -> u64 {
        self.inner.lock().tracker.current_step()
    }

    /// Total step count.
    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.inner.lock().tracker.total_steps()
    }

    /// Integer percentage complete.
    #[must_use]
    pub fn percent_complete(&self) -> u64 {
        self.inner.lock().tracker.percent_complete()
    }

    /// Accumulated extra tokens.
    #[must_use]
    pub fn extra_tokens(&self) -> Tokens {
        self.inner.lock().tracker.config().extra_tokens().clone()
    }

    /// Owned copy of the counters, taken under the lock.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.inner.lock().tracker.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use super::ProgressReporter;
    use crate::{
        ProgressConfig, ProgressError, ReportState, Tokens,
        sink::{CaptureSink, SinkEvent},
    };

    fn reporter(total: u64, config: ProgressConfig) -> (ProgressReporter, CaptureSink) {
        let sink = CaptureSink::new();
        let reporter = ProgressReporter::with_sink(total, config, sink.clone()).unwrap();
        (reporter, sink)
    }

    /// Default Four-Step Run
    /// Three in-progress lines at 25/50/75% with 6/12/18 filled cells, then the
    /// completion message, each preceded by an erase.
    #[test]
    fn test_four_steps_default_config() {
        let (p, sink) = reporter(4, ProgressConfig::default());
        for _ in 0..4 {
            p.increment().unwrap();
        }

        let fill = |n: usize| format!("{}{}", "=".repeat(n), ".".repeat(25 - n));
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Erase,
                SinkEvent::Line(format!("Progress |{}| 25% complete  ", fill(6))),
                SinkEvent::Erase,
                SinkEvent::Line(format!("Progress |{}| 50% complete  ", fill(12))),
                SinkEvent::Erase,
                SinkEvent::Line(format!("Progress |{}| 75% complete  ", fill(18))),
                SinkEvent::Erase,
                SinkEvent::Line("Process complete".into()),
            ]
        );
        assert_eq!(p.state(), ReportState::Completed);
    }

    /// Single Step
    /// A one-step run renders only the completion message.
    #[test]
    fn test_single_step() {
        let (p, sink) = reporter(1, ProgressConfig::default());
        p.increment().unwrap();

        assert_eq!(sink.lines(), vec!["Process complete".to_owned()]);
    }

    /// Overrun Is Silent
    /// The step after completion and every later one neither fail nor render.
    #[test]
    fn test_overrun_is_silent() {
        let (p, sink) = reporter(2, ProgressConfig::default());
        p.increment().unwrap();
        p.increment().unwrap();
        let rendered = sink.events().len();

        for _ in 0..5 {
            p.increment().unwrap();
        }

        assert_eq!(sink.events().len(), rendered);
        assert_eq!(p.state(), ReportState::Finished);
        assert_eq!(p.current_step(), 7);
    }

    /// Disabled Completion Message
    /// The final step erases the bar and writes nothing.
    #[test]
    fn test_without_complete_message() {
        let (p, sink) = reporter(2, ProgressConfig::new().without_complete_message());
        p.increment().unwrap();
        p.increment().unwrap();

        let events = sink.events();
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(events.last(), Some(&SinkEvent::Erase));
    }

    /// Completion Message Tokens
    /// The completion message is a template too.
    #[test]
    fn test_complete_message_substitution() {
        let config =
            ProgressConfig::new().with_complete_message(":title done (:step/:total_steps)");
        let (p, sink) = reporter(1, config);
        p.increment().unwrap();

        assert_eq!(sink.lines(), vec!["Progress done (1/1)".to_owned()]);
    }

    /// Token Overlay
    /// Extra tokens beat built-ins for the call that supplies them and persist after.
    #[test]
    fn test_extra_tokens_override_and_persist() {
        let config = ProgressConfig::new().with_format(":title :file :percent_complete");
        let (p, sink) = reporter(4, config);

        p.increment_with(&Tokens::new().with("file", "a.txt").with("title", "Copying"))
            .unwrap();
        p.increment().unwrap();
        p.increment_with(&Tokens::new().with("file", "c.txt")).unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "Copying a.txt 25 ".to_owned(),
                "Copying a.txt 50 ".to_owned(),
                "Copying c.txt 75 ".to_owned(),
            ]
        );
        assert_eq!(p.extra_tokens().get("file"), Some("c.txt"));
    }

    /// Zero Total
    /// Construction fails before anything is drawn.
    #[test]
    fn test_zero_total() {
        let err = ProgressReporter::with_sink(0, ProgressConfig::default(), CaptureSink::new())
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidTotal));
    }

    /// Concurrent Increments
    /// Many threads released at once produce exactly one completion render and no lost
    /// steps.
    #[test]
    fn test_concurrent_increments() {
        const WORKERS: usize = 32;

        let (p, sink) = reporter(WORKERS as u64, ProgressConfig::default());
        let barrier = Barrier::new(WORKERS);

        thread::scope(|s| {
            for _ in 0..WORKERS {
                s.spawn(|| {
                    barrier.wait();
                    p.increment().unwrap();
                });
            }
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), WORKERS);
        assert_eq!(lines.iter().filter(|l| *l == "Process complete").count(), 1);
        assert_eq!(lines.last().map(String::as_str), Some("Process complete"));
        assert_eq!(p.current_step(), WORKERS as u64);

        // Every erase is immediately followed by its own line.
        let events = sink.events();
        for pair in events.chunks(2) {
            assert_eq!(pair[0], SinkEvent::Erase);
            assert!(matches!(pair[1], SinkEvent::Line(_)));
        }
    }
}

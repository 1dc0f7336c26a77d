//! Step counting and the metrics derived from it.
//!
//! [`ProgressTracker`] is plain, single-owner state: it counts steps against a fixed
//! total and derives everything a progress line shows (percentage, bar, elapsed and
//! remaining time). It does no locking and no output; the
//! [`ProgressReporter`](crate::ProgressReporter) wraps it in a mutex and decides when
//! to draw.
//!
//! # Snapshots
//!
//! [`ProgressTracker::snapshot`] returns a [`ProgressSnapshot`], an owned copy of the
//! counters at one instant that can be inspected without holding any lock.

use std::time::Duration;

use compact_str::{CompactString, format_compact};
use web_time::Instant;

use crate::{
    config::ProgressConfig,
    error::{ProgressError, Result},
    template::{Tokens, builtin},
};

/// Where a tracker stands relative to its total.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportState {
    /// Fewer steps than the total have completed.
    Running,
    /// Exactly the total has completed; the completion message belongs to this step.
    Completed,
    /// More steps than the total were reported. Nothing renders in this state.
    Finished,
}

/// Counts completed steps against a fixed total.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    total: u64,
    current: u64,
    start: Instant,
    config: ProgressConfig,
}

impl ProgressTracker {
    /// Creates a tracker for `total_steps` units of work.
    ///
    /// The clock starts now unless the configuration carries an explicit start time.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidTotal`] if `total_steps` is zero.
    pub fn new(total_steps: u64, config: ProgressConfig) -> Result<Self> {
        if total_steps == 0 {
            return Err(ProgressError::InvalidTotal);
        }

        Ok(Self {
            total: total_steps,
            current: 0,
            start: config.start_time().unwrap_or_else(Instant::now),
            config,
        })
    }

    /// Records one completed step.
    pub const fn increment(&mut self) {
        self.current = self.current.saturating_add(1);
    }

    /// Total step count.
    #[must_use]
    pub const fn total_steps(&self) -> u64 {
        self.total
    }

    /// Steps completed so far.
    #[must_use]
    pub const fn current_step(&self) -> u64 {
        self.current
    }

    /// Steps still to go; zero once the total is reached.
    #[must_use]
    pub const fn steps_remaining(&self) -> u64 {
        self.total.saturating_sub(self.current)
    }

    /// The instant timing is measured from.
    #[must_use]
    pub const fn start_time(&self) -> Instant {
        self.start
    }

    /// The rendering configuration.
    #[must_use]
    pub const fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Overlays `extra` onto the configured extra tokens. Later calls win.
    pub fn merge_tokens(&mut self, extra: &Tokens) {
        self.config.extra_tokens_mut().merge(extra);
    }

    /// Current state relative to the total.
    #[must_use]
    pub const fn state(&self) -> ReportState {
        if self.current < self.total {
            ReportState::Running
        } else if self.current == self.total {
            ReportState::Completed
        } else {
            ReportState::Finished
        }
    }

    // ========================================================================
    // Derived Metrics
    // ========================================================================

    /// Integer percentage of steps completed, truncated.
    #[must_use]
    pub const fn percent_complete(&self) -> u64 {
        percent(self.current, self.total)
    }

    /// Wall-clock time since the start instant.
    #[must_use]
    pub fn time_elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Estimates the time to completion from the average time per step so far.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::NoStepsTaken`] before the first step, when there is no
    /// average to extrapolate from.
    ///
    /// Estimates too large for a [`Duration`] saturate at [`Duration::MAX`].
    pub fn time_remaining(&self) -> Result<Duration> {
        if self.current == 0 {
            return Err(ProgressError::NoStepsTaken);
        }

        Ok(estimate(
            self.time_elapsed(),
            self.current,
            self.steps_remaining(),
        ))
    }

    /// Draws the bar: one fill string per completed cell, padded with the empty string
    /// to exactly `bar_width` cells.
    #[must_use]
    pub fn render_bar(&self) -> String {
        let width = self.config.bar_width();
        let pct = u128::from(self.percent_complete().min(100));
        let filled = usize::try_from(width as u128 * pct / 100)
            .unwrap_or(width)
            .min(width);

        let mut bar = self.config.progress_char().repeat(filled);
        bar.push_str(&self.config.incomplete_char().repeat(width - filled));
        bar
    }

    /// Builds the built-in tokens and overlays the extra tokens on top.
    ///
    /// # Errors
    ///
    /// Fails with [`ProgressError::NoStepsTaken`] before the first step, because
    /// `:time_remaining` cannot be computed yet.
    pub fn tokens(&self) -> Result<Tokens> {
        let mut tokens = Tokens::new()
            .with(builtin::TITLE, self.config.title())
            .with(builtin::PERCENT_COMPLETE, self.percent_complete())
            .with(builtin::PROGRESS_BAR, self.render_bar())
            .with(builtin::STEP, self.current)
            .with(builtin::STEPS_REMAINING, self.steps_remaining())
            .with(builtin::TOTAL_STEPS, self.total)
            .with(builtin::TIME_ELAPSED, seconds(self.time_elapsed()))
            .with(builtin::TIME_REMAINING, seconds(self.time_remaining()?));

        tokens.merge(self.config.extra_tokens());
        Ok(tokens)
    }

    /// Creates an owned snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.into()
    }
}

/// `step * 100 / total` without intermediate overflow.
#[allow(clippy::cast_possible_truncation)]
const fn percent(step: u64, total: u64) -> u64 {
    let pct = step as u128 * 100 / total as u128;
    if pct > u64::MAX as u128 {
        u64::MAX
    } else {
        pct as u64
    }
}

/// Average time per completed step, extrapolated over `remaining` steps.
#[allow(clippy::cast_precision_loss)]
fn estimate(elapsed: Duration, done: u64, remaining: u64) -> Duration {
    let secs = elapsed.as_secs_f64() / done as f64 * remaining as f64;
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn seconds(duration: Duration) -> CompactString {
    format_compact!("{:.2}s", duration.as_secs_f64())
}

/// A plain-data copy of a tracker's counters at a specific point in time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProgressSnapshot {
    step: u64,
    total: u64,
    elapsed: Duration,
    state: ReportState,
}

impl From<&ProgressTracker> for ProgressSnapshot {
    fn from(tracker: &ProgressTracker) -> Self {
        Self {
            step: tracker.current,
            total: tracker.total,
            elapsed: tracker.time_elapsed(),
            state: tracker.state(),
        }
    }
}

impl ProgressSnapshot {
    /// Steps completed.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Total step count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Elapsed time when the snapshot was taken.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// State when the snapshot was taken.
    #[must_use]
    pub const fn state(&self) -> ReportState {
        self.state
    }

    /// Integer percentage, truncated.
    #[must_use]
    pub const fn percent(&self) -> u64 {
        percent(self.step, self.total)
    }

    /// Remaining-time estimate, or `None` before the first step.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.step == 0 {
            return None;
        }

        Some(estimate(
            self.elapsed,
            self.step,
            self.total.saturating_sub(self.step),
        ))
    }
}

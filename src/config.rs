//! Rendering configuration for a [`ProgressReporter`](crate::ProgressReporter).
//!
//! [`ProgressConfig::default`] reproduces the classic single-line look:
//!
//! ```text
//! Progress |======...................| 24% complete
//! ```
//!
//! Every field can be replaced through the fluent `with_*` methods. With the `serde`
//! feature enabled the configuration (minus the start time) can be loaded from a tool's
//! own settings file; missing fields fall back to their defaults.

use compact_str::CompactString;
use web_time::Instant;

use crate::template::Tokens;

/// Default title token value.
pub const DEFAULT_TITLE: &str = "Progress";
/// Default bar width in cells.
pub const DEFAULT_BAR_WIDTH: usize = 25;
/// Default in-progress format.
pub const DEFAULT_FORMAT: &str = ":title |:progress_bar| :percent_complete% complete ";
/// Default completion message.
pub const DEFAULT_COMPLETE_MESSAGE: &str = "Process complete";

/// How a progress line looks and what it says when the work is done.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProgressConfig {
    title: CompactString,
    bar_width: usize,
    progress_char: CompactString,
    incomplete_char: CompactString,
    format: CompactString,
    complete_message: Option<CompactString>,
    extra_tokens: Tokens,

    #[cfg_attr(feature = "serde", serde(skip))]
    start: Option<Instant>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            bar_width: DEFAULT_BAR_WIDTH,
            progress_char: "=".into(),
            incomplete_char: ".".into(),
            format: DEFAULT_FORMAT.into(),
            complete_message: Some(DEFAULT_COMPLETE_MESSAGE.into()),
            extra_tokens: Tokens::new(),
            start: None,
        }
    }
}

impl ProgressConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of the `:title` token.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<CompactString>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the number of cells the bar occupies.
    #[must_use]
    pub const fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Sets the string drawn for each completed cell.
    #[must_use]
    pub fn with_progress_char(mut self, fill: impl Into<CompactString>) -> Self {
        self.progress_char = fill.into();
        self
    }

    /// Sets the string drawn for each remaining cell.
    #[must_use]
    pub fn with_incomplete_char(mut self, empty: impl Into<CompactString>) -> Self {
        self.incomplete_char = empty.into();
        self
    }

    /// Sets the template rendered while work is in progress.
    ///
    /// Requesting `:time_remaining` here is safe: in-progress lines are only rendered
    /// after at least one step.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<CompactString>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the template rendered once, when the last step completes.
    #[must_use]
    pub fn with_complete_message(mut self, message: impl Into<CompactString>) -> Self {
        self.complete_message = Some(message.into());
        self
    }

    /// Disables the completion message; the last step only erases the bar.
    #[must_use]
    pub fn without_complete_message(mut self) -> Self {
        self.complete_message = None;
        self
    }

    /// Adds an extra token available to every render.
    #[must_use]
    pub fn with_token(
        mut self,
        name: impl Into<CompactString>,
        value: impl std::fmt::Display,
    ) -> Self {
        self.extra_tokens.insert(name, value);
        self
    }

    /// Sets the instant elapsed and remaining time are measured from.
    #[must_use]
    pub const fn with_start_time(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the start time to `Instant::now()` rather than tracker construction.
    #[must_use]
    pub fn with_start_time_now(self) -> Self {
        self.with_start_time(Instant::now())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The `:title` value.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Bar width in cells.
    #[must_use]
    pub const fn bar_width(&self) -> usize {
        self.bar_width
    }

    /// Completed-cell string.
    #[must_use]
    pub fn progress_char(&self) -> &str {
        &self.progress_char
    }

    /// Remaining-cell string.
    #[must_use]
    pub fn incomplete_char(&self) -> &str {
        &self.incomplete_char
    }

    /// In-progress template.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Completion template, or `None` when disabled.
    #[must_use]
    pub fn complete_message(&self) -> Option<&str> {
        self.complete_message.as_deref()
    }

    /// Caller-supplied tokens overlaid on the built-in ones.
    #[must_use]
    pub const fn extra_tokens(&self) -> &Tokens {
        &self.extra_tokens
    }

    pub(crate) const fn extra_tokens_mut(&mut self) -> &mut Tokens {
        &mut self.extra_tokens
    }

    /// Explicit start time, if one was set.
    #[must_use]
    pub const fn start_time(&self) -> Option<Instant> {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FORMAT, ProgressConfig};

    /// Defaults
    /// The default configuration matches the documented look.
    #[test]
    fn test_defaults() {
        let config = ProgressConfig::default();

        assert_eq!(config.title(), "Progress");
        assert_eq!(config.bar_width(), 25);
        assert_eq!(config.progress_char(), "=");
        assert_eq!(config.incomplete_char(), ".");
        assert_eq!(config.format(), DEFAULT_FORMAT);
        assert_eq!(config.complete_message(), Some("Process complete"));
        assert!(config.extra_tokens().is_empty());
        assert!(config.start_time().is_none());
    }

    /// Fluent Overrides
    /// Each builder method replaces exactly one field.
    #[test]
    fn test_builder_overrides() {
        let config = ProgressConfig::new()
            .with_title("Sync")
            .with_bar_width(10)
            .with_progress_char("#")
            .with_incomplete_char("-")
            .with_format(":title :step/:total_steps")
            .without_complete_message()
            .with_token("host", "db-1")
            .with_start_time_now();

        assert_eq!(config.title(), "Sync");
        assert_eq!(config.bar_width(), 10);
        assert_eq!(config.progress_char(), "#");
        assert_eq!(config.incomplete_char(), "-");
        assert_eq!(config.format(), ":title :step/:total_steps");
        assert_eq!(config.complete_message(), None);
        assert_eq!(config.extra_tokens().get("host"), Some("db-1"));
        assert!(config.start_time().is_some());
    }
}

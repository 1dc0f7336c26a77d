//! Where progress lines go.
//!
//! The reporter only needs two things from its output: write a line, and erase the line
//! written last. [`OutputSink`] captures exactly that, so the terminal can be swapped for
//! a [`CaptureSink`] in tests or for any other writer a tool already owns.

use std::{fmt, io, sync::Arc};

use console::Term;
use parking_lot::Mutex;

/// A line-oriented output that can erase its most recent line.
///
/// Sinks are driven from inside the reporter's critical section, so calls never
/// interleave.
pub trait OutputSink: Send {
    /// Writes one line of progress output.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying stream.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Erases the line written last, leaving the cursor at its start.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying stream.
    fn erase_last_line(&mut self) -> io::Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        (**self).write_line(text)
    }

    fn erase_last_line(&mut self) -> io::Result<()> {
        (**self).erase_last_line()
    }
}

/// An [`OutputSink`] backed by a [`console::Term`].
///
/// Text ending in whitespace is written without a newline so the cursor stays on the
/// line and the next render can erase it in place; anything else is terminated with a
/// newline. The default in-progress format ends with a space for this reason, while the
/// completion message does not, leaving it on screen.
#[derive(Clone, Debug)]
pub struct TermSink {
    term: Term,
}

impl TermSink {
    /// Wraps an existing terminal handle.
    #[must_use]
    pub const fn new(term: Term) -> Self {
        Self { term }
    }

    /// Writes to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }

    /// Writes to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Term::stderr())
    }
}

impl Default for TermSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl OutputSink for TermSink {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        if keeps_line_open(text) {
            self.term.write_str(text)?;
            self.term.flush()
        } else {
            self.term.write_line(text)
        }
    }

    fn erase_last_line(&mut self) -> io::Result<()> {
        self.term.clear_line()
    }
}

/// Whether `text` is written without a newline, so the next render can erase it.
fn keeps_line_open(text: &str) -> bool {
    text.ends_with([' ', '\t'])
}

/// One call recorded by a [`CaptureSink`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SinkEvent {
    /// `erase_last_line` was called.
    Erase,
    /// `write_line` was called with this text.
    Line(String),
}

/// An in-memory [`OutputSink`] that records every call.
///
/// Clones share the same log, so a test can hand one clone to a reporter and inspect
/// the other.
#[derive(Clone, Default)]
pub struct CaptureSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSink")
            .field("events", &self.events.lock().len())
            .finish()
    }
}

impl CaptureSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, in order.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Only the written lines, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Line(text) => Some(text.clone()),
                SinkEvent::Erase => None,
            })
            .collect()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl OutputSink for CaptureSink {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.events.lock().push(SinkEvent::Line(text.to_owned()));
        Ok(())
    }

    fn erase_last_line(&mut self) -> io::Result<()> {
        self.events.lock().push(SinkEvent::Erase);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureSink, OutputSink, SinkEvent, keeps_line_open};
    use crate::{ProgressConfig, config::DEFAULT_FORMAT};

    /// Line Ending Rule
    /// Whitespace-terminated text stays on the line; anything else gets a newline.
    #[test]
    fn test_keeps_line_open() {
        assert!(keeps_line_open("Progress |===| 50% complete  "));
        assert!(keeps_line_open("waiting\t"));
        assert!(!keeps_line_open("Process complete"));
        assert!(!keeps_line_open(""));

        // Every in-progress render gets a trailing space appended, the default
        // completion message does not.
        assert!(keeps_line_open(&format!("{DEFAULT_FORMAT} ")));
        let config = ProgressConfig::default();
        assert!(!keeps_line_open(config.complete_message().unwrap()));
    }

    /// Shared Log
    /// A clone observes calls made through another clone, including through a box.
    #[test]
    fn test_capture_shared_between_clones() {
        let sink = CaptureSink::new();
        let mut boxed: Box<dyn OutputSink> = Box::new(sink.clone());

        boxed.erase_last_line().unwrap();
        boxed.write_line("hello ").unwrap();

        assert_eq!(
            sink.events(),
            vec![SinkEvent::Erase, SinkEvent::Line("hello ".into())]
        );
        assert_eq!(sink.lines(), vec!["hello ".to_owned()]);

        sink.clear();
        assert!(sink.events().is_empty());
    }
}

//! Drive a reporter from a sequence of work items.
//!
//! These helpers own the whole reporter lifecycle: they size it from the sequence,
//! call a step function per item and increment with the tokens it returns.
//!
//! # Example
//!
//! ```
//! use step_progress::{CaptureSink, ProgressConfig, Tokens, drive_sequence_with};
//!
//! let sink = CaptureSink::new();
//! drive_sequence_with(["a", "b"], ProgressConfig::default(), sink.clone(), |name| {
//!     Tokens::new().with("item", name)
//! })
//! .unwrap();
//!
//! assert_eq!(sink.lines().last().map(String::as_str), Some("Process complete"));
//! ```

use std::{panic, thread};

use parking_lot::Mutex;

use crate::{
    config::ProgressConfig,
    error::Result,
    reporter::ProgressReporter,
    sink::{OutputSink, TermSink},
    template::Tokens,
};

const LOG_TARGET: &str = "step_progress::drive";

/// Runs `step_fn` over `items` in order, reporting each on standard output.
///
/// # Errors
///
/// Fails with [`ProgressError::InvalidTotal`](crate::ProgressError::InvalidTotal) for an
/// empty sequence, or with the first sink error.
pub fn drive_sequence<I, F>(items: I, config: ProgressConfig, step_fn: F) -> Result<()>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(I::Item) -> Tokens,
{
    drive_sequence_with(items, config, TermSink::stdout(), step_fn)
}

/// Runs `step_fn` over `items` in order, reporting each on `sink`.
///
/// # Errors
///
/// Fails with [`ProgressError::InvalidTotal`](crate::ProgressError::InvalidTotal) for an
/// empty sequence, or with the first sink error.
pub fn drive_sequence_with<I, F>(
    items: I,
    config: ProgressConfig,
    sink: impl OutputSink + 'static,
    mut step_fn: F,
) -> Result<()>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(I::Item) -> Tokens,
{
    let items = items.into_iter();
    let reporter = ProgressReporter::with_sink(items.len() as u64, config, sink)?;

    for item in items {
        let extra = step_fn(item);
        reporter.increment_with(&extra)?;
    }

    Ok(())
}

/// Runs `step_fn` over `items` on up to `workers` threads sharing one reporter.
///
/// Items are handed out in order but may complete in any order; each completion is one
/// serialized increment, so the output is the same shape as a sequential run.
///
/// # Errors
///
/// Fails with [`ProgressError::InvalidTotal`](crate::ProgressError::InvalidTotal) for an
/// empty sequence, or with the first sink error seen by any worker. Workers stop taking
/// new items after their own error only.
///
/// # Panics
///
/// A panic inside `step_fn` is resumed on the calling thread.
pub fn drive_parallel<T, F>(
    items: Vec<T>,
    workers: usize,
    config: ProgressConfig,
    sink: impl OutputSink + 'static,
    step_fn: F,
) -> Result<()>
where
    T: Send,
    F: Fn(T) -> Tokens + Sync,
{
    let reporter = ProgressReporter::with_sink(items.len() as u64, config, sink)?;
    let workers = workers.clamp(1, items.len());
    log::debug!(target: LOG_TARGET, "Dispatching {} items to {workers} workers", items.len());

    let queue = Mutex::new(items.into_iter());
    let (queue, reporter, step_fn) = (&queue, &reporter, &step_fn);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(move |_| {
                scope.spawn(move || -> Result<()> {
                    loop {
                        let Some(item) = queue.lock().next() else {
                            return Ok(());
                        };
                        reporter.increment_with(&step_fn(item))?;
                    }
                })
            })
            .collect();

        handles.into_iter().try_for_each(|handle| {
            handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    })
}

/// Extension trait to drive any sized iterator like [`drive_sequence_with`].
pub trait ReportIteratorExt: ExactSizeIterator + Sized {
    /// Consumes the iterator, calling `step_fn` per item and reporting on `sink`.
    ///
    /// # Errors
    ///
    /// See [`drive_sequence_with`].
    fn drive_with<F>(
        self,
        config: ProgressConfig,
        sink: impl OutputSink + 'static,
        step_fn: F,
    ) -> Result<()>
    where
        F: FnMut(Self::Item) -> Tokens,
    {
        drive_sequence_with(self, config, sink, step_fn)
    }
}

impl<I: ExactSizeIterator> ReportIteratorExt for I {}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{ReportIteratorExt as _, drive_parallel, drive_sequence_with};
    use crate::{CaptureSink, ProgressConfig, ProgressError, Tokens};

    /// Sequential Driver
    /// Items are visited in order and their tokens reach the render.
    #[test]
    fn test_drive_sequence_order_and_tokens() {
        let sink = CaptureSink::new();
        let mut seen = Vec::new();
        let config = ProgressConfig::new().with_format(":item");

        drive_sequence_with(vec![1, 2, 3], config, sink.clone(), |n| {
            seen.push(n);
            Tokens::new().with("item", n * 10)
        })
        .unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(
            sink.lines(),
            vec!["10 ".to_owned(), "20 ".to_owned(), "Process complete".to_owned()]
        );
    }

    /// Empty Sequence
    /// Nothing to do is a configuration error, and the step function never runs.
    #[test]
    fn test_drive_empty_sequence() {
        let sink = CaptureSink::new();
        let err = drive_sequence_with(
            Vec::<u8>::new(),
            ProgressConfig::default(),
            sink.clone(),
            |_| unreachable!("no items"),
        )
        .unwrap_err();

        assert!(matches!(err, ProgressError::InvalidTotal));
        assert!(sink.events().is_empty());
    }

    /// Parallel Driver
    /// Every item runs once and the completion message renders exactly once, last.
    #[test]
    fn test_drive_parallel() {
        let sink = CaptureSink::new();
        let calls = AtomicUsize::new(0);

        drive_parallel((0..50).collect(), 8, ProgressConfig::default(), sink.clone(), |_: i32| {
            calls.fetch_add(1, Ordering::Relaxed);
            Tokens::new()
        })
        .unwrap();

        let lines = sink.lines();
        assert_eq!(calls.load(Ordering::Relaxed), 50);
        assert_eq!(lines.len(), 50);
        assert_eq!(lines.iter().filter(|l| *l == "Process complete").count(), 1);
        assert_eq!(lines.last().map(String::as_str), Some("Process complete"));
    }

    /// More Workers Than Items
    /// The pool shrinks to the number of items.
    #[test]
    fn test_drive_parallel_few_items() {
        let sink = CaptureSink::new();
        drive_parallel(vec!["only"], 16, ProgressConfig::default(), sink.clone(), |_| Tokens::new())
            .unwrap();

        assert_eq!(sink.lines(), vec!["Process complete".to_owned()]);
    }

    /// Iterator Extension
    /// Any exact-size iterator can be driven directly.
    #[test]
    fn test_iterator_extension() {
        let sink = CaptureSink::new();
        ["x", "y"]
            .iter()
            .drive_with(ProgressConfig::new().with_format(":name"), sink.clone(), |name| {
                Tokens::new().with("name", name)
            })
            .unwrap();

        assert_eq!(sink.lines(), vec!["x ".to_owned(), "Process complete".to_owned()]);
    }
}

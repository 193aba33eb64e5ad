//! Console progress indicator.
//!
//! `ProgressBar` draws a single-line progress bar with an estimate of
//! the remaining time:
//!
//! ```text
//! Progress: [################                        ] 40% ETC: 0m 12s
//! ```
//!
//! The bar is purely cosmetic. Errors writing to the terminal are
//! ignored, so instrumenting a computation never changes its outcome.
//!
//! ```
//! use embedding_utils::progress::ProgressIterator;
//!
//! let sum: usize = (0..100).progress("Summing").sum();
//! assert_eq!(sum, 4950);
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

const DEFAULT_BAR_LENGTH: usize = 40;
const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

/// Split a number of seconds into whole minutes and seconds.
pub fn time_in_ms(seconds: f64) -> (u64, u64) {
    let seconds = seconds.max(0.);
    let mins = (seconds / 60.) as u64;
    let secs = (seconds - (mins * 60) as f64) as u64;
    (mins, secs)
}

/// Single-line console progress bar.
pub struct ProgressBar<W>
where
    W: Write,
{
    writer: W,
    task: String,
    total: usize,
    bar_length: usize,
    done: usize,
    finished: bool,

    // Length of the last line that was not terminated by a newline.
    last_print_len: Option<usize>,
    print_length: usize,
    status: String,

    start_time: Instant,
    print_time: Instant,
    prev_time: Option<Instant>,
    step_secs: Option<f64>,
}

impl ProgressBar<io::Stderr> {
    /// Construct a progress bar that draws to standard error.
    pub fn stderr(total: usize, task: impl Into<String>) -> Self {
        ProgressBar::new(io::stderr(), total, task)
    }
}

impl<W> ProgressBar<W>
where
    W: Write,
{
    /// Construct a progress bar for `total` steps of `task`.
    pub fn new(writer: W, total: usize, task: impl Into<String>) -> Self {
        Self::with_bar_length(writer, total, task, DEFAULT_BAR_LENGTH)
    }

    /// Construct a progress bar with a bar of `bar_length` characters.
    pub fn with_bar_length(
        writer: W,
        total: usize,
        task: impl Into<String>,
        bar_length: usize,
    ) -> Self {
        let now = Instant::now();
        let mut bar = ProgressBar {
            writer,
            task: task.into(),
            total,
            bar_length,
            done: 0,
            finished: false,
            last_print_len: None,
            print_length: 0,
            status: String::new(),
            start_time: now,
            print_time: now,
            prev_time: None,
            step_secs: None,
        };

        let commencing = format!("Commencing {} . . .", bar.task);
        bar.print_line(&commencing, "");
        bar.update(0);

        bar
    }

    /// Get the number of completed steps.
    pub fn done(&self) -> usize {
        self.done
    }

    /// Mark one more step as completed.
    pub fn inc(&mut self) {
        let done = self.done + 1;
        self.update(done);
    }

    /// Set the number of completed steps.
    ///
    /// The bar is redrawn at most once per second, except when the
    /// task completes. Counts beyond the total are not drawn.
    pub fn update(&mut self, done: usize) {
        if self.finished {
            return;
        }

        self.done = done;

        let progress = if done == 0 {
            Some(0.)
        } else if done <= self.total {
            Some(done as f64 / self.total as f64)
        } else {
            None
        };
        let complete = done > 0 && done == self.total;

        let now = Instant::now();
        if let Some(prev_time) = self.prev_time {
            let step = now.duration_since(prev_time).as_secs_f64();
            let step_secs = match self.step_secs {
                Some(avg) => 0.9 * avg + 0.1 * step,
                None => step,
            };
            self.step_secs = Some(step_secs);

            let remaining = self.total.saturating_sub(done);
            let (mins, secs) = time_in_ms(remaining as f64 * step_secs);
            self.status = format!("ETC: {}m {}s", mins, secs);
        }
        self.prev_time = Some(now);

        if complete {
            let (mins, secs) = time_in_ms(now.duration_since(self.start_time).as_secs_f64());
            self.status = format!("Done. Time Taken: {}m {}s.", mins, secs);
        }

        let progress = match progress {
            Some(progress) => progress,
            None => return,
        };

        let mut text = self.render(progress);
        let len = text.chars().count();
        if len < self.print_length {
            text.push_str(&" ".repeat(self.print_length - len));
        }
        self.print_length = self.print_length.max(len);

        if complete || now.duration_since(self.print_time) > REDRAW_INTERVAL {
            self.print_line(&text, if complete { "\n" } else { "" });
            self.print_time = now;
        }

        if complete {
            let message = format!("{} complete.", self.task);
            self.print_line(&message, "\n");
            self.finished = true;
        }
    }

    /// Print a line, overwriting the previous unterminated line.
    ///
    /// The line starts with a carriage return. If the previous line
    /// was longer and not terminated by a newline, the remainder is
    /// blanked out.
    pub fn print_line(&mut self, text: &str, end: &str) {
        let mut line = format!("\r{}", text);
        let len = line.chars().count();
        if let Some(last_len) = self.last_print_len {
            if len < last_len {
                line.push_str(&" ".repeat(last_len - len));
            }
        }
        line.push_str(end);

        self.last_print_len = if end == "\n" {
            None
        } else {
            Some(line.chars().count())
        };

        // Progress output is best-effort.
        let _ = self
            .writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush());
    }

    /// Consume the progress bar, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render(&self, progress: f64) -> String {
        let fill = ((self.bar_length as f64 * progress).round() as usize).min(self.bar_length);
        let percentage = (progress * 10_000.).round() / 100.;
        format!(
            "Progress: [{}{}] {}% {}",
            "#".repeat(fill),
            " ".repeat(self.bar_length - fill),
            percentage,
            self.status
        )
    }
}

/// Iterator that advances a progress bar for every item.
pub struct ProgressIter<I, W>
where
    W: Write,
{
    inner: I,
    bar: ProgressBar<W>,
}

impl<I, W> ProgressIter<I, W>
where
    W: Write,
{
    /// Consume the iterator, returning the progress bar.
    pub fn into_bar(self) -> ProgressBar<W> {
        self.bar
    }
}

impl<I, W> Iterator for ProgressIter<I, W>
where
    I: Iterator,
    W: Write,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.bar.inc();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Extension trait for showing progress while iterating.
pub trait ProgressIterator: Iterator + Sized {
    /// Show progress of this iterator on standard error.
    fn progress(self, task: &str) -> ProgressIter<Self, io::Stderr>
    where
        Self: ExactSizeIterator,
    {
        let total = self.len();
        self.progress_with(ProgressBar::stderr(total, task))
    }

    /// Show progress of this iterator using the given bar.
    fn progress_with<W>(self, bar: ProgressBar<W>) -> ProgressIter<Self, W>
    where
        W: Write,
    {
        ProgressIter { inner: self, bar }
    }
}

impl<I> ProgressIterator for I where I: Iterator {}

//! Progress reporting for the fetch and download phases.
//!
//! The core never draws anything itself. Callers inject a
//! [`ProgressCallback`] that receives a [`Progress`] after every window, so
//! the same exporter drives a terminal status line, a GUI progress bar or
//! nothing at all.
//!
//! # Example
//!
//! ```rust
//! use tgexport::progress::{Phase, Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("{}: {:.1}%", progress.phase, pct);
//!     }
//! });
//!
//! callback(Progress::new(Phase::Fetch, 10, 25));
//! ```

use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Phase of an export a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Fetching and normalizing messages.
    #[default]
    Fetch,
    /// Downloading media of fetched messages.
    Download,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fetch => write!(f, "Fetching messages"),
            Phase::Download => write!(f, "Downloading media"),
        }
    }
}

/// Progress information after a completed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Phase being reported.
    pub phase: Phase,

    /// Items handled so far, successful or not.
    pub processed: usize,

    /// Items handled successfully so far.
    pub succeeded: usize,

    /// Total items in this phase.
    pub total: usize,
}

impl Progress {
    /// Creates a progress update where every processed item succeeded.
    pub fn new(phase: Phase, processed: usize, total: usize) -> Self {
        Self {
            phase,
            processed,
            succeeded: processed,
            total,
        }
    }

    /// Sets the number of successful items.
    #[must_use]
    pub fn with_succeeded(mut self, succeeded: usize) -> Self {
        self.succeeded = succeeded;
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// ```rust
    /// use tgexport::progress::{Phase, Progress};
    ///
    /// assert_eq!(Progress::new(Phase::Fetch, 5, 10).percentage(), Some(50.0));
    /// assert_eq!(Progress::new(Phase::Download, 0, 0).percentage(), Some(100.0));
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            Some(100.0)
        } else {
            Some((self.processed as f64 / self.total as f64) * 100.0)
        }
    }

    /// Returns whether every item of the phase has been handled.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    /// Number of processed items that failed.
    pub fn failed(&self) -> usize {
        self.processed.saturating_sub(self.succeeded)
    }

    /// Items still to be handled.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed)
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that redraws a status line on stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r⏳ {}: {}/{} ({:.1}%)",
            progress.phase,
            progress.processed,
            progress.total,
            progress.percentage().unwrap_or(0.0)
        );
        if progress.is_complete() {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    })
}

//! Policies for records that cannot be processed.
//!
//! A record whose header lacks an identifier cannot be referenced on any
//! output line. [`RecoveryMode`] decides what happens to it: `Strict` aborts
//! the run with the error, `Lenient` logs a warning, skips the record and
//! counts it in the [`RecoveryContext`]. Malformed XML is never recoverable.

use crate::error::{HarvestError, Result};
use tracing::warn;

/// Strategy for handling unprocessable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Abort the run on the first unprocessable record (default)
    #[default]
    Strict,
    /// Skip the record, log a warning and continue
    Lenient,
}

/// Recovery state for one run.
#[derive(Debug, Default)]
pub struct RecoveryContext {
    /// Current recovery mode
    pub mode: RecoveryMode,
    skipped: usize,
}

impl RecoveryContext {
    /// Create a new recovery context with the given mode
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        RecoveryContext { mode, skipped: 0 }
    }

    /// Number of records skipped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Apply the mode to a per-record result.
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` when the record is to
    /// be skipped.
    ///
    /// # Errors
    ///
    /// Returns the original error in strict mode, and always for errors that
    /// are fatal for the whole run.
    pub fn recover<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error @ HarvestError::MissingIdentifier { .. }) => match self.mode {
                RecoveryMode::Strict => Err(error),
                RecoveryMode::Lenient => {
                    warn!("Skipping record: {error}");
                    self.skipped += 1;
                    Ok(None)
                },
            },
            Err(error) => Err(error),
        }
    }
}

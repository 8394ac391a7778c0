//! Error types for repository harvesting operations.
//!
//! This module provides the [`HarvestError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all repository investigation operations.
///
/// Represents the conditions that can occur while reading an OAI-PMH dump,
/// configuring a run, or deriving statistics from it.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// A record header carries no `<identifier>`.
    ///
    /// `position` is the 1-based index of the record within the dump.
    #[error("Record {position} does not have a valid record identifier")]
    MissingIdentifier {
        /// 1-based position of the offending record in the dump
        position: usize,
    },

    /// The underlying XML could not be parsed.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Statistics were requested for a dump without any active record.
    #[error("No active records found; statistics are undefined")]
    NoRecords,

    /// The requested field is not part of the schema's vocabulary.
    #[error("Unknown field '{field}' for schema {schema}")]
    UnknownField {
        /// The rejected field name
        field: String,
        /// Name of the schema the field was checked against
        schema: &'static str,
    },

    /// Inconsistent run configuration (e.g. a mode that needs a field without one).
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Failure while rendering or serializing report output.
    #[error("Output error: {0}")]
    Output(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`HarvestError`].
pub type Result<T> = std::result::Result<T, HarvestError>;

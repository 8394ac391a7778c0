//! Read-only view pairing a [`Record`] with its schema's [`FieldExtractor`].
//!
//! [`RecordView`] is what the rest of the pipeline consumes: identity and
//! status from the header, values and presence through the extractor, and the
//! raw per-tag occurrence histogram used for statistics.

use crate::error::{HarvestError, Result};
use crate::extract::{FieldEntry, FieldExtractor};
use crate::record::{Record, RecordStatus};
use indexmap::IndexMap;
use std::borrow::Cow;

/// One record as seen through a schema extractor.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    record: &'a Record,
    extractor: &'a dyn FieldExtractor,
}

impl<'a> RecordView<'a> {
    /// Wrap a record.
    #[must_use]
    pub fn new(record: &'a Record, extractor: &'a dyn FieldExtractor) -> Self {
        RecordView { record, extractor }
    }

    /// The underlying record.
    #[must_use]
    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Harvested header identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingIdentifier`] if the header has none.
    pub fn identifier(&self) -> Result<&'a str> {
        self.record
            .identifier
            .as_deref()
            .ok_or(HarvestError::MissingIdentifier {
                position: self.record.position,
            })
    }

    /// Identifier to print on output lines (the UNTL ARK when available).
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingIdentifier`] if neither the schema nor
    /// the header supplies one.
    pub fn output_id(&self) -> Result<Cow<'a, str>> {
        self.extractor
            .output_id(self.record)
            .ok_or(HarvestError::MissingIdentifier {
                position: self.record.position,
            })
    }

    /// Header status.
    #[must_use]
    pub fn status(&self) -> &'a RecordStatus {
        &self.record.status
    }

    /// Whether the record is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.record.status.is_active()
    }

    /// Non-empty values of `field`, optionally restricted to one qualifier.
    #[must_use]
    pub fn field_values(&self, field: &str, qualifier: Option<&str>) -> Vec<String> {
        self.field_entries(field, qualifier)
            .into_iter()
            .map(|entry| entry.value)
            .collect()
    }

    /// Like [`field_values`](Self::field_values) but keeps tag and qualifier.
    #[must_use]
    pub fn field_entries(&self, field: &str, qualifier: Option<&str>) -> Vec<FieldEntry> {
        self.extractor.field_values(self.record, field, qualifier)
    }

    /// Every non-empty entry in document order.
    #[must_use]
    pub fn all_fields(&self) -> Vec<FieldEntry> {
        self.extractor.all_fields(self.record)
    }

    /// True iff `field` has at least one non-empty value (qualifiers ignored).
    #[must_use]
    pub fn field_presence(&self, field: &str) -> bool {
        self.extractor.field_presence(self.record, field)
    }

    /// Occurrences per tag, counting empty elements too.
    ///
    /// Keys are Clark-notation tags in first-seen order.
    #[must_use]
    pub fn field_occurrence_histogram(&self) -> IndexMap<&'a str, usize> {
        let mut histogram = IndexMap::new();
        for element in &self.record.metadata {
            *histogram.entry(element.tag.as_str()).or_insert(0) += 1;
        }
        histogram
    }
}

//! Repository-wide field statistics.
//!
//! [`AggregateStats`] folds per-record occurrence histograms into
//! repository counters. The fold only ever adds, so the result does not
//! depend on record order and two partial aggregates can be combined with
//! [`AggregateStats::merge`] (see [`crate::rayon_stats_pool`]).
//!
//! # Examples
//!
//! ```
//! use repoinv::extract::FlatExtractor;
//! use repoinv::namespaces::{qualified, DC};
//! use repoinv::record::{MetadataElement, Record};
//! use repoinv::stats::AggregateStats;
//! use repoinv::view::RecordView;
//!
//! let record = Record::builder()
//!     .identifier("oai:x:1")
//!     .element(MetadataElement::new(qualified(DC, "subject"), "A"))
//!     .element(MetadataElement::new(qualified(DC, "subject"), "B"))
//!     .build();
//!
//! let mut stats = AggregateStats::new();
//! stats.accumulate(&RecordView::new(&record, &FlatExtractor));
//!
//! let subject = &stats.field_info[&qualified(DC, "subject")];
//! assert_eq!(stats.record_count, 1);
//! assert_eq!(subject.field_count, 1);
//! assert_eq!(subject.field_count_total, 2);
//! ```

use crate::error::{HarvestError, Result};
use crate::view::RecordView;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Counters for one field tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Records containing the field at least once
    pub field_count: usize,
    /// Occurrences summed across all records
    pub field_count_total: usize,
}

/// Averages derived from [`FieldStats`] for one field tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldAverages {
    /// `field_count_total / record_count`
    pub field_count_total_average: f64,
    /// `field_count_total / field_count`
    pub field_count_element_average: f64,
}

/// Repository-wide counters built one active record at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of active records folded in
    pub record_count: usize,
    /// Per-tag counters, in first-seen order
    pub field_info: IndexMap<String, FieldStats>,
}

impl AggregateStats {
    /// Empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record in. Non-active records are ignored.
    ///
    /// Returns whether the record was counted.
    pub fn accumulate(&mut self, view: &RecordView<'_>) -> bool {
        if !view.is_active() {
            return false;
        }
        self.accumulate_histogram(view.field_occurrence_histogram());
        true
    }

    /// Fold in the occurrence histogram of one active record.
    ///
    /// Each tag adds 1 to `field_count` and its occurrence count to
    /// `field_count_total`. Zero counts are ignored.
    pub fn accumulate_histogram<'t>(
        &mut self,
        histogram: impl IntoIterator<Item = (&'t str, usize)>,
    ) {
        self.record_count += 1;
        for (tag, occurrences) in histogram {
            if occurrences == 0 {
                continue;
            }
            let stats = self.field_info.entry(tag.to_string()).or_default();
            stats.field_count += 1;
            stats.field_count_total += occurrences;
        }
    }

    /// Add another aggregate's counters into this one.
    pub fn merge_from(&mut self, other: &AggregateStats) {
        self.record_count += other.record_count;
        for (tag, theirs) in &other.field_info {
            let ours = self.field_info.entry(tag.clone()).or_default();
            ours.field_count += theirs.field_count;
            ours.field_count_total += theirs.field_count_total;
        }
    }

    /// Combine two aggregates.
    #[must_use]
    pub fn merge(mut self, other: AggregateStats) -> AggregateStats {
        self.merge_from(&other);
        self
    }

    /// Whether no active record has been folded in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Percentage of records containing `tag` (0 for unseen tags).
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NoRecords`] when the aggregate is empty.
    pub fn presence_percent(&self, tag: &str) -> Result<f64> {
        if self.is_empty() {
            return Err(HarvestError::NoRecords);
        }
        let count = self.field_info.get(tag).map_or(0, |stats| stats.field_count);
        Ok(count as f64 / self.record_count as f64 * 100.0)
    }

    /// Per-field averages, keyed like [`field_info`](Self::field_info).
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NoRecords`] when the aggregate is empty.
    pub fn averages(&self) -> Result<IndexMap<String, FieldAverages>> {
        if self.is_empty() {
            return Err(HarvestError::NoRecords);
        }
        let record_count = self.record_count as f64;
        Ok(self
            .field_info
            .iter()
            .map(|(tag, stats)| {
                let total = stats.field_count_total as f64;
                (
                    tag.clone(),
                    FieldAverages {
                        field_count_total_average: total / record_count,
                        field_count_element_average: total / stats.field_count as f64,
                    },
                )
            })
            .collect())
    }
}

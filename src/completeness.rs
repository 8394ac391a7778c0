//! Normalized completeness scores for a whole repository.
//!
//! Three scores summarize how well-described a collection is, each a
//! percentage derived from per-field presence (`field_count / record_count * 100`):
//! - **dc completeness** — presence percentages summed and divided by the
//!   fixed number of canonical Dublin Core elements ([`DC_ELEMENT_COUNT`])
//! - **collection completeness** — mean presence of the fields used by more
//!   than [`COLLECTION_THRESHOLD`] percent of records
//! - **wwww completeness** — mean presence of creator, title, identifier and
//!   date ([`WWWW_ELEMENTS`])
//!
//! plus their arithmetic mean.
//!
//! Under the default [`DcNumerator::AllObserved`] policy the dc numerator
//! sums every observed field, canonical or not, so dumps carrying extra
//! elements can score above 100. [`DcNumerator::CanonicalOnly`] restricts the
//! numerator to the 15 canonical tags.

use crate::error::{HarvestError, Result};
use crate::extract::MetadataSchema;
use crate::namespaces::{DC_ELEMENTS, WWWW_ELEMENTS};
use crate::stats::AggregateStats;
use serde::Serialize;

/// Denominator of the dc completeness score.
pub const DC_ELEMENT_COUNT: usize = DC_ELEMENTS.len();

/// Denominator of the wwww completeness score.
pub const WWWW_ELEMENT_COUNT: usize = WWWW_ELEMENTS.len();

/// A field counts toward collection completeness above this presence percentage.
pub const COLLECTION_THRESHOLD: f64 = 10.0;

/// Which fields feed the numerator of the dc completeness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DcNumerator {
    /// Every observed field tag
    #[default]
    AllObserved,
    /// Only the 15 canonical elements in the schema namespace
    CanonicalOnly,
}

/// The completeness scores of one repository.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletenessScores {
    /// Summed presence over [`DC_ELEMENT_COUNT`]
    pub dc_completeness: f64,
    /// Mean presence of fields above [`COLLECTION_THRESHOLD`];
    /// `None` when no field crosses it
    pub collection_completeness: Option<f64>,
    /// Mean presence of the four wwww fields
    pub wwww_completeness: f64,
    /// Mean of the three scores, an absent collection score counting as 0
    pub average_completeness: f64,
}

/// Computes [`CompletenessScores`] from an [`AggregateStats`].
#[derive(Debug, Clone)]
pub struct CompletenessCalculator {
    canonical_tags: Vec<String>,
    wwww_tags: Vec<String>,
    numerator: DcNumerator,
}

impl CompletenessCalculator {
    /// Calculator whose reference tags live in `schema`'s namespace.
    #[must_use]
    pub fn for_schema(schema: MetadataSchema) -> Self {
        CompletenessCalculator {
            canonical_tags: DC_ELEMENTS.iter().map(|e| schema.dc_equivalent_tag(e)).collect(),
            wwww_tags: WWWW_ELEMENTS.iter().map(|e| schema.dc_equivalent_tag(e)).collect(),
            numerator: DcNumerator::default(),
        }
    }

    /// Select the dc completeness numerator policy.
    #[must_use]
    pub fn with_dc_numerator(mut self, numerator: DcNumerator) -> Self {
        self.numerator = numerator;
        self
    }

    /// Compute the scores.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NoRecords`] if `stats` holds no active record.
    pub fn calculate(&self, stats: &AggregateStats) -> Result<CompletenessScores> {
        if stats.is_empty() {
            return Err(HarvestError::NoRecords);
        }
        let record_count = stats.record_count as f64;

        let mut dc_total = 0.0;
        let mut collection_total = 0.0;
        let mut collection_fields = 0usize;
        let mut wwww_total = 0.0;

        for (tag, field) in &stats.field_info {
            let percent = field.field_count as f64 / record_count * 100.0;

            if self.numerator == DcNumerator::AllObserved || self.canonical_tags.contains(tag) {
                dc_total += percent;
            }
            if percent > COLLECTION_THRESHOLD {
                collection_total += percent;
                collection_fields += 1;
            }
            if self.wwww_tags.contains(tag) {
                wwww_total += percent;
            }
        }

        let dc_completeness = dc_total / DC_ELEMENT_COUNT as f64;
        let collection_completeness =
            (collection_fields > 0).then(|| collection_total / collection_fields as f64);
        let wwww_completeness = wwww_total / WWWW_ELEMENT_COUNT as f64;
        let average_completeness = (dc_completeness
            + collection_completeness.unwrap_or(0.0)
            + wwww_completeness)
            / 3.0;

        Ok(CompletenessScores {
            dc_completeness,
            collection_completeness,
            wwww_completeness,
            average_completeness,
        })
    }
}

impl Default for CompletenessCalculator {
    fn default() -> Self {
        Self::for_schema(MetadataSchema::DublinCore)
    }
}

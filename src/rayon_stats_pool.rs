//! Parallel statistics accumulation using Rayon.
//!
//! This module provides [`accumulate_batch_parallel`], which folds a batch of
//! already-parsed records into an [`AggregateStats`] on Rayon's work-stealing
//! thread pool. Each worker folds its own partial aggregate and the partials
//! are combined with [`AggregateStats::merge`]; because the fold only adds,
//! the result equals the sequential one.
//!
//! # Examples
//!
//! ```
//! use repoinv::extract::FlatExtractor;
//! use repoinv::rayon_stats_pool::accumulate_batch_parallel;
//! use repoinv::record::Record;
//!
//! let records = vec![
//!     Record::builder().identifier("a").build(),
//!     Record::builder().identifier("b").deleted().build(),
//! ];
//! let stats = accumulate_batch_parallel(&records, &FlatExtractor);
//! assert_eq!(stats.record_count, 1);
//! ```

use crate::extract::FieldExtractor;
use crate::record::Record;
use crate::stats::AggregateStats;
use crate::view::RecordView;
use rayon::prelude::*;

/// Fold a batch of records into statistics in parallel.
///
/// Deleted records are ignored exactly as in the sequential
/// [`AggregateStats::accumulate`]. The thread pool respects the
/// `RAYON_NUM_THREADS` environment variable.
#[must_use]
pub fn accumulate_batch_parallel(
    records: &[Record],
    extractor: &dyn FieldExtractor,
) -> AggregateStats {
    records
        .par_iter()
        .fold(AggregateStats::new, |mut stats, record| {
            stats.accumulate(&RecordView::new(record, extractor));
            stats
        })
        .reduce(AggregateStats::new, AggregateStats::merge)
}

/// Fold at most `limit` records of a batch in parallel.
///
/// Useful for sampling the head of a large batch.
#[must_use]
pub fn accumulate_batch_parallel_limited(
    records: &[Record],
    extractor: &dyn FieldExtractor,
    limit: usize,
) -> AggregateStats {
    accumulate_batch_parallel(&records[..limit.min(records.len())], extractor)
}

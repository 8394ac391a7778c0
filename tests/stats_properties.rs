//! Property tests for the statistics fold and the completeness scores.

use proptest::prelude::*;
use repoinv::namespaces::{qualified, DC, DC_ELEMENTS};
use repoinv::rayon_stats_pool::accumulate_batch_parallel;
use repoinv::{
    AggregateStats, CompletenessCalculator, DcNumerator, FlatExtractor, MetadataElement, Record,
    RecordView,
};

/// Strategy for one record: active flag plus `(element index, value)` pairs.
fn record_strategy() -> impl Strategy<Value = Record> {
    (
        any::<bool>(),
        prop::collection::vec((0..DC_ELEMENTS.len(), "[a-z ]{0,6}"), 0..8),
    )
        .prop_map(|(deleted, fields)| {
            let mut builder = Record::builder().identifier("oai:prop:1");
            if deleted {
                builder = builder.deleted();
            }
            for (index, value) in fields {
                let tag = qualified(DC, DC_ELEMENTS[index]);
                builder = builder.element(MetadataElement::new(tag, value));
            }
            builder.build()
        })
}

fn fold(records: &[Record]) -> AggregateStats {
    let mut stats = AggregateStats::new();
    for record in records {
        stats.accumulate(&RecordView::new(record, &FlatExtractor));
    }
    stats
}

proptest! {
    #[test]
    fn record_count_is_active_count_in_any_order(
        records in prop::collection::vec(record_strategy(), 0..30),
    ) {
        let forward = fold(&records);
        let reversed: Vec<Record> = records.iter().rev().cloned().collect();
        let backward = fold(&reversed);

        let active = records.iter().filter(|r| r.status.is_active()).count();
        prop_assert_eq!(forward.record_count, active);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn field_counts_are_bounded(records in prop::collection::vec(record_strategy(), 0..30)) {
        let stats = fold(&records);
        for field in stats.field_info.values() {
            prop_assert!(field.field_count <= stats.record_count);
            prop_assert!(field.field_count_total >= field.field_count);
            prop_assert!(field.field_count > 0);
        }
    }

    #[test]
    fn merge_is_associative(
        a in prop::collection::vec(record_strategy(), 0..10),
        b in prop::collection::vec(record_strategy(), 0..10),
        c in prop::collection::vec(record_strategy(), 0..10),
    ) {
        let (sa, sb, sc) = (fold(&a), fold(&b), fold(&c));
        let left = sa.clone().merge(sb.clone()).merge(sc.clone());
        let right = sa.merge(sb.merge(sc));
        prop_assert_eq!(&left, &right);

        let all: Vec<Record> = a.into_iter().chain(b).chain(c).collect();
        prop_assert_eq!(left, fold(&all));
    }

    #[test]
    fn parallel_fold_matches_sequential(
        records in prop::collection::vec(record_strategy(), 0..60),
    ) {
        prop_assert_eq!(accumulate_batch_parallel(&records, &FlatExtractor), fold(&records));
    }

    #[test]
    fn canonical_scores_stay_in_range(records in prop::collection::vec(record_strategy(), 1..30)) {
        let stats = fold(&records);
        prop_assume!(!stats.is_empty());

        let scores = CompletenessCalculator::default()
            .with_dc_numerator(DcNumerator::CanonicalOnly)
            .calculate(&stats)
            .unwrap();
        prop_assert!((0.0..=100.0 + 1e-9).contains(&scores.dc_completeness));
        prop_assert!((0.0..=100.0 + 1e-9).contains(&scores.wwww_completeness));
        if let Some(collection) = scores.collection_completeness {
            prop_assert!(collection > 10.0 && collection <= 100.0 + 1e-9);
        }
        let mean = (scores.dc_completeness
            + scores.collection_completeness.unwrap_or(0.0)
            + scores.wwww_completeness)
            / 3.0;
        prop_assert!((scores.average_completeness - mean).abs() < 1e-9);
    }

    #[test]
    fn presence_matches_unfiltered_values(
        record in record_strategy(),
        index in 0..DC_ELEMENTS.len(),
    ) {
        let view = RecordView::new(&record, &FlatExtractor);
        let field = DC_ELEMENTS[index];
        prop_assert_eq!(view.field_presence(field), !view.field_values(field, None).is_empty());
    }
}

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # repoinv: OAI-PMH repository inventory
//!
//! Streaming inspection of OAI-PMH metadata dumps. Records are read one at a
//! time, viewed through a schema-specific [`FieldExtractor`], and either
//! printed (values, presence flags, full dumps) or folded into
//! [`AggregateStats`] from which [`CompletenessScores`] are derived.
//!
//! ## Quick Start
//!
//! ```
//! use repoinv::{AggregateStats, CompletenessCalculator, MetadataSchema, OaiReader, RecordView};
//!
//! # fn main() -> repoinv::Result<()> {
//! let xml = r#"<ListRecords><record>
//!   <header><identifier>oai:x:1</identifier></header>
//!   <metadata><oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
//!       xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <dc:title>Foo</dc:title><dc:creator>Bar</dc:creator>
//!   </oai_dc:dc></metadata>
//! </record></ListRecords>"#;
//!
//! let extractor = MetadataSchema::DublinCore.extractor();
//! let mut stats = AggregateStats::new();
//! for record in OaiReader::new(xml.as_bytes()) {
//!     let record = record?;
//!     stats.accumulate(&RecordView::new(&record, extractor.as_ref()));
//! }
//!
//! let scores = CompletenessCalculator::for_schema(MetadataSchema::DublinCore).calculate(&stats)?;
//! assert_eq!(stats.record_count, 1);
//! assert_eq!(scores.wwww_completeness, 50.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`reader`] — Streaming OAI-PMH record source (plain or gzip)
//! - [`record`] — Parsed record structures
//! - [`extract`] — Metadata schemas and their field extraction rules
//! - [`view`] — Per-record accessors over an extractor
//! - [`stats`] — Presence statistics fold
//! - [`rayon_stats_pool`] — Parallel accumulation of in-memory batches
//! - [`completeness`] — Completeness scores
//! - [`report`] — Line, table and JSON output
//! - [`pipeline`] — One configured pass over a dump
//! - [`cli`] — Command-line interface of the `repoinv` binary

pub mod cli;
pub mod completeness;
pub mod error;
pub mod extract;
pub mod namespaces;
pub mod pipeline;
pub mod rayon_stats_pool;
pub mod reader;
pub mod record;
pub mod recovery;
pub mod report;
pub mod stats;
pub mod view;

pub use completeness::{CompletenessCalculator, CompletenessScores, DcNumerator};
pub use error::{HarvestError, Result};
pub use extract::{FieldEntry, FieldExtractor, FlatExtractor, MetadataSchema, QualifiedExtractor};
pub use pipeline::{run, Mode, RunConfig, RunSummary, StatsFormat};
pub use reader::OaiReader;
pub use record::{MetadataElement, Record, RecordStatus};
pub use recovery::{RecoveryContext, RecoveryMode};
pub use report::{format_stats_table, ReportWriter, StatsReport};
pub use stats::{AggregateStats, FieldStats};
pub use view::RecordView;

//! One streaming pass over a repository dump.
//!
//! [`run`] pulls records from an [`OaiReader`], wraps each one in a
//! [`RecordView`], and depending on the [`Mode`] either writes value /
//! presence / dump lines or folds the record into [`AggregateStats`]. In
//! stats mode the completeness scores are computed once the dump is
//! exhausted and the table (or JSON document) is written.
//!
//! Records are processed strictly one at a time and dropped before the next
//! one is read. Deleted records never produce output and never reach the
//! statistics. Every record, deleted or not, must carry an identifier; what
//! happens otherwise is decided by the configured [`RecoveryMode`].
//!
//! # Examples
//!
//! ```
//! use repoinv::extract::MetadataSchema;
//! use repoinv::pipeline::{run, Mode, RunConfig};
//! use repoinv::reader::OaiReader;
//!
//! let xml = r#"<r><record>
//!   <header><identifier>oai:x:1</identifier></header>
//!   <metadata><oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
//!       xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <dc:title>Foo</dc:title>
//!   </oai_dc:dc></metadata>
//! </record></r>"#;
//!
//! let config = RunConfig::builder(MetadataSchema::DublinCore)
//!     .mode(Mode::Values)
//!     .field("title")
//!     .with_id(true)
//!     .build()?;
//!
//! let mut out = Vec::new();
//! let summary = run(&config, OaiReader::new(xml.as_bytes()), &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), "oai:x:1\tFoo\n");
//! assert_eq!(summary.active, 1);
//! # Ok::<(), repoinv::HarvestError>(())
//! ```

use crate::completeness::{CompletenessCalculator, CompletenessScores, DcNumerator};
use crate::error::{HarvestError, Result};
use crate::extract::{FieldExtractor, MetadataSchema};
use crate::reader::OaiReader;
use crate::record::Record;
use crate::recovery::{RecoveryContext, RecoveryMode};
use crate::report::{format_stats_table, ReportWriter, StatsReport};
use crate::stats::AggregateStats;
use crate::view::RecordView;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Progress is logged every this many accumulated records.
pub const PROGRESS_INTERVAL: usize = 1000;

/// What a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Values of one field, one per line
    Values,
    /// One presence flag per record for one field
    Presence,
    /// Every non-empty field of every active record
    Dump,
    /// Repository statistics and completeness scores
    #[default]
    Stats,
}

/// Rendering of stats-mode output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatsFormat {
    /// Fixed-width presence table followed by the completeness scores
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Payload schema of the dump
    pub schema: MetadataSchema,
    /// Output mode
    pub mode: Mode,
    /// Requested field, required by values and presence modes
    pub field: Option<String>,
    /// Optional qualifier filter for values mode
    pub qualifier: Option<String>,
    /// Prefix value lines with the record id
    pub with_id: bool,
    /// Prefix value lines with the qualifier
    pub with_qualifier: bool,
    /// Handling of records without identifier
    pub recovery: RecoveryMode,
    /// Stats rendering
    pub stats_format: StatsFormat,
    /// dc completeness numerator policy
    pub dc_numerator: DcNumerator,
    /// Stop after this many records
    pub max_records: Option<usize>,
}

impl RunConfig {
    /// Start building a configuration for `schema`.
    #[must_use]
    pub fn builder(schema: MetadataSchema) -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                schema,
                mode: Mode::default(),
                field: None,
                qualifier: None,
                with_id: false,
                with_qualifier: false,
                recovery: RecoveryMode::default(),
                stats_format: StatsFormat::default(),
                dc_numerator: DcNumerator::default(),
                max_records: None,
            },
        }
    }
}

/// Builder for [`RunConfig`]; field names are validated in [`build`](Self::build).
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Set the output mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the requested field.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.config.field = Some(field.into());
        self
    }

    /// Restrict values to one qualifier.
    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.config.qualifier = Some(qualifier.into());
        self
    }

    /// Prefix value lines with the record id.
    #[must_use]
    pub fn with_id(mut self, with_id: bool) -> Self {
        self.config.with_id = with_id;
        self
    }

    /// Prefix value lines with the qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, with_qualifier: bool) -> Self {
        self.config.with_qualifier = with_qualifier;
        self
    }

    /// Set the recovery mode.
    #[must_use]
    pub fn recovery(mut self, recovery: RecoveryMode) -> Self {
        self.config.recovery = recovery;
        self
    }

    /// Set the stats rendering.
    #[must_use]
    pub fn stats_format(mut self, format: StatsFormat) -> Self {
        self.config.stats_format = format;
        self
    }

    /// Set the dc completeness numerator policy.
    #[must_use]
    pub fn dc_numerator(mut self, numerator: DcNumerator) -> Self {
        self.config.dc_numerator = numerator;
        self
    }

    /// Stop after `max_records` records.
    #[must_use]
    pub fn max_records(mut self, max_records: Option<usize>) -> Self {
        self.config.max_records = max_records;
        self
    }

    /// Validate and finish.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::UnknownField`] for a field outside the schema
    /// vocabulary and [`HarvestError::InvalidConfig`] when values or presence
    /// mode has no field.
    pub fn build(self) -> Result<RunConfig> {
        let config = self.config;
        if let Some(field) = &config.field {
            config.schema.validate_field(field)?;
        }
        if matches!(config.mode, Mode::Values | Mode::Presence) && config.field.is_none() {
            return Err(HarvestError::InvalidConfig(format!(
                "{:?} mode requires a field",
                config.mode
            )));
        }
        Ok(config)
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Records read from the dump
    pub records_seen: usize,
    /// Active records processed
    pub active: usize,
    /// Deleted (or otherwise inactive) records passed over
    pub deleted: usize,
    /// Records skipped by lenient recovery
    pub skipped: usize,
    /// Output lines written in values, presence and dump modes
    pub lines_written: usize,
    /// Accumulated statistics (stats mode)
    pub stats: Option<AggregateStats>,
    /// Completeness scores (stats mode)
    pub completeness: Option<CompletenessScores>,
}

/// Run one pass over `reader`, writing output to `out`.
///
/// # Errors
///
/// Fails on malformed input, on a record without identifier in strict
/// recovery mode, on output errors, and with [`HarvestError::NoRecords`]
/// when stats are requested for a dump without active records.
pub fn run<R: BufRead, W: Write>(
    config: &RunConfig,
    reader: OaiReader<R>,
    out: W,
) -> Result<RunSummary> {
    let extractor = config.schema.extractor();
    let mut recovery = RecoveryContext::new(config.recovery);
    let mut lines = ReportWriter::new(out);
    let mut stats = AggregateStats::new();
    let mut summary = RunSummary::default();

    info!(schema = %config.schema, mode = ?config.mode, "starting repository pass");

    let limit = config.max_records.unwrap_or(usize::MAX);
    for record in reader.take(limit) {
        let record = record?;
        summary.records_seen += 1;
        process_record(
            config,
            extractor.as_ref(),
            &record,
            &mut recovery,
            &mut lines,
            &mut stats,
            &mut summary,
        )?;
    }
    summary.skipped = recovery.skipped();
    summary.lines_written = lines.lines_written();

    let mut out = lines.into_inner()?;
    if config.mode == Mode::Stats {
        let scores = CompletenessCalculator::for_schema(config.schema)
            .with_dc_numerator(config.dc_numerator)
            .calculate(&stats)?;
        let rendered = match config.stats_format {
            StatsFormat::Text => format_stats_table(config.schema, &stats, &scores)?,
            StatsFormat::Json => {
                let mut json = StatsReport::new(config.schema, &stats, scores)?.to_json()?;
                json.push('\n');
                json
            },
        };
        out.write_all(rendered.as_bytes())?;
        summary.stats = Some(stats);
        summary.completeness = Some(scores);
    }
    out.flush()?;

    info!(
        records = summary.records_seen,
        active = summary.active,
        deleted = summary.deleted,
        skipped = summary.skipped,
        "repository pass complete"
    );
    Ok(summary)
}

fn process_record<W: Write>(
    config: &RunConfig,
    extractor: &dyn FieldExtractor,
    record: &Record,
    recovery: &mut RecoveryContext,
    lines: &mut ReportWriter<W>,
    stats: &mut AggregateStats,
    summary: &mut RunSummary,
) -> Result<()> {
    let view = RecordView::new(record, extractor);
    if recovery.recover(view.identifier())?.is_none() {
        return Ok(());
    }
    if !view.is_active() {
        debug!(position = record.position, status = %view.status(), "skipping inactive record");
        summary.deleted += 1;
        return Ok(());
    }
    summary.active += 1;

    let output_id = view.output_id()?;
    let id = output_id.as_ref();
    let field = config.field.as_deref().unwrap_or_default();
    match config.mode {
        Mode::Values => {
            for entry in view.field_entries(field, config.qualifier.as_deref()) {
                lines.write_value(
                    config.with_id.then_some(id),
                    config.with_qualifier.then(|| entry.qualifier_or_sentinel()),
                    &entry.value,
                )?;
            }
        },
        Mode::Presence => lines.write_presence(id, view.field_presence(field))?,
        Mode::Dump => {
            let with_qualifier = config.schema == MetadataSchema::Untl;
            for entry in view.all_fields() {
                lines.write_dump_entry(id, &entry, with_qualifier)?;
            }
        },
        Mode::Stats => {
            stats.accumulate(&view);
            if stats.record_count % PROGRESS_INTERVAL == 0 {
                info!("{} records processed", stats.record_count);
            }
        },
    }
    Ok(())
}

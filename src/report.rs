//! Rendering extraction results and repository statistics.
//!
//! Line-oriented output goes through [`ReportWriter`], a tab-delimited writer
//! built on the `csv` crate:
//! - values: `[id\t][qualifier\t]value`
//! - presence: `id\tTrue|False`
//! - dump: `id\ttag\t[qualifier\t]value`
//!
//! Repository statistics are rendered either as the fixed-width text table
//! ([`format_stats_table`]) or as a JSON document ([`StatsReport`]).

use std::fmt::Write as _;
use std::io::Write;

use crate::completeness::CompletenessScores;
use crate::error::{HarvestError, Result};
use crate::extract::{FieldEntry, MetadataSchema};
use crate::stats::AggregateStats;
use indexmap::IndexMap;
use serde::Serialize;

const BAR_WIDTH: usize = 25;
const PERCENT_PER_BAR_MARK: usize = 4;

/// Tab-delimited writer for value, presence and dump lines.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    lines_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Wrap an output stream.
    pub fn new(out: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);
        ReportWriter {
            writer,
            lines_written: 0,
        }
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Write one extracted value, optionally prefixed by id and qualifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn write_value(
        &mut self,
        id: Option<&str>,
        qualifier: Option<&str>,
        value: &str,
    ) -> Result<()> {
        let columns: Vec<&str> = id.into_iter().chain(qualifier).chain([value]).collect();
        self.write_line(&columns)
    }

    /// Write one presence line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn write_presence(&mut self, id: &str, present: bool) -> Result<()> {
        self.write_line(&[id, if present { "True" } else { "False" }])
    }

    /// Write one dump line; the qualifier column is included when `with_qualifier` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn write_dump_entry(
        &mut self,
        id: &str,
        entry: &FieldEntry,
        with_qualifier: bool,
    ) -> Result<()> {
        if with_qualifier {
            self.write_line(&[
                id,
                entry.tag.as_str(),
                entry.qualifier_or_sentinel(),
                entry.value.as_str(),
            ])
        } else {
            self.write_line(&[id, entry.tag.as_str(), entry.value.as_str()])
        }
    }

    /// Flush buffered lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| HarvestError::Output(format!("Failed to flush output: {}", e.error())))
    }

    fn write_line(&mut self, columns: &[&str]) -> Result<()> {
        self.writer
            .write_record(columns)
            .map_err(|e| HarvestError::Output(format!("Failed to write line: {e}")))?;
        self.lines_written += 1;
        Ok(())
    }
}

/// Per-field entry of a [`StatsReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    /// Records containing the field
    pub field_count: usize,
    /// Total occurrences
    pub field_count_total: usize,
    /// `field_count / record_count * 100`
    pub presence_percent: f64,
    /// `field_count_total / record_count`
    pub field_count_total_average: f64,
    /// `field_count_total / field_count`
    pub field_count_element_average: f64,
}

/// Whole-repository statistics document.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Schema name (`oai_dc`, `untl`)
    pub schema: &'static str,
    /// Active records analyzed
    pub record_count: usize,
    /// Per-field figures keyed by Clark tag, in first-seen order
    pub fields: IndexMap<String, FieldReport>,
    /// Completeness scores
    pub completeness: CompletenessScores,
}

impl StatsReport {
    /// Assemble a report from accumulated statistics and their scores.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NoRecords`] for an empty aggregate.
    pub fn new(
        schema: MetadataSchema,
        stats: &AggregateStats,
        completeness: CompletenessScores,
    ) -> Result<Self> {
        let averages = stats.averages()?;
        let mut fields = IndexMap::with_capacity(stats.field_info.len());
        for (tag, field) in &stats.field_info {
            let average = averages[tag.as_str()];
            fields.insert(
                tag.clone(),
                FieldReport {
                    field_count: field.field_count,
                    field_count_total: field.field_count_total,
                    presence_percent: stats.presence_percent(tag)?,
                    field_count_total_average: average.field_count_total_average,
                    field_count_element_average: average.field_count_element_average,
                },
            );
        }
        Ok(StatsReport {
            schema: schema.name(),
            record_count: stats.record_count,
            fields,
            completeness,
        })
    }

    /// Pretty-printed JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Output`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HarvestError::Output(format!("Failed to serialize stats: {e}")))
    }
}

/// Render the presence table and completeness scores as fixed-width text.
///
/// Fields of the schema vocabulary come first in vocabulary order, followed
/// by any other observed tags in first-seen order. Each row shows a bar with
/// one `=` per 4 percent, the `count/record_count` ratio and the percentage.
///
/// # Errors
///
/// Returns [`HarvestError::NoRecords`] for an empty aggregate.
pub fn format_stats_table(
    schema: MetadataSchema,
    stats: &AggregateStats,
    completeness: &CompletenessScores,
) -> Result<String> {
    if stats.is_empty() {
        return Err(HarvestError::NoRecords);
    }
    let record_count = stats.record_count;
    let width = stats.field_info.keys().map(String::len).max().unwrap_or(0);

    let vocabulary_tags: Vec<String> = schema.vocabulary().iter().map(|f| schema.tag(f)).collect();
    let ordered = vocabulary_tags
        .iter()
        .filter(|tag| stats.field_info.contains_key(tag.as_str()))
        .chain(
            stats
                .field_info
                .keys()
                .filter(|tag| !vocabulary_tags.contains(tag)),
        );

    let mut output = String::from("\n\n");
    for tag in ordered {
        let field_count = stats.field_info[tag.as_str()].field_count;
        let percent = stats.presence_percent(tag)?;
        let bar = "=".repeat(bar_marks(percent));
        writeln!(
            output,
            "{tag:>width$}: |{bar:<BAR_WIDTH$}| {field_count:6}/{record_count} | {percent:>6.2}%"
        )
        .ok();
    }

    output.push_str("\n\n");
    let rows = [
        ("dc_completeness", Some(completeness.dc_completeness)),
        ("collection_completeness", completeness.collection_completeness),
        ("wwww_completeness", Some(completeness.wwww_completeness)),
        ("average_completeness", Some(completeness.average_completeness)),
    ];
    for (name, value) in rows {
        match value {
            Some(value) => writeln!(output, "{name:>23} {value:10.2}").ok(),
            None => writeln!(output, "{name:>23} {:>10}", "n/a").ok(),
        };
    }
    Ok(output)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_marks(percent: f64) -> usize {
    (percent.trunc() as usize) / PERCENT_PER_BAR_MARK
}

//! Command-line interface.
//!
//! [`Args`] is the clap definition of the `repoinv` binary; [`Args::to_config`]
//! resolves the flags into a validated [`RunConfig`] and [`run`] wires the
//! reader, the pipeline and stdout together.

use crate::completeness::DcNumerator;
use crate::error::Result;
use crate::extract::MetadataSchema;
use crate::pipeline::{self, Mode, RunConfig, RunSummary, StatsFormat};
use crate::reader::OaiReader;
use crate::recovery::RecoveryMode;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Inspect the metadata of an OAI-PMH repository dump.
///
/// Prints the values of one element, a per-record presence flag, a full
/// field dump, or presence statistics with completeness scores.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "repoinv",
    version,
    about = "Inspect the metadata of an OAI-PMH repository dump",
    long_about = "Streams an OAI-PMH dump (plain or gzip compressed) and prints the values of one \
                  metadata element, a presence flag per record, every field of every record, or \
                  repository statistics with completeness scores. Deleted records are ignored."
)]
pub struct Args {
    /// OAI-PMH dump to read (plain XML or .gz)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Metadata schema of the record payloads
    #[arg(long, value_enum, default_value_t = MetadataSchema::DublinCore)]
    pub schema: MetadataSchema,

    /// Element to analyze
    #[arg(short = 'e', long = "element", value_name = "NAME")]
    pub element: Option<String>,

    /// Only print values carrying this qualifier
    #[arg(short = 'q', long = "qualifier", value_name = "Q")]
    pub qualifier: Option<String>,

    /// Prefix each value with the record id
    #[arg(short = 'i', long = "id")]
    pub id: bool,

    /// Prefix each value with its qualifier
    #[arg(short = 'a', long = "add-qualifier")]
    pub add_qualifier: bool,

    /// Print whether each record has the element
    #[arg(short = 'p', long = "present")]
    pub present: bool,

    /// Dump every field of every record
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Print repository statistics
    #[arg(short = 's', long = "stats")]
    pub stats: bool,

    /// Rendering of the statistics
    #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
    pub format: StatsFormat,

    /// Skip records without identifier instead of aborting
    #[arg(long = "skip-missing-ids")]
    pub skip_missing_ids: bool,

    /// Stop after this many records
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Count only the canonical Dublin Core elements in the dc completeness score
    #[arg(long = "canonical-only")]
    pub canonical_only: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Output mode selected by the flags.
    ///
    /// Dump wins over presence, presence over values. Without an element,
    /// or with `--stats`, statistics are produced.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.dump {
            Mode::Dump
        } else if self.stats || self.element.is_none() {
            Mode::Stats
        } else if self.present {
            Mode::Presence
        } else {
            Mode::Values
        }
    }

    /// Log level implied by `-v` and `--quiet`.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Resolve the flags into a validated [`RunConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarvestError::UnknownField`] if the element is not
    /// part of the schema vocabulary.
    pub fn to_config(&self) -> Result<RunConfig> {
        let mut builder = RunConfig::builder(self.schema)
            .mode(self.mode())
            .with_id(self.id)
            .with_qualifier(self.add_qualifier)
            .stats_format(self.format)
            .max_records(self.limit)
            .recovery(if self.skip_missing_ids {
                RecoveryMode::Lenient
            } else {
                RecoveryMode::Strict
            })
            .dc_numerator(if self.canonical_only {
                DcNumerator::CanonicalOnly
            } else {
                DcNumerator::AllObserved
            });
        if let Some(element) = &self.element {
            builder = builder.field(element);
        }
        if let Some(qualifier) = &self.qualifier {
            builder = builder.qualifier(qualifier);
        }
        builder.build()
    }
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` takes precedence over the level derived from the flags.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repoinv={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Run the command described by `args`, writing to stdout.
///
/// # Errors
///
/// Propagates configuration, input and output errors.
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = args.to_config()?;
    let reader = OaiReader::from_path(&args.file)?;
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    pipeline::run(&config, reader, out)
}

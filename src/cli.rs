use crate::adapters::sink::jsonl::JsonLinesSink;
use crate::adapters::tree::loader::JsonUnitSource;
use crate::app::dto::IndexSummary;
use crate::app::engine::IndexEngine;
use crate::config::{IndexerConfig, JvmMode};
use crate::domain::ports::UnitSource;
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// sgtool: semantic fact graphs from typed syntax trees
#[derive(Parser, Debug)]
#[command(name = "sgtool")]
#[command(about = "Emit semantic graph facts for typed compilation units", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a compilation unit and write JSON-lines facts
    Index {
        /// Typed-tree JSON file
        unit: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        options: IndexOptions,
    },
    /// Build the fact graph in memory and print a summary
    Graph {
        /// Typed-tree JSON file
        unit: PathBuf,

        #[command(flatten)]
        options: IndexOptions,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct IndexOptions {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Binary-level linking mode
    #[arg(long, value_enum)]
    pub jvm_mode: Option<JvmMode>,

    /// Reference foreign symbols through binary-level nodes
    #[arg(long, default_value_t = false)]
    pub emit_jvm_references: bool,

    /// Only call anchors get scope edges
    #[arg(long, default_value_t = false)]
    pub no_anchor_scopes: bool,

    /// Log warnings for every unresolved construct
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl IndexOptions {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<IndexerConfig> {
        let mut config = match &self.config {
            Some(path) => IndexerConfig::from_file(path)?,
            None => IndexerConfig::default(),
        };
        if let Some(mode) = self.jvm_mode {
            config.jvm_mode = mode;
        }
        if self.emit_jvm_references {
            config.emit_jvm_references = true;
        }
        if self.no_anchor_scopes {
            config.emit_anchor_scopes = false;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        Ok(config)
    }
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Runs the parsed command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index { unit, out, options } => {
            let summary = index_to_output(&unit, out.as_deref(), &options)?;
            let json = serde_json::to_string_pretty(&summary)?;
            eprintln!("{json}");
            Ok(())
        }
        Commands::Graph { unit, options } => print_graph_report(&unit, &options),
    }
}

/// Indexes `unit_path`, writing facts to `out` or stdout.
pub fn index_to_output(
    unit_path: &Path,
    out: Option<&Path>,
    options: &IndexOptions,
) -> Result<IndexSummary> {
    let config = options.resolve_config()?;
    let unit = JsonUnitSource::new(unit_path).load()?;
    let engine = IndexEngine::new(config);

    let writer: Box<dyn Write + Send> = match out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let sink = JsonLinesSink::new(writer);
    let summary = engine.index_unit(&unit, &sink)?;
    let (facts, edges) = sink.counts();
    sink.finish()?;

    Ok(IndexSummary::new(&unit.source.path, &summary, facts, edges))
}

/// Builds the in-memory graph of `unit_path` and prints its report as pretty JSON.
pub fn print_graph_report(unit_path: &Path, options: &IndexOptions) -> Result<()> {
    let config = options.resolve_config()?;
    let unit = JsonUnitSource::new(unit_path).load()?;
    let report = IndexEngine::new(config).graph_report(&unit)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

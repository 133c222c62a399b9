use crate::adapters::doc::javadoc::JavadocScanner;
use crate::adapters::fs::reader::FileSourceReader;
use crate::adapters::jvm::mapper::JvmDescriptorMapper;
use crate::adapters::metadata::json::JsonMetadataLoader;
use crate::adapters::signature::qualified::QualifiedNameSignatures;
use crate::app::dto::GraphReport;
use crate::config::IndexerConfig;
use crate::domain::graph::FactGraph;
use crate::domain::ports::{
    BinaryMapper, DocCommentScanner, FactSink, MetadataLoader, SignatureGenerator, UnitSource,
};
use crate::domain::scanner::{ScanSummary, Scanner};
use crate::domain::stats::Statistics;
use crate::domain::tree::CompilationUnit;
use anyhow::{Context as _, Result};
use tracing::info;

/// Indexes compilation units with one set of collaborators.
///
/// Each call gets its own [`Scanner`]; the engine itself holds no per-unit state, so one
/// engine may index units from several threads.
pub struct IndexEngine {
    config: IndexerConfig,
    signatures: Box<dyn SignatureGenerator>,
    binary: Box<dyn BinaryMapper>,
    doc_scanner: Box<dyn DocCommentScanner>,
    metadata_loader: Box<dyn MetadataLoader>,
}

impl IndexEngine {
    pub fn new(config: IndexerConfig) -> Self {
        let binary = Box::new(JvmDescriptorMapper::new(config.corpus.clone()));
        Self {
            config,
            signatures: Box::new(QualifiedNameSignatures::new()),
            binary,
            doc_scanner: Box::new(JavadocScanner::new()),
            metadata_loader: Box::new(JsonMetadataLoader::new(FileSourceReader::new())),
        }
    }

    pub fn with_signatures(mut self, signatures: Box<dyn SignatureGenerator>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn with_binary_mapper(mut self, binary: Box<dyn BinaryMapper>) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_doc_scanner(mut self, doc_scanner: Box<dyn DocCommentScanner>) -> Self {
        self.doc_scanner = doc_scanner;
        self
    }

    pub fn with_metadata_loader(mut self, loader: Box<dyn MetadataLoader>) -> Self {
        self.metadata_loader = loader;
        self
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Emits the facts of one unit into `sink`.
    pub fn index_unit(&self, unit: &CompilationUnit, sink: &dyn FactSink) -> Result<ScanSummary> {
        let summary = Scanner::new(&self.config, unit, sink, self.signatures.as_ref())
            .with_doc_scanner(self.doc_scanner.as_ref())
            .with_metadata_loader(self.metadata_loader.as_ref())
            .with_binary_mapper(self.binary.as_ref())
            .scan_unit()
            .with_context(|| format!("Failed to index {}", unit.source.path))?;

        info!(
            path = %unit.source.path,
            nodes = summary.nodes_created,
            diagnostics = summary.statistics.get(Statistics::DIAGNOSTICS),
            metadata_files = summary.metadata_files.len(),
            "indexed compilation unit"
        );
        Ok(summary)
    }

    /// Loads a unit from `source` and indexes it.
    pub fn index_source(&self, source: &dyn UnitSource, sink: &dyn FactSink) -> Result<ScanSummary> {
        let unit = source.load().context("Failed to load compilation unit")?;
        self.index_unit(&unit, sink)
    }

    /// Indexes a unit into a fresh in-memory graph.
    pub fn build_graph(&self, unit: &CompilationUnit) -> Result<(FactGraph, ScanSummary)> {
        let graph = FactGraph::new();
        let summary = self.index_unit(unit, &graph)?;
        Ok((graph, summary))
    }

    /// Indexes a unit and summarizes the resulting graph.
    pub fn graph_report(&self, unit: &CompilationUnit) -> Result<GraphReport> {
        let (graph, summary) = self.build_graph(unit)?;
        Ok(GraphReport::from_graph(&unit.source.path, &graph, &summary))
    }
}

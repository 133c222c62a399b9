use crate::domain::graph::FactGraph;
use crate::domain::node::{NodeKind, facts};
use crate::domain::scanner::ScanSummary;
use crate::domain::stats::Statistics;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of `sgtool index`, printed to stderr.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub path: String,
    pub file_node: String,
    pub nodes_created: usize,
    pub facts_written: usize,
    pub edges_written: usize,
    pub metadata_files: Vec<String>,
    pub statistics: Statistics,
}

impl IndexSummary {
    pub fn new(path: &str, summary: &ScanSummary, facts_written: usize, edges_written: usize) -> Self {
        Self {
            path: path.to_string(),
            file_node: summary.file.to_string(),
            nodes_created: summary.nodes_created,
            facts_written,
            edges_written,
            metadata_files: summary
                .metadata_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            statistics: summary.statistics.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticDto {
    pub id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

/// Result of `sgtool graph`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub path: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
    pub diagnostics: Vec<DiagnosticDto>,
    pub statistics: Statistics,
}

impl GraphReport {
    pub fn from_graph(path: &str, graph: &FactGraph, summary: &ScanSummary) -> Self {
        let diagnostics = graph
            .nodes_of_kind(NodeKind::Diagnostic)
            .into_iter()
            .map(|id| DiagnosticDto {
                message: graph.fact(&id, facts::MESSAGE).unwrap_or_default(),
                details: graph.fact(&id, facts::DETAILS),
                start: graph.fact(&id, facts::LOC_START).and_then(|s| s.parse().ok()),
                end: graph.fact(&id, facts::LOC_END).and_then(|s| s.parse().ok()),
                id: id.to_string(),
            })
            .collect();
        Self {
            path: path.to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes_by_kind: graph.kind_histogram(),
            edges_by_kind: graph.edge_histogram(),
            diagnostics,
            statistics: summary.statistics.clone(),
        }
    }
}

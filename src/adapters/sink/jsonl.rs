use crate::domain::edge::Edge;
use crate::domain::node::NodeId;
use crate::domain::ports::FactSink;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::sync::Mutex;

/// One output line.
#[derive(Debug, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
enum Entry<'a> {
    Fact {
        source: &'a NodeId,
        name: &'a str,
        value: &'a str,
    },
    Edge {
        source: &'a NodeId,
        kind: &'a str,
        target: &'a NodeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        ordinal: Option<u32>,
    },
}

struct Inner<W> {
    writer: W,
    seen: HashSet<String>,
    facts: usize,
    edges: usize,
    error: Option<anyhow::Error>,
}

/// Fact sink writing one JSON object per line. Identical entries are written once.
///
/// Write errors are kept and reported by [`JsonLinesSink::finish`].
pub struct JsonLinesSink<W: Write + Send> {
    inner: Mutex<Inner<W>>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                writer,
                seen: HashSet::new(),
                facts: 0,
                edges: 0,
                error: None,
            }),
        }
    }

    /// (facts, edges) written so far.
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.inner.lock().unwrap();
        (inner.facts, inner.edges)
    }

    /// Flushes and returns the writer, or the first write error.
    pub fn finish(self) -> Result<W> {
        let mut inner = self.inner.into_inner().unwrap();
        if let Some(e) = inner.error.take() {
            return Err(e);
        }
        inner.writer.flush().context("Failed to flush fact output")?;
        Ok(inner.writer)
    }

    fn write_entry(&self, entry: &Entry<'_>, is_edge: bool) {
        let mut inner = self.inner.lock().unwrap();
        if inner.error.is_some() {
            return;
        }
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                inner.error = Some(anyhow::Error::new(e).context("Failed to encode fact"));
                return;
            }
        };
        if !inner.seen.insert(line.clone()) {
            return;
        }
        if let Err(e) = writeln!(inner.writer, "{line}") {
            inner.error = Some(anyhow::Error::new(e).context("Failed to write fact"));
            return;
        }
        if is_edge {
            inner.edges += 1;
        } else {
            inner.facts += 1;
        }
    }
}

impl<W: Write + Send> FactSink for JsonLinesSink<W> {
    fn emit_fact(&self, node: &NodeId, name: &str, value: &str) {
        self.write_entry(
            &Entry::Fact {
                source: node,
                name,
                value,
            },
            false,
        );
    }

    fn emit_edge(&self, edge: &Edge) {
        self.write_entry(
            &Entry::Edge {
                source: &edge.source,
                kind: edge.kind.as_str(),
                target: &edge.target,
                ordinal: edge.ordinal,
            },
            true,
        );
    }
}

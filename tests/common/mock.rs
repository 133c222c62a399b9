//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use semgraph::adapters::signature::qualified::QualifiedNameSignatures;
use semgraph::domain::comments::ScannedDoc;
use semgraph::domain::ports::{DocCommentScanner, SignatureGenerator, SourceReader};
use semgraph::domain::tree::{DocComment, SymbolId, SymbolTable};

/// Mock SourceReader that serves content from an in-memory map and records every read.
pub struct MockSourceReader {
    files: HashMap<PathBuf, String>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MockSourceReader {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
        self
    }

    /// Paths passed to `read`, in call order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl Default for MockSourceReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceReader for MockSourceReader {
    fn read(&self, path: &Path) -> Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Qualified-name signatures that fail for a chosen set of symbols.
pub struct FailingSignatures {
    inner: QualifiedNameSignatures,
    failing: HashSet<SymbolId>,
}

impl FailingSignatures {
    pub fn new(failing: impl IntoIterator<Item = SymbolId>) -> Self {
        Self {
            inner: QualifiedNameSignatures::new(),
            failing: failing.into_iter().collect(),
        }
    }
}

impl SignatureGenerator for FailingSignatures {
    fn signature(&self, symbols: &SymbolTable, symbol: SymbolId) -> Option<String> {
        if self.failing.contains(&symbol) {
            return None;
        }
        self.inner.signature(symbols, symbol)
    }
}

/// Doc scanner returning one fixed result and recording the syntactic paths it was given.
pub struct FixedDocScanner {
    doc: ScannedDoc,
    paths: Mutex<Vec<String>>,
}

impl FixedDocScanner {
    pub fn new(doc: ScannedDoc) -> Self {
        Self {
            doc,
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl DocCommentScanner for FixedDocScanner {
    fn scan(&self, path: &[&str], _comment: &DocComment) -> ScannedDoc {
        self.paths.lock().unwrap().push(path.join("/"));
        self.doc.clone()
    }
}

use crate::domain::comments::ScannedDoc;
use crate::domain::edge::Edge;
use crate::domain::jvm::{MethodType, ReferenceType};
use crate::domain::metadata::Metadata;
use crate::domain::node::NodeId;
use crate::domain::tree::{CompilationUnit, DocComment, SymbolId, SymbolTable};
use anyhow::Result;
use std::path::Path;

/// Typed-tree provider port (implemented by Infrastructure)
pub trait UnitSource {
    fn load(&self) -> Result<CompilationUnit>;
}

/// Stable identity strings for declaration symbols
pub trait SignatureGenerator: Send + Sync {
    /// Must return the same value for the same symbol on every call within a run.
    fn signature(&self, symbols: &SymbolTable, symbol: SymbolId) -> Option<String>;
}

/// Destination of emitted facts. Repeated identical facts must be idempotent.
pub trait FactSink: Send + Sync {
    fn emit_fact(&self, node: &NodeId, name: &str, value: &str);

    fn emit_edge(&self, edge: &Edge);
}

/// Projection of declarations onto binary-level descriptors.
pub trait BinaryMapper: Send + Sync {
    fn class_node(&self, class: &ReferenceType) -> NodeId;

    fn method_node(&self, class: &ReferenceType, name: &str, ty: &MethodType) -> NodeId;

    fn field_node(&self, class: &ReferenceType, name: &str) -> NodeId;

    fn parameter_node(
        &self,
        class: &ReferenceType,
        name: &str,
        ty: &MethodType,
        index: usize,
    ) -> NodeId;
}

/// Loader for generated-code metadata files
pub trait MetadataLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Metadata>;
}

/// Parser for structured documentation comments
pub trait DocCommentScanner: Send + Sync {
    /// `path` is the syntactic path of the documented declaration.
    fn scan(&self, path: &[&str], comment: &DocComment) -> ScannedDoc;
}

/// Source code reader port
pub trait SourceReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<String>;

    fn exists(&self, path: &Path) -> bool;
}

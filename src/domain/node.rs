use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::tree::{Symbol, SymbolKind};

/// Globally unique node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub signature: String,
    #[serde(default)]
    pub corpus: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub language: String,
}

impl NodeId {
    pub fn new(
        signature: impl Into<String>,
        corpus: impl Into<String>,
        path: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            signature: signature.into(),
            corpus: corpus.into(),
            path: path.into(),
            language: language.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}#{}#{}",
            self.corpus, self.language, self.path, self.signature
        )
    }
}

/// Node kind tag (the `node/kind` fact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // ============ Files & Anchors ============
    File,
    Anchor,

    // ============ Declarations ============
    Package,
    Record,
    Sum,
    Interface,
    Function,
    Variable,
    Constant,
    AbsVar,

    // ============ Types ============
    TApp,
    Abs,
    Builtin,
    Lambda,

    // ============ Auxiliary ============
    Diagnostic,
    Doc,
    Name,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Anchor => "anchor",
            NodeKind::Package => "package",
            NodeKind::Record => "record",
            NodeKind::Sum => "sum",
            NodeKind::Interface => "interface",
            NodeKind::Function => "function",
            NodeKind::Variable => "variable",
            NodeKind::Constant => "constant",
            NodeKind::AbsVar => "absvar",
            NodeKind::TApp => "tapp",
            NodeKind::Abs => "abs",
            NodeKind::Builtin => "tbuiltin",
            NodeKind::Lambda => "lambda",
            NodeKind::Diagnostic => "diagnostic",
            NodeKind::Doc => "doc",
            NodeKind::Name => "name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "file" => NodeKind::File,
            "anchor" => NodeKind::Anchor,
            "package" => NodeKind::Package,
            "record" => NodeKind::Record,
            "sum" => NodeKind::Sum,
            "interface" => NodeKind::Interface,
            "function" => NodeKind::Function,
            "variable" => NodeKind::Variable,
            "constant" => NodeKind::Constant,
            "absvar" => NodeKind::AbsVar,
            "tapp" => NodeKind::TApp,
            "abs" => NodeKind::Abs,
            "tbuiltin" => NodeKind::Builtin,
            "lambda" => NodeKind::Lambda,
            "diagnostic" => NodeKind::Diagnostic,
            "doc" => NodeKind::Doc,
            "name" => NodeKind::Name,
            _ => return None,
        };
        Some(kind)
    }

    /// Kind and subkind facts for a declaration symbol.
    pub fn of_symbol(symbol: &Symbol) -> (NodeKind, Option<&'static str>) {
        match symbol.kind {
            SymbolKind::Package => (NodeKind::Package, None),
            SymbolKind::Class => (NodeKind::Record, Some("class")),
            SymbolKind::Enum => (NodeKind::Sum, Some("enumClass")),
            SymbolKind::Interface => (NodeKind::Interface, None),
            SymbolKind::AnnotationType => (NodeKind::Interface, Some("annotation")),
            SymbolKind::Method => (NodeKind::Function, None),
            SymbolKind::Constructor => (NodeKind::Function, Some("constructor")),
            SymbolKind::Field => (NodeKind::Variable, Some("field")),
            SymbolKind::EnumConstant => (NodeKind::Constant, None),
            SymbolKind::LocalVariable => (NodeKind::Variable, Some("local")),
            SymbolKind::Parameter => (NodeKind::Variable, Some("local/parameter")),
            SymbolKind::ExceptionParameter => (NodeKind::Variable, Some("local/exception")),
            SymbolKind::ResourceVariable => (NodeKind::Variable, Some("local/resource")),
            SymbolKind::TypeParameter => (NodeKind::AbsVar, None),
            SymbolKind::Other => (NodeKind::Variable, None),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node handle together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl SemanticNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self { id, kind }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind == NodeKind::Diagnostic
    }
}

// ============ Fact names ============

pub mod facts {
    pub const NODE_KIND: &str = "node/kind";
    pub const SUBKIND: &str = "subkind";
    pub const LOC_START: &str = "loc/start";
    pub const LOC_END: &str = "loc/end";
    pub const SNIPPET_START: &str = "snippet/start";
    pub const SNIPPET_END: &str = "snippet/end";
    pub const TEXT: &str = "text";
    pub const TAG_STATIC: &str = "tag/static";
    pub const TAG_DEPRECATED: &str = "tag/deprecated";
    pub const INITIALIZER: &str = "initializer";
    pub const MESSAGE: &str = "message";
    pub const DETAILS: &str = "details";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in [NodeKind::Abs, NodeKind::Builtin, NodeKind::AbsVar, NodeKind::Doc] {
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::parse("bogus"), None);
    }

    #[test]
    fn symbol_kinds_map_to_node_kinds() {
        let ctor = Symbol::new("<init>", "p.A.<init>", SymbolKind::Constructor);
        assert_eq!(NodeKind::of_symbol(&ctor), (NodeKind::Function, Some("constructor")));
        let field = Symbol::new("x", "p.A.x", SymbolKind::Field);
        assert_eq!(NodeKind::of_symbol(&field), (NodeKind::Variable, Some("field")));
    }
}

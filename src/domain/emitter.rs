//! Node construction and fact emission for one file.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::domain::edge::{Edge, EdgeKind};
use crate::domain::node::{NodeId, NodeKind, SemanticNode, facts};
use crate::domain::ports::FactSink;
use crate::domain::tree::{NestingKind, Span, Symbol, SymbolKind};

/// Language tag of binary-level nodes.
pub const JVM_LANGUAGE: &str = "jvm";

/// Creates nodes exactly once per identifier and forwards facts to the sink.
pub struct FactEmitter<'a> {
    sink: &'a dyn FactSink,
    corpus: String,
    language: String,
    path: String,
    emitted: HashSet<NodeId>,
}

impl<'a> FactEmitter<'a> {
    pub fn new(
        sink: &'a dyn FactSink,
        corpus: impl Into<String>,
        language: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            corpus: corpus.into(),
            language: language.into(),
            path: path.into(),
            emitted: HashSet::new(),
        }
    }

    /// Number of distinct nodes created so far.
    pub fn node_count(&self) -> usize {
        self.emitted.len()
    }

    // ============ Raw facts ============

    pub fn emit_fact(&self, node: &NodeId, name: &str, value: &str) {
        self.sink.emit_fact(node, name, value);
    }

    pub fn emit_edge(&self, source: &NodeId, kind: EdgeKind, target: &NodeId) {
        self.sink
            .emit_edge(&Edge::new(source.clone(), kind, target.clone()));
    }

    pub fn emit_ordinal_edge(&self, source: &NodeId, kind: EdgeKind, target: &NodeId, ordinal: u32) {
        self.sink
            .emit_edge(&Edge::ordinal(source.clone(), kind, target.clone(), ordinal));
    }

    pub fn emit_ordinal_edges(&self, source: &NodeId, kind: EdgeKind, targets: &[NodeId]) {
        for (i, target) in targets.iter().enumerate() {
            self.emit_ordinal_edge(source, kind, target, i as u32);
        }
    }

    /// Emits the kind facts the first time `id` is seen. Returns whether the node is new.
    fn node_once(&mut self, id: &NodeId, kind: NodeKind, subkind: Option<&str>) -> bool {
        if !self.emitted.insert(id.clone()) {
            return false;
        }
        self.sink.emit_fact(id, facts::NODE_KIND, kind.as_str());
        if let Some(subkind) = subkind {
            self.sink.emit_fact(id, facts::SUBKIND, subkind);
        }
        true
    }

    fn local_id(&self, signature: String) -> NodeId {
        NodeId::new(signature, &self.corpus, &self.path, &self.language)
    }

    fn global_id(&self, signature: String) -> NodeId {
        NodeId::new(signature, &self.corpus, "", &self.language)
    }

    // ============ Files, packages, declarations ============

    pub fn new_file_node(&mut self, text: &str) -> SemanticNode {
        let id = NodeId::new("", &self.corpus, &self.path, "");
        if self.node_once(&id, NodeKind::File, None) {
            self.emit_fact(&id, facts::TEXT, text);
        }
        SemanticNode::new(id, NodeKind::File)
    }

    pub fn package_node(&mut self, qualified_name: &str) -> SemanticNode {
        let id = self.global_id(qualified_name.to_string());
        self.node_once(&id, NodeKind::Package, None);
        SemanticNode::new(id, NodeKind::Package)
    }

    /// Identifier of a declaration; symbols only visible inside this file are file-scoped.
    pub fn declaration_id(&self, symbol: &Symbol, signature: &str) -> NodeId {
        let file_scoped = matches!(
            symbol.kind,
            SymbolKind::LocalVariable
                | SymbolKind::Parameter
                | SymbolKind::ExceptionParameter
                | SymbolKind::ResourceVariable
        ) || matches!(symbol.nesting, NestingKind::Local | NestingKind::Anonymous);
        if file_scoped {
            self.local_id(signature.to_string())
        } else {
            self.global_id(signature.to_string())
        }
    }

    /// Declaration node for `symbol`, with an optional initializer label.
    pub fn declaration_node(
        &mut self,
        symbol: &Symbol,
        signature: &str,
        initializer: Option<&str>,
    ) -> SemanticNode {
        let id = self.declaration_id(symbol, signature);
        let (kind, subkind) = NodeKind::of_symbol(symbol);
        if self.node_once(&id, kind, subkind)
            && let Some(init) = initializer
        {
            self.emit_fact(&id, facts::INITIALIZER, init);
        }
        SemanticNode::new(id, kind)
    }

    // ============ Anchors ============

    /// Anchor over `span`, or `None` if the span is invalid.
    pub fn new_anchor(&mut self, span: Span, snippet: Option<Span>) -> Option<SemanticNode> {
        if !span.is_valid() {
            return None;
        }
        let id = self.local_id(format!("@{}:{}", span.start, span.end));
        if self.node_once(&id, NodeKind::Anchor, None) {
            self.emit_fact(&id, facts::LOC_START, &span.start.to_string());
            self.emit_fact(&id, facts::LOC_END, &span.end.to_string());
            if let Some(snippet) = snippet.filter(Span::is_valid) {
                self.emit_fact(&id, facts::SNIPPET_START, &snippet.start.to_string());
                self.emit_fact(&id, facts::SNIPPET_END, &snippet.end.to_string());
            }
        }
        Some(SemanticNode::new(id, NodeKind::Anchor))
    }

    // ============ Types ============

    pub fn new_builtin(&mut self, name: &str) -> SemanticNode {
        let id = NodeId::new(format!("{name}#builtin"), "", "", &self.language);
        self.node_once(&id, NodeKind::Builtin, None);
        SemanticNode::new(id, NodeKind::Builtin)
    }

    /// Type application `ctor<args...>`.
    pub fn new_tapp(&mut self, ctor: &NodeId, args: &[NodeId]) -> SemanticNode {
        let mut parts = vec![ctor];
        parts.extend(args);
        let id = self.global_id(composite_signature("tapp", &parts, &[]));
        if self.node_once(&id, NodeKind::TApp, None) {
            self.emit_ordinal_edge(&id, EdgeKind::Param, ctor, 0);
            for (i, arg) in args.iter().enumerate() {
                self.emit_ordinal_edge(&id, EdgeKind::Param, arg, i as u32 + 1);
            }
        }
        SemanticNode::new(id, NodeKind::TApp)
    }

    /// Function type `fn(ret, receiver, params...)`.
    pub fn new_function_type(&mut self, ret: &NodeId, receiver: &NodeId, params: &[NodeId]) -> SemanticNode {
        let fn_node = self.new_builtin("fn");
        let mut args = vec![ret.clone(), receiver.clone()];
        args.extend(params.iter().cloned());
        self.new_tapp(&fn_node.id, &args)
    }

    fn abs_id(&self, owner: &NodeId) -> NodeId {
        NodeId::new(
            composite_signature("abs", &[owner], &[]),
            &owner.corpus,
            &owner.path,
            &owner.language,
        )
    }

    /// Abstraction wrapping `owner` with ordered parameters.
    pub fn new_abs(&mut self, owner: &NodeId, params: &[NodeId]) -> SemanticNode {
        let id = self.abs_id(owner);
        self.node_once(&id, NodeKind::Abs, None);
        self.emit_edge(owner, EdgeKind::ChildOf, &id);
        self.emit_ordinal_edges(&id, EdgeKind::Param, params);
        SemanticNode::new(id, NodeKind::Abs)
    }

    /// The abstraction node of `owner`, without parameter facts.
    pub fn abs_ref(&mut self, owner: &NodeId) -> SemanticNode {
        let id = self.abs_id(owner);
        self.node_once(&id, NodeKind::Abs, None);
        SemanticNode::new(id, NodeKind::Abs)
    }

    /// Anonymous type variable for a wildcard at `syntax_path`.
    pub fn new_wildcard(&mut self, syntax_path: &str, span: Span) -> SemanticNode {
        let position = format!("{}:{}", span.start, span.end);
        let id = self.local_id(composite_signature(
            "wildcard",
            &[],
            &[syntax_path, &position],
        ));
        self.node_once(&id, NodeKind::AbsVar, None);
        SemanticNode::new(id, NodeKind::AbsVar)
    }

    pub fn new_lambda(&mut self, span: Span) -> SemanticNode {
        let position = format!("{}:{}", span.start, span.end);
        let id = self.local_id(composite_signature("lambda", &[], &[&position]));
        self.node_once(&id, NodeKind::Lambda, None);
        SemanticNode::new(id, NodeKind::Lambda)
    }

    // ============ Documentation & diagnostics ============

    /// Documentation node with bracketed `text` whose links resolve to `params`.
    pub fn new_doc(&mut self, subkind: Option<&str>, text: &str, params: &[NodeId]) -> SemanticNode {
        let refs: Vec<&NodeId> = params.iter().collect();
        let id = self.local_id(composite_signature(
            "doc",
            &refs,
            &[subkind.unwrap_or(""), text],
        ));
        if self.node_once(&id, NodeKind::Doc, subkind) {
            self.emit_fact(&id, facts::TEXT, text);
            self.emit_ordinal_edges(&id, EdgeKind::Param, params);
        }
        SemanticNode::new(id, NodeKind::Doc)
    }

    pub fn new_diagnostic(
        &mut self,
        message: &str,
        details: Option<&str>,
        span: Option<Span>,
    ) -> SemanticNode {
        let location = span
            .map(|s| format!("{}:{}", s.start, s.end))
            .unwrap_or_default();
        let id = self.local_id(composite_signature(
            "diagnostic",
            &[],
            &[message, details.unwrap_or(""), &location],
        ));
        if self.node_once(&id, NodeKind::Diagnostic, None) {
            self.emit_fact(&id, facts::MESSAGE, message);
            if let Some(details) = details {
                self.emit_fact(&id, facts::DETAILS, details);
            }
            if let Some(span) = span {
                self.emit_fact(&id, facts::LOC_START, &span.start.to_string());
                self.emit_fact(&id, facts::LOC_END, &span.end.to_string());
            }
        }
        SemanticNode::new(id, NodeKind::Diagnostic)
    }

    // ============ Binary-level nodes ============

    /// Name node for a binary class name.
    pub fn jvm_name_node(&mut self, binary_name: &str) -> SemanticNode {
        let id = NodeId::new(binary_name, "", "", JVM_LANGUAGE);
        self.node_once(&id, NodeKind::Name, None);
        SemanticNode::new(id, NodeKind::Name)
    }

    /// Registers a node produced by the binary mapper.
    pub fn binary_node(&mut self, id: NodeId, kind: NodeKind, subkind: Option<&str>) -> SemanticNode {
        self.node_once(&id, kind, subkind);
        SemanticNode::new(id, kind)
    }
}

/// Deterministic signature of a composite node.
pub fn composite_signature(tag: &str, parts: &[&NodeId], extra: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    for part in parts {
        hasher.update(b"\n");
        hasher.update(part.to_string().as_bytes());
    }
    for value in extra {
        hasher.update(b"\n");
        hasher.update(value.as_bytes());
    }
    let result = hasher.finalize();
    format!("{tag}_{}", hex::encode(&result[..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::FactGraph;

    #[test]
    fn invalid_spans_never_become_anchors() {
        let graph = FactGraph::new();
        let mut emitter = FactEmitter::new(&graph, "c", "java", "A.java");
        assert!(emitter.new_anchor(Span::new(5, 2), None).is_none());
        assert!(emitter.new_anchor(Span::ABSENT, None).is_none());
        assert!(emitter.new_anchor(Span::new(-1, 3), None).is_none());
        assert_eq!(graph.node_count(), 0);

        let anchor = emitter.new_anchor(Span::new(3, 3), None).unwrap();
        assert_eq!(anchor.id.signature, "@3:3");
        assert_eq!(graph.fact(&anchor.id, facts::LOC_END).as_deref(), Some("3"));
    }

    #[test]
    fn nodes_are_created_once() {
        let graph = FactGraph::new();
        let mut emitter = FactEmitter::new(&graph, "c", "java", "A.java");
        let a = emitter.new_builtin("int");
        let b = emitter.new_builtin("int");
        assert_eq!(a, b);
        assert_eq!(emitter.node_count(), 1);
    }

    #[test]
    fn abs_reference_matches_definition() {
        let graph = FactGraph::new();
        let mut emitter = FactEmitter::new(&graph, "c", "java", "A.java");
        let owner = NodeId::new("p.Map", "c", "", "java");
        let param = NodeId::new("p.Map~K", "c", "", "java");
        let defined = emitter.new_abs(&owner, std::slice::from_ref(&param));
        let referenced = emitter.abs_ref(&owner);
        assert_eq!(defined.id, referenced.id);
        assert!(graph.has_edge(&owner, EdgeKind::ChildOf, &defined.id));
    }

    #[test]
    fn composite_signatures_are_deterministic() {
        let a = NodeId::new("x", "", "", "java");
        let b = NodeId::new("y", "", "", "java");
        assert_eq!(
            composite_signature("tapp", &[&a, &b], &[]),
            composite_signature("tapp", &[&a, &b], &[])
        );
        assert_ne!(
            composite_signature("tapp", &[&a, &b], &[]),
            composite_signature("tapp", &[&b, &a], &[])
        );
    }
}

//! Tree-to-graph traversal.
//!
//! One [`Scanner`] owns everything that is per compilation unit: the comment claim table,
//! loaded metadata rules, cached well-known nodes and statistics. Facts go straight to the
//! [`FactSink`]; nothing is retained beyond the node-creation set.

mod anchors;
mod decls;
mod docs;
mod exprs;
mod generics;
mod xref;

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{IndexerConfig, JvmMode};
use crate::domain::anchor::Positions;
use crate::domain::comments::CommentClaimTable;
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::emitter::FactEmitter;
use crate::domain::metadata::Metadata;
use crate::domain::node::{NodeId, SemanticNode};
use crate::domain::ports::{BinaryMapper, DocCommentScanner, FactSink, MetadataLoader, SignatureGenerator};
use crate::domain::stats::Statistics;
use crate::domain::tree::{CompilationUnit, DocComment, Span, SymbolTable, Tree, TreeKind};

/// Result of scanning one construct: the node it denotes, the wildcard captures found
/// beneath it, and (for variables) the node of its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanNode {
    pub node: SemanticNode,
    pub wildcards: Vec<NodeId>,
    pub ty: Option<Box<ScanNode>>,
}

impl ScanNode {
    pub fn new(node: SemanticNode) -> Self {
        Self {
            node,
            wildcards: Vec::new(),
            ty: None,
        }
    }

    pub fn with_wildcards(node: SemanticNode, wildcards: Vec<NodeId>) -> Self {
        Self {
            node,
            wildcards,
            ty: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.node.id
    }

    pub fn is_diagnostic(&self) -> bool {
        self.node.is_diagnostic()
    }
}

/// Outcome of a unit traversal.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub file: NodeId,
    pub statistics: Statistics,
    pub metadata_files: Vec<PathBuf>,
    pub nodes_created: usize,
}

pub struct Scanner<'a> {
    config: &'a IndexerConfig,
    unit: &'a CompilationUnit,
    symbols: &'a SymbolTable,
    positions: Positions<'a>,
    emitter: FactEmitter<'a>,
    signatures: &'a dyn SignatureGenerator,
    binary: Option<&'a dyn BinaryMapper>,
    doc_scanner: Option<&'a dyn DocCommentScanner>,
    metadata_loader: Option<&'a dyn MetadataLoader>,
    claims: CommentClaimTable,
    doc_comments: HashMap<i64, &'a DocComment>,
    metadata: Vec<Metadata>,
    metadata_files: Vec<PathBuf>,
    stats: Statistics,
    object_node: Option<ScanNode>,
    enum_abs: Option<ScanNode>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &'a IndexerConfig,
        unit: &'a CompilationUnit,
        sink: &'a dyn FactSink,
        signatures: &'a dyn SignatureGenerator,
    ) -> Self {
        let positions = Positions::new(&unit.source.text);
        let claims = CommentClaimTable::new(&unit.comments, &positions);
        let emitter = FactEmitter::new(
            sink,
            config.corpus.clone(),
            config.language.clone(),
            unit.source.path.clone(),
        );
        Self {
            config,
            unit,
            symbols: &unit.symbols,
            positions,
            emitter,
            signatures,
            binary: None,
            doc_scanner: None,
            metadata_loader: None,
            claims,
            doc_comments: HashMap::new(),
            metadata: Vec::new(),
            metadata_files: Vec::new(),
            stats: Statistics::new(),
            object_node: None,
            enum_abs: None,
        }
    }

    /// Parses documentation comments, when the unit retained them.
    pub fn with_doc_scanner(mut self, scanner: &'a dyn DocCommentScanner) -> Self {
        self.doc_scanner = Some(scanner);
        self
    }

    pub fn with_metadata_loader(mut self, loader: &'a dyn MetadataLoader) -> Self {
        self.metadata_loader = Some(loader);
        self
    }

    /// Binary mapper used in [`JvmMode::Semantic`]; ignored otherwise.
    pub fn with_binary_mapper(mut self, mapper: &'a dyn BinaryMapper) -> Self {
        if self.config.jvm_mode == JvmMode::Semantic {
            self.binary = Some(mapper);
        }
        self
    }

    /// Traverses the whole unit. Only a linkage mismatch with the tree provider is an error.
    pub fn scan_unit(mut self) -> Result<ScanSummary> {
        let unit = self.unit;
        if let Some(docs) = &unit.doc_comments {
            self.doc_comments = docs.iter().map(|d| (d.decl_pos, d)).collect();
        }
        let file = self.visit_top_level(&unit.root)?;
        Ok(ScanSummary {
            file: file.node.id,
            statistics: self.stats,
            metadata_files: self.metadata_files,
            nodes_created: self.emitter.node_count(),
        })
    }

    /// Dispatches on the construct kind.
    pub(super) fn scan(
        &mut self,
        tree: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        match &tree.kind {
            TreeKind::TopLevel { .. } => self.visit_top_level(tree).map(Some),
            TreeKind::Package {
                pid,
                symbol,
                annotations,
            } => self.visit_package(tree, pid, *symbol, annotations, owner),
            TreeKind::Import { qualid, .. } => self.scan(qualid, &owner.down_as_snippet(tree)),
            TreeKind::Ident { symbol, .. } => self.visit_ident(tree, *symbol, owner),
            TreeKind::Select { expr, name, symbol } => {
                self.visit_select(tree, expr, name, *symbol, owner)
            }
            TreeKind::ClassDef { .. } => self.visit_class_def(tree, owner),
            TreeKind::MethodDef { .. } => self.visit_method_def(tree, owner),
            TreeKind::VarDef { .. } => self.visit_var_def(tree, owner),
            TreeKind::TypeParameter {
                bounds,
                annotations,
                ..
            } => {
                self.scan_list(annotations, owner)?;
                self.scan_list(bounds, owner)?;
                Ok(None)
            }
            TreeKind::Lambda {
                params,
                body,
                targets,
            } => self.visit_lambda(tree, params, body, targets, owner),
            TreeKind::TypeApply { base, args } => self.visit_type_apply(tree, base, args, owner),
            TreeKind::MemberRef {
                qualifier,
                name,
                mode,
                symbol,
            } => self.visit_member_ref(tree, qualifier, name, *mode, *symbol, owner),
            TreeKind::Apply {
                method,
                args,
                type_args,
            } => self.visit_apply(tree, method, args, type_args, owner),
            TreeKind::NewClass { .. } => self.visit_new_class(tree, owner),
            TreeKind::PrimitiveType { tag } => self.visit_primitive_type(tree, *tag, owner),
            TreeKind::ArrayType { elem } => self.visit_array_type(tree, elem, owner),
            TreeKind::Annotation {
                annotation_type,
                args,
            } => {
                let ctx = owner.down(tree);
                self.scan_list(args, &ctx)?;
                self.scan(annotation_type, &ctx)
            }
            TreeKind::Wildcard { bound_kind, bound } => {
                self.visit_wildcard(tree, *bound_kind, bound.as_deref(), owner)
            }
            TreeKind::ExpressionStatement { expr } | TreeKind::Throw { expr } => {
                self.scan(expr, &owner.down_as_snippet(tree))
            }
            TreeKind::Return { expr } => self.scan_opt(expr.as_deref(), &owner.down_as_snippet(tree)),
            TreeKind::Assert { cond, detail } => {
                let ctx = owner.down_as_snippet(tree);
                let first = self.scan(cond, &ctx)?;
                let second = self.scan_opt(detail.as_deref(), &ctx)?;
                Ok(second.or(first))
            }
            TreeKind::Assign { lhs, rhs } | TreeKind::AssignOp { lhs, rhs } => {
                let ctx = owner.down_as_snippet(tree);
                let first = self.scan(lhs, &ctx)?;
                let second = self.scan(rhs, &ctx)?;
                Ok(second.or(first))
            }
            TreeKind::Literal { .. } => Ok(None),
            TreeKind::Block { statements } => {
                self.scan_list(statements, owner)?;
                Ok(None)
            }
            TreeKind::Other { children, .. } => {
                self.scan_list(children, owner)?;
                Ok(None)
            }
        }
    }

    pub(super) fn scan_opt(
        &mut self,
        tree: Option<&'a Tree>,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        match tree {
            Some(tree) => self.scan(tree, owner),
            None => Ok(None),
        }
    }

    pub(super) fn scan_list(
        &mut self,
        trees: &'a [Tree],
        owner: &TreeContext<'a>,
    ) -> Result<Vec<Option<ScanNode>>> {
        trees.iter().map(|t| self.scan(t, owner)).collect()
    }

    // ============ Edge helpers ============

    /// Emits `source -kind-> target` unless either end is a diagnostic.
    pub(super) fn link(&mut self, source: &SemanticNode, kind: EdgeKind, target: &SemanticNode) -> bool {
        if source.is_diagnostic() || target.is_diagnostic() {
            self.stats.increment(Statistics::REFUSED_DIAGNOSTIC_EDGES);
            debug!(edge = %kind, source = %source.id, target = %target.id, "refusing diagnostic edge");
            return false;
        }
        self.emitter.emit_edge(&source.id, kind, &target.id);
        true
    }

    pub(super) fn link_ordinal(
        &mut self,
        source: &SemanticNode,
        kind: EdgeKind,
        target: &SemanticNode,
        ordinal: usize,
    ) {
        if source.is_diagnostic() || target.is_diagnostic() {
            self.stats.increment(Statistics::REFUSED_DIAGNOSTIC_EDGES);
            debug!(edge = %kind, source = %source.id, target = %target.id, "refusing diagnostic edge");
            return;
        }
        self.emitter
            .emit_ordinal_edge(&source.id, kind, &target.id, ordinal as u32);
    }

    /// Ordinal edges to each target; positions of missing targets are kept.
    pub(super) fn link_ordinals(
        &mut self,
        source: &SemanticNode,
        kind: EdgeKind,
        targets: &[Option<SemanticNode>],
    ) {
        for (i, target) in targets.iter().enumerate() {
            if let Some(target) = target {
                self.link_ordinal(source, kind, target, i);
            }
        }
    }

    /// Diagnostic node spanning the context's tree, if it has a usable span.
    pub(super) fn emit_diagnostic(
        &mut self,
        ctx: Option<&TreeContext<'a>>,
        message: &str,
        details: Option<&str>,
    ) -> ScanNode {
        let span = ctx.and_then(|ctx| {
            let span = ctx.tree_span();
            if span.is_valid() {
                Some(span)
            } else if span.start >= 0 {
                Some(Span::new(span.start, span.start))
            } else {
                None
            }
        });
        self.stats.increment(Statistics::DIAGNOSTICS);
        ScanNode::new(self.emitter.new_diagnostic(message, details, span))
    }
}

use tracing::{debug, warn};

use super::Scanner;
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::node::SemanticNode;
use crate::domain::stats::Statistics;
use crate::domain::tree::Span;

impl<'a> Scanner<'a> {
    /// Anchor over `span`, or `None` unless the span lies within the file.
    pub(super) fn new_anchor(&mut self, span: Span, snippet: Option<Span>) -> Option<SemanticNode> {
        if !self.positions.is_anchorable(span) {
            debug!(start = span.start, end = span.end, "span is not anchorable");
            return None;
        }
        self.emitter.new_anchor(span, snippet)
    }

    /// Anchor over the context tree's span with an edge to `node`.
    pub(super) fn emit_anchor(
        &mut self,
        ctx: &TreeContext<'a>,
        kind: EdgeKind,
        node: &SemanticNode,
    ) -> Option<SemanticNode> {
        let anchor = self.new_anchor(ctx.tree_span(), ctx.snippet());
        let scope = ctx.scope();
        self.emit_anchor_edge(anchor, kind, node, scope.as_ref())
    }

    /// Anchor over the first occurrence of `name` at or after `start`.
    pub(super) fn emit_name_anchor(
        &mut self,
        name: &str,
        start: i64,
        kind: EdgeKind,
        node: &SemanticNode,
        snippet: Option<Span>,
        scope: Option<&SemanticNode>,
    ) -> Option<SemanticNode> {
        let span = self.positions.find_identifier(name, start)?;
        let anchor = self.new_anchor(span, snippet);
        self.emit_anchor_edge(anchor, kind, node, scope)
    }

    /// Edge from an anchor, plus its scope edge for calls or when anchor scopes are on.
    pub(super) fn emit_anchor_edge(
        &mut self,
        anchor: Option<SemanticNode>,
        kind: EdgeKind,
        node: &SemanticNode,
        scope: Option<&SemanticNode>,
    ) -> Option<SemanticNode> {
        if !kind.is_anchor_edge() {
            warn!(edge = %kind, "edge kind is not an anchor edge");
            return None;
        }
        let anchor = anchor?;
        if node.is_diagnostic() {
            self.stats.increment(Statistics::REFUSED_DIAGNOSTIC_EDGES);
            debug!(edge = %kind, target = %node.id, "refusing anchor edge to diagnostic");
            return Some(anchor);
        }
        self.emitter.emit_edge(&anchor.id, kind, &node.id);
        if (kind == EdgeKind::RefCall || self.config.emit_anchor_scopes)
            && let Some(scope) = scope
        {
            self.link(&anchor, EdgeKind::ChildOf, scope);
        }
        Some(anchor)
    }

    /// `defines/binding` anchor over `name`, plus any metadata rules for its span.
    pub(super) fn emit_defines_binding_anchor_edge(
        &mut self,
        ctx: &TreeContext<'a>,
        name: &str,
        start: i64,
        node: &SemanticNode,
    ) -> Option<SemanticNode> {
        let scope = ctx.scope();
        let anchor = self.emit_name_anchor(
            name,
            start,
            EdgeKind::DefinesBinding,
            node,
            ctx.snippet(),
            scope.as_ref(),
        );
        if let Some(span) = self.positions.find_identifier(name, start) {
            self.emit_metadata(span, node);
        }
        anchor
    }

    pub(super) fn emit_defines_binding_edge(
        &mut self,
        span: Span,
        anchor: Option<SemanticNode>,
        node: &SemanticNode,
        scope: Option<&SemanticNode>,
    ) {
        self.emit_metadata(span, node);
        self.emit_anchor_edge(anchor, EdgeKind::DefinesBinding, node, scope);
    }

    /// Applies metadata rules whose span equals `span` exactly.
    pub(super) fn emit_metadata(&mut self, span: Span, node: &SemanticNode) {
        for data in &self.metadata {
            for rule in data.rules_for_location(span.start) {
                if rule.end != span.end {
                    continue;
                }
                if rule.reverse {
                    self.emitter.emit_edge(&rule.vname, rule.edge, &node.id);
                } else {
                    self.emitter.emit_edge(&node.id, rule.edge, &rule.vname);
                }
            }
        }
    }
}

//! Type parameters and abstraction nodes.

use anyhow::Result;
use tracing::warn;

use super::Scanner;
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::node::{NodeId, SemanticNode};
use crate::domain::tree::{Tree, TreeKind};

impl<'a> Scanner<'a> {
    /// Builds the abstraction node of `owner` when it has type parameters or wildcard
    /// captures.
    ///
    /// The abstraction's parameters are the named type parameters in declaration order
    /// followed by `wildcards` in occurrence order. e.g.
    /// `<T> void foo(Ty<?> a, Obj<?, ?> b)` yields `[T, ?1, ?2, ?3]`.
    pub(super) fn define_type_parameters(
        &mut self,
        owner_ctx: &TreeContext<'a>,
        owner: &SemanticNode,
        params: &'a [Tree],
        wildcards: Vec<NodeId>,
    ) -> Result<Option<SemanticNode>> {
        if params.is_empty() && wildcards.is_empty() {
            return Ok(None);
        }
        let symbols = self.symbols;

        let mut type_params: Vec<NodeId> = Vec::with_capacity(params.len() + wildcards.len());
        for param in params {
            let TreeKind::TypeParameter {
                name,
                symbol,
                bounds,
                annotations,
            } = &param.kind
            else {
                warn!(kind = param.kind.label(), "unexpected type parameter tree");
                continue;
            };
            let ctx = owner_ctx.down(param);

            let node = symbol.and_then(|id| {
                let sym = symbols.get(id)?;
                let sig = self.signatures.signature(symbols, id)?;
                Some((sym, sig))
            });
            let Some((sym, signature)) = node else {
                warn!(name = %name, "could not get type parameter node");
                continue;
            };
            let node = self.emitter.declaration_node(sym, &signature, None);

            self.emit_defines_binding_anchor_edge(&ctx, name, param.span.start, &node);
            self.visit_annotations(&node, annotations, &ctx)?;
            type_params.push(node.id.clone());

            let mut bound_nodes: Vec<Option<SemanticNode>> = Vec::with_capacity(bounds.len().max(1));
            for bound in bounds {
                bound_nodes.push(self.scan(bound, &ctx)?.map(|b| b.node));
            }
            if bound_nodes.is_empty() {
                bound_nodes.push(Some(self.object_node().node));
            }
            self.link_ordinals(&node, EdgeKind::BoundedUpper, &bound_nodes);
        }

        type_params.extend(wildcards);
        Ok(Some(self.emitter.new_abs(&owner.id, &type_params)))
    }
}

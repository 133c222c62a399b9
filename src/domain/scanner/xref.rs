//! Cross-reference projection: which node stands for a referenced symbol.

use tracing::warn;

use super::{ScanNode, Scanner};
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::jvm::{ReferenceType, to_method_jvm_type};
use crate::domain::node::{NodeKind, SemanticNode};
use crate::domain::stats::Statistics;
use crate::domain::tree::{SymbolId, SymbolKind, TreeKind};

impl<'a> Scanner<'a> {
    /// Node for a symbol, or `None` if it has no identity.
    pub(super) fn get_node(&mut self, symbol: SymbolId) -> Option<SemanticNode> {
        let symbols = self.symbols;
        let sym = symbols.get(symbol)?;
        if sym.kind == SymbolKind::Package {
            return Some(self.emitter.package_node(&sym.qualified_name));
        }

        if self.config.emit_jvm_references
            && self.is_external(symbol)
            && let Some(node) = self.binary_reference(symbol)
        {
            return Some(node);
        }

        let signature = self.signatures.signature(symbols, symbol)?;
        Some(self.emitter.declaration_node(sym, &signature, None))
    }

    /// Binary-level node for a foreign symbol, so references resolve without a local
    /// declaration.
    fn binary_reference(&mut self, symbol: SymbolId) -> Option<SemanticNode> {
        let mapper = self.binary?;
        let symbols = self.symbols;
        let sym = symbols.get(symbol)?;
        let parent = || {
            sym.owner
                .and_then(|o| symbols.enclosing_class(o))
                .and_then(|c| symbols.get(c))
                .map(|c| ReferenceType::new(c.binary_name()))
        };

        if sym.kind.is_executable() {
            let method_type = match sym.erased_type.as_ref().map(to_method_jvm_type) {
                Some(Ok(t)) => t,
                Some(Err(e)) => {
                    warn!(symbol = %sym.qualified_name, error = %e, "cannot derive binary method type");
                    return None;
                }
                None => return None,
            };
            let id = mapper.method_node(&parent()?, &sym.name, &method_type);
            Some(self.emitter.binary_node(id, NodeKind::Function, None))
        } else if sym.kind.is_class_like() {
            let id = mapper.class_node(&ReferenceType::new(sym.binary_name()));
            Some(self.emitter.binary_node(id, NodeKind::Record, Some("class")))
        } else if sym.kind.is_field() {
            let id = mapper.field_node(&parent()?, &sym.name);
            Some(self.emitter.binary_node(id, NodeKind::Variable, Some("field")))
        } else {
            None
        }
    }

    /// Whether a symbol is defined outside this file and outside the platform.
    ///
    /// A heuristic: symbols compiled from other JVM languages that share the binary format
    /// are indistinguishable from symbols in other source files of the same compilation.
    pub(super) fn is_external(&self, symbol: SymbolId) -> bool {
        let symbols = self.symbols;
        let Some(class) = symbols.enclosing_class(symbol).and_then(|c| symbols.get(c)) else {
            return false;
        };
        class.source_file.as_deref() != Some(self.unit.source.path.as_str())
            && !symbols.is_platform(symbol)
    }

    /// Reference node for `symbol`, wrapped in its abstraction when a generic class is used
    /// as a parameterized type.
    pub(super) fn get_ref_node(&mut self, ctx: &TreeContext<'a>, symbol: SymbolId) -> Option<SemanticNode> {
        let in_generic_context = ctx
            .up()
            .is_some_and(|parent| matches!(parent.tree().kind, TreeKind::TypeApply { .. }));
        let node = self.get_node(symbol)?;
        let generic_class = self
            .symbols
            .get(symbol)
            .is_some_and(|s| s.kind.is_class_like() && !s.type_params.is_empty());
        if in_generic_context && generic_class && !node.is_diagnostic() {
            return Some(self.emitter.abs_ref(&node.id));
        }
        Some(node)
    }

    /// Reference anchor over the whole context tree.
    pub(super) fn emit_sym_usage(&mut self, ctx: &TreeContext<'a>, symbol: SymbolId) -> ScanNode {
        let Some(node) = self.get_ref_node(ctx, symbol) else {
            return self.emit_diagnostic(Some(ctx), "failed to resolve symbol reference", None);
        };
        self.emit_anchor(ctx, EdgeKind::Ref, &node);
        self.stats.increment(Statistics::SYMBOL_USAGES);
        ScanNode::new(node)
    }

    /// Anchor over `name` inside the context tree, with the given edge kind.
    pub(super) fn emit_name_usage(
        &mut self,
        ctx: &TreeContext<'a>,
        symbol: SymbolId,
        name: &str,
        kind: EdgeKind,
    ) -> ScanNode {
        let Some(node) = self.get_ref_node(ctx, symbol) else {
            return self.emit_diagnostic(Some(ctx), "failed to resolve symbol name", None);
        };
        // Without a real span the name search could land on text after this tree.
        if ctx.tree_span().is_valid_and_non_zero() {
            let scope = ctx.scope();
            self.emit_name_anchor(
                name,
                ctx.tree().preferred_position(),
                kind,
                &node,
                ctx.snippet(),
                scope.as_ref(),
            );
            self.stats.increment(Statistics::NAME_USAGES);
        }
        ScanNode::new(node)
    }

    /// Node for a platform class named in the configuration.
    fn resolve_platform_class(&mut self, qualified_name: &str) -> ScanNode {
        let symbols = self.symbols;
        let resolved = symbols
            .class_by_name(qualified_name)
            .and_then(|id| Some((symbols.get(id)?, self.signatures.signature(symbols, id)?)));
        match resolved {
            Some((sym, signature)) => ScanNode::new(self.emitter.declaration_node(sym, &signature, None)),
            // Usually a broken platform classpath upstream.
            None => self.emit_diagnostic(None, &format!("failed to resolve {qualified_name}"), None),
        }
    }

    /// The top object type, resolved once per unit.
    pub(super) fn object_node(&mut self) -> ScanNode {
        if let Some(node) = &self.object_node {
            return node.clone();
        }
        let name = self.config.platform.object_type.clone();
        let node = self.resolve_platform_class(&name);
        self.object_node = Some(node.clone());
        node
    }

    /// `Enum<E>` applied to `enum_node`.
    pub(super) fn enum_node(&mut self, enum_node: &SemanticNode) -> ScanNode {
        let abs = match &self.enum_abs {
            Some(abs) => abs.clone(),
            None => {
                let name = self.config.platform.enum_type.clone();
                let resolved = self.resolve_platform_class(&name);
                let abs = if resolved.is_diagnostic() {
                    resolved
                } else {
                    ScanNode::new(self.emitter.abs_ref(&resolved.node.id))
                };
                self.enum_abs = Some(abs.clone());
                abs
            }
        };
        if abs.is_diagnostic() {
            return abs;
        }
        let tapp = self
            .emitter
            .new_tapp(&abs.node.id, std::slice::from_ref(&enum_node.id));
        ScanNode::new(tapp)
    }
}

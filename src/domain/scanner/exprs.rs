//! Expressions and type references.

use anyhow::Result;
use tracing::warn;

use super::{ScanNode, Scanner};
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::node::NodeId;
use crate::domain::tree::{
    BoundKind, PrimitiveTag, ReferenceMode, Span, SymbolId, SymbolKind, Tree, TreeKind,
};

impl<'a> Scanner<'a> {
    pub(super) fn visit_ident(
        &mut self,
        tree: &'a Tree,
        symbol: Option<SymbolId>,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        let Some(symbol) = symbol else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing identifier symbol", None)));
        };
        Ok(Some(self.emit_sym_usage(&ctx, symbol)))
    }

    pub(super) fn visit_select(
        &mut self,
        tree: &'a Tree,
        expr: &'a Tree,
        name: &str,
        symbol: Option<SymbolId>,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        let symbols = self.symbols;

        let import = match &owner.tree().kind {
            TreeKind::Import { is_static, .. } => Some(*is_static),
            _ => None,
        };

        let mut symbol = symbol;
        if symbol.is_none() && import == Some(true) {
            // Static imports carry no symbol; resolve by name against the imported class.
            let selected = expr.qualified_text().unwrap_or_default();
            if let Some(class) = symbols.class_by_name(&format!("{selected}.{name}")) {
                symbol = Some(class);
            } else if let Some(class) = symbols.class_by_name(&selected) {
                let mut last = None;
                for member in symbols.members_named(class, name) {
                    let Some(member_sym) = symbols.get(member) else {
                        continue;
                    };
                    if !member_sym.is_static || !member_sym.accessible {
                        continue;
                    }
                    // Members whose types failed to complete are skipped.
                    if member_sym.incomplete {
                        continue;
                    }
                    last = Some(self.emit_name_usage(&ctx, member, name, EdgeKind::RefImports));
                }
                self.scan(expr, &ctx)?;
                return Ok(last);
            }
        }

        let Some(symbol) = symbol else {
            self.scan(expr, &ctx)?;
            if name == "*" {
                return Ok(None);
            }
            let message = format!(
                "Could not determine selected Symbol for {}",
                tree.qualified_text().unwrap_or_else(|| name.to_string())
            );
            if self.config.verbose_logging {
                warn!("{message}");
            }
            return Ok(Some(self.emit_diagnostic(Some(&ctx), &message, None)));
        };

        if let Some(sym) = symbols.get(symbol)
            && sym.kind == SymbolKind::Package
        {
            let pkg_node = self.emitter.package_node(&sym.qualified_name);
            self.emit_anchor(&ctx, EdgeKind::Ref, &pkg_node);
            return Ok(Some(ScanNode::new(pkg_node)));
        }

        self.scan(expr, &ctx)?;
        let kind = if import.is_some() {
            EdgeKind::RefImports
        } else {
            EdgeKind::Ref
        };
        Ok(Some(self.emit_name_usage(&ctx, symbol, name, kind)))
    }

    pub(super) fn visit_member_ref(
        &mut self,
        tree: &'a Tree,
        qualifier: &'a Tree,
        name: &str,
        mode: ReferenceMode,
        symbol: Option<SymbolId>,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        self.scan(qualifier, &ctx)?;
        let Some(symbol) = symbol else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "failed to resolve symbol name", None)));
        };
        let name = match mode {
            ReferenceMode::New => "new",
            ReferenceMode::Invoke => name,
        };
        Ok(Some(self.emit_name_usage(&ctx, symbol, name, EdgeKind::Ref)))
    }

    pub(super) fn visit_apply(
        &mut self,
        tree: &'a Tree,
        method: &'a Tree,
        args: &'a [Tree],
        type_args: &'a [Tree],
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        self.scan_list(args, &ctx)?;
        self.scan_list(type_args, &ctx)?;

        let Some(method) = self.scan(method, &ctx)? else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "error analyzing method", None)));
        };
        if method.is_diagnostic() {
            return Ok(Some(method));
        }
        self.emit_anchor(&ctx, EdgeKind::RefCall, &method.node);
        Ok(Some(method))
    }

    pub(super) fn visit_new_class(
        &mut self,
        tree: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let TreeKind::NewClass {
            ident,
            constructor,
            args,
            type_args,
            enclosing,
            body,
        } = &tree.kind
        else {
            return Ok(None);
        };
        let ctx = owner.down(tree);
        let symbols = self.symbols;

        let Some(ctor_node) = constructor.and_then(|c| self.get_node(c)) else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "error analyzing class", None)));
        };

        // "new Class" and "new Class(...)"
        let mut ref_span = Some(Span::new(tree.span.start, ident.span.end));
        let mut call_span = ref_span.map(|r| Span::new(r.start, tree.span.end));

        let parent = owner.tree();
        if let TreeKind::VarDef {
            name: constant_name,
            symbol: Some(var_symbol),
            ..
        } = &parent.kind
            && symbols
                .get(*var_symbol)
                .is_some_and(|s| s.kind == SymbolKind::EnumConstant)
        {
            // Enum constants: "NAME" and "NAME(...)"
            ref_span = self
                .positions
                .find_identifier(constant_name, parent.span.start);
            call_span = ref_span.map(|r| Span::new(r.start, parent.span.end));
        }

        let scope = ctx.scope();
        if let Some(span) = ref_span {
            let anchor = self.new_anchor(span, ctx.snippet());
            self.emit_anchor_edge(anchor, EdgeKind::Ref, &ctor_node, scope.as_ref());
        }
        if let Some(span) = call_span {
            let anchor = self.new_anchor(span, ctx.snippet());
            self.emit_anchor_edge(anchor, EdgeKind::RefCall, &ctor_node, scope.as_ref());
        }

        self.scan_list(type_args, &ctx)?;
        self.scan_list(args, &ctx)?;
        self.scan_opt(enclosing.as_deref(), &ctx)?;
        self.scan_opt(body.as_deref(), &ctx)?;
        self.scan(ident, &ctx)
    }

    pub(super) fn visit_type_apply(
        &mut self,
        tree: &'a Tree,
        base: &'a Tree,
        args: &'a [Tree],
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);

        let ctor = match self.scan(base, &ctx)? {
            Some(ctor) if ctor.is_diagnostic() => return Ok(Some(ctor)),
            Some(ctor) => ctor,
            None => {
                warn!(kind = base.kind.label(), "missing type constructor");
                return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing type constructor", None)));
            }
        };

        let arguments = self.scan_list(args, &ctx)?;
        let mut arg_ids: Vec<NodeId> = Vec::with_capacity(arguments.len());
        let mut wildcards: Vec<NodeId> = Vec::new();
        for argument in &arguments {
            match argument {
                Some(arg) if !arg.is_diagnostic() => {
                    arg_ids.push(arg.node.id.clone());
                    wildcards.extend(arg.wildcards.iter().cloned());
                }
                _ => {
                    return Ok(Some(self.emit_diagnostic(
                        Some(&ctx),
                        "unresolved type argument",
                        None,
                    )));
                }
            }
        }

        let tapp = self.emitter.new_tapp(&ctor.node.id, &arg_ids);
        self.emit_anchor(&ctx, EdgeKind::Ref, &tapp);
        Ok(Some(ScanNode::with_wildcards(tapp, wildcards)))
    }

    pub(super) fn visit_primitive_type(
        &mut self,
        tree: &'a Tree,
        tag: PrimitiveTag,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        if self.config.verbose_logging && tag == PrimitiveTag::Error {
            warn!(path = ?ctx.path(), "found primitive ERROR type");
        }
        let node = self.emitter.new_builtin(tag.name());
        self.emit_anchor(&ctx, EdgeKind::Ref, &node);
        Ok(Some(ScanNode::new(node)))
    }

    pub(super) fn visit_array_type(
        &mut self,
        tree: &'a Tree,
        elem: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        let elem_node = match self.scan(elem, &ctx)? {
            Some(e) if e.is_diagnostic() => return Ok(Some(e)),
            Some(e) => e,
            None => {
                return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing array element type", None)));
            }
        };
        let array = self.emitter.new_builtin("array");
        let tapp = self
            .emitter
            .new_tapp(&array.id, std::slice::from_ref(&elem_node.node.id));
        self.emit_anchor(&ctx, EdgeKind::Ref, &tapp);
        // Captures inside the element type still belong to the enclosing declaration.
        Ok(Some(ScanNode::with_wildcards(tapp, elem_node.wildcards)))
    }

    pub(super) fn visit_wildcard(
        &mut self,
        tree: &'a Tree,
        bound_kind: BoundKind,
        bound: Option<&'a Tree>,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        let node = self.emitter.new_wildcard(&owner.path().join("/"), tree.span);
        let mut wildcards = vec![node.id.clone()];

        if bound_kind != BoundKind::Unbounded
            && let Some(bound) = self.scan_opt(bound, &ctx)?
        {
            let kind = if bound_kind == BoundKind::Extends {
                EdgeKind::BoundedUpper
            } else {
                EdgeKind::BoundedLower
            };
            self.link(&node, kind, &bound.node);
            wildcards.extend(bound.wildcards);
        }
        Ok(Some(ScanNode::with_wildcards(node, wildcards)))
    }
}

//! Declarations: compilation unit, package, class, method, variable and lambda.

use anyhow::Result;
use tracing::warn;

use super::{ScanNode, Scanner};
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::jvm::{ReferenceType, to_method_jvm_type};
use crate::domain::node::{NodeId, NodeKind, SemanticNode, facts};
use crate::domain::stats::Statistics;
use crate::domain::tree::{
    ClassKind, FunctionalTargets, NestingKind, OverrideKind, Span, SymbolId, SymbolKind, Tree,
    TreeKind,
};

impl<'a> Scanner<'a> {
    pub(super) fn visit_top_level(&mut self, root: &'a Tree) -> Result<ScanNode> {
        let ctx = TreeContext::new(root);
        let unit = self.unit;
        let file = self.emitter.new_file_node(&unit.source.text);

        let (package, imports, decls) = match &root.kind {
            TreeKind::TopLevel {
                package,
                imports,
                decls,
            } => (package.as_deref(), imports.as_slice(), decls.as_slice()),
            _ => (None, &[][..], std::slice::from_ref(root)),
        };

        // Declarations first so the package node can adopt them once it resolves.
        let decl_nodes: Vec<ScanNode> = self.scan_list(decls, &ctx)?.into_iter().flatten().collect();

        if let Some(pkg) = self.scan_opt(package, &ctx)? {
            for decl in &decl_nodes {
                self.link(&decl.node, EdgeKind::ChildOf, &pkg.node);
            }
        }

        self.scan_list(imports, &ctx)?;
        Ok(ScanNode::new(file))
    }

    pub(super) fn visit_package(
        &mut self,
        tree: &'a Tree,
        pid: &'a Tree,
        symbol: Option<SymbolId>,
        annotations: &'a [Tree],
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(pid);
        let symbols = self.symbols;

        let name = symbol
            .and_then(|s| symbols.get(s))
            .map(|s| s.qualified_name.clone())
            .or_else(|| pid.qualified_text());
        let Some(name) = name else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing package name", None)));
        };
        let pkg_node = self.emitter.package_node(&name);

        let is_package_doc = self
            .unit
            .source
            .is_name_compatible(&self.config.platform.package_doc_file);
        let anchor_kind = if is_package_doc {
            EdgeKind::DefinesBinding
        } else {
            EdgeKind::Ref
        };
        self.emit_anchor(&ctx, anchor_kind, &pkg_node);

        self.visit_doc_comment(&ctx, tree, &pkg_node, None, None);
        self.visit_annotations(&pkg_node, annotations, &ctx)?;

        Ok(Some(ScanNode::new(pkg_node)))
    }

    pub(super) fn visit_class_def(
        &mut self,
        tree: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let TreeKind::ClassDef {
            name,
            symbol,
            class_kind,
            modifiers,
            type_params,
            extends,
            implements,
            members,
        } = &tree.kind
        else {
            return Ok(None);
        };

        self.load_annotations_from_class_decl(&modifiers.annotations);
        let ctx = owner.down(tree);
        let symbols = self.symbols;

        let resolved = symbol.and_then(|id| {
            let sym = symbols.get(id)?;
            let sig = self.signatures.signature(symbols, id)?;
            Some((sym, sig))
        });
        let Some((class_sym, signature)) = resolved else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing class signature", None)));
        };
        let class_node = self.emitter.declaration_node(class_sym, &signature, None);

        // Nested classes already get this edge from their enclosing class's member loop;
        // local classes in initializers only get it here.
        if let Some(scope) = ctx.scope() {
            self.link(&class_node, EdgeKind::ChildOf, &scope);
        }

        if !matches!(class_sym.nesting, NestingKind::Local | NestingKind::Anonymous) {
            match self.binary {
                Some(mapper) => {
                    let reference = ReferenceType::new(class_sym.binary_name());
                    let jvm = mapper.class_node(&reference);
                    let jvm_node = self.emitter.binary_node(jvm, NodeKind::Record, Some("class"));
                    self.link(&class_node, EdgeKind::Generates, &jvm_node);
                }
                None => {
                    let name_node = self.emitter.jvm_name_node(class_sym.binary_name());
                    self.link(&class_node, EdgeKind::Named, &name_node);
                }
            }
        }

        let class_ident = self
            .positions
            .find_identifier(name, tree.preferred_position());
        if !name.is_empty() && class_ident.is_none() {
            warn!(class = %class_sym.qualified_name, "missing span for class identifier");
        }

        // Class definitions contribute no wildcards.
        let abs_node = self.define_type_parameters(&ctx, &class_node, type_params, Vec::new())?;

        let documented =
            self.visit_doc_comment(&ctx, tree, &class_node, abs_node.as_ref(), Some(modifiers));

        let scope = ctx.scope();
        match (&abs_node, class_ident) {
            (Some(abs), ident) => {
                if let Some(span) = ident {
                    let anchor = self.new_anchor(span, ctx.snippet());
                    self.emit_defines_binding_edge(span, anchor, abs, scope.as_ref());
                }
                if !documented {
                    self.emit_comment(tree, abs);
                }
            }
            (None, Some(span)) => {
                let anchor = self.new_anchor(span, ctx.snippet());
                self.emit_defines_binding_edge(span, anchor, &class_node, scope.as_ref());
            }
            (None, None) => {}
        }
        self.emit_anchor(&ctx, EdgeKind::Defines, &class_node);
        if !documented {
            self.emit_comment(tree, &class_node);
        }

        self.visit_annotations(&class_node, &modifiers.annotations, &ctx)?;

        let mut super_class = self.scan_opt(extends.as_deref(), &ctx)?;
        if super_class.is_none() {
            super_class = match class_kind {
                ClassKind::Class => Some(self.object_node()),
                ClassKind::Enum => Some(self.enum_node(&class_node)),
                // Annotation supertypes are not modeled.
                ClassKind::AnnotationType => None,
                ClassKind::Interface => None,
            };
        }
        if let Some(super_class) = super_class {
            self.link(&class_node, EdgeKind::Extends, &super_class.node);
        }

        for implemented in implements {
            match self.scan(implemented, &ctx)? {
                Some(node) => {
                    self.link(&class_node, EdgeKind::Extends, &node.node);
                }
                None => {
                    self.stats.increment(Statistics::MISSING_IMPLEMENTS);
                    warn!(kind = implemented.kind.label(), "missing 'implements' node");
                }
            }
        }

        // Bind before visiting members so local and anonymous classes in initializers
        // find this class as their scope.
        let ctx = ctx.with_node(class_node.clone());
        for member in members {
            if let Some(n) = self.scan(member, &ctx)? {
                self.link(&n.node, EdgeKind::ChildOf, &class_node);
            }
        }

        Ok(Some(ScanNode::new(class_node)))
    }

    pub(super) fn visit_method_def(
        &mut self,
        tree: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let TreeKind::MethodDef {
            name,
            symbol,
            modifiers,
            type_params,
            return_type,
            params,
            throws,
            default_value,
            receiver,
            body,
        } = &tree.kind
        else {
            return Ok(None);
        };
        let ctx = owner.down(tree);
        let symbols = self.symbols;

        self.scan_list(throws, &ctx)?;
        self.scan_opt(default_value.as_deref(), &ctx)?;
        self.scan_opt(receiver.as_deref(), &ctx)?;

        let return_node = self.scan_opt(return_type.as_deref(), &ctx)?;
        let mut param_nodes: Vec<Option<ScanNode>> = Vec::with_capacity(params.len());
        let mut param_types: Vec<SemanticNode> = Vec::new();
        let mut wildcards: Vec<NodeId> = Vec::new();
        for param in params {
            let scanned = self.scan(param, &ctx)?;
            if let Some(n) = &scanned {
                match &n.ty {
                    Some(ty) => {
                        wildcards.extend(ty.wildcards.iter().cloned());
                        param_types.push(ty.node.clone());
                    }
                    None => {
                        warn!(method = %name, "missing parameter type");
                        wildcards.extend(n.wildcards.iter().cloned());
                    }
                }
            }
            param_nodes.push(scanned);
        }

        let resolved = symbol.and_then(|id| {
            let sym = symbols.get(id)?;
            let sig = self.signatures.signature(symbols, id)?;
            Some((id, sym, sig))
        });
        let Some((method_id, method_sym, signature)) = resolved else {
            // Locals inside an unresolvable method are still worth indexing.
            self.scan_opt(body.as_deref(), &ctx)?;
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing method signature", None)));
        };

        let method_node = self.emitter.declaration_node(method_sym, &signature, None);
        self.visit_annotations(&method_node, &modifiers.annotations, &ctx)?;

        let abs_node = self.define_type_parameters(&ctx, &method_node, type_params, wildcards)?;
        let documented =
            self.visit_doc_comment(&ctx, tree, &method_node, abs_node.as_ref(), Some(modifiers));

        if self.binary.is_some() {
            self.emit_method_generates(method_id, name, &method_node, &param_nodes);
        }

        let ret: Option<SemanticNode>;
        let binding_anchor: Option<SemanticNode>;
        if method_sym.kind == SymbolKind::Constructor {
            // Implicit constructors share their class's position; explicit ones come after it.
            if tree.preferred_position() > owner.tree().preferred_position() {
                let owner_name = method_sym
                    .owner
                    .and_then(|o| symbols.get(o))
                    .map(|o| o.name.as_str())
                    .unwrap_or_default();
                binding_anchor = self.emit_defines_binding_anchor_edge(
                    &ctx,
                    owner_name,
                    tree.preferred_position(),
                    &method_node,
                );
            } else {
                let pos = tree.preferred_position();
                let anchor = self.new_anchor(Span::new(pos, pos), ctx.snippet());
                self.emit_anchor_edge(anchor, EdgeKind::Defines, &method_node, ctx.scope().as_ref());
                binding_anchor = None;
            }
            // Constructors are typed as returning their class.
            ret = method_sym.owner.and_then(|o| self.get_node(o));
        } else {
            binding_anchor = self.emit_defines_binding_anchor_edge(
                &ctx,
                name,
                tree.preferred_position(),
                &method_node,
            );
            ret = return_node.as_ref().map(|r| r.node.clone());
        }

        if let Some(anchor) = binding_anchor {
            if !documented {
                self.emit_comment(tree, &method_node);
            }
            if let Some(abs) = &abs_node {
                self.emit_anchor_edge(Some(anchor), EdgeKind::DefinesBinding, abs, ctx.scope().as_ref());
                if let Some(span) = self
                    .positions
                    .find_identifier(name, tree.preferred_position())
                {
                    self.emit_metadata(span, abs);
                }
                if !documented {
                    self.emit_comment(tree, abs);
                }
            }
            self.emit_anchor(&ctx, EdgeKind::Defines, &method_node);
        }

        let params_only: Vec<Option<SemanticNode>> = param_nodes
            .iter()
            .map(|p| p.as_ref().map(|p| p.node.clone()))
            .collect();
        self.link_ordinals(&method_node, EdgeKind::Param, &params_only);

        let receiver_node = if modifiers.is_static() {
            None
        } else {
            owner.node().cloned()
        };
        self.emit_function_type(&method_node, ret, receiver_node, &param_types);

        for (overridden, kind) in symbols.overridden_methods(method_id) {
            let edge = match kind {
                OverrideKind::Direct => EdgeKind::Overrides,
                OverrideKind::Transitive => EdgeKind::OverridesTransitive,
            };
            if let Some(target) = self.get_node(overridden) {
                self.link(&method_node, edge, &target);
            }
        }

        // Bind before the body so call anchors inside it are scoped to this method.
        let ctx = ctx.with_node(method_node.clone());
        self.scan_opt(body.as_deref(), &ctx)?;

        for param in param_nodes.iter().flatten() {
            self.link(&param.node, EdgeKind::ChildOf, &method_node);
        }

        Ok(Some(ScanNode::new(method_node)))
    }

    /// `typed` edge from a method to `fn(ret, receiver|void, params...)`.
    fn emit_function_type(
        &mut self,
        method: &SemanticNode,
        ret: Option<SemanticNode>,
        receiver: Option<SemanticNode>,
        params: &[SemanticNode],
    ) {
        let Some(ret) = ret else {
            warn!(method = %method.id, "missing return type");
            return;
        };
        let receiver = match receiver {
            Some(r) => r,
            None => self.emitter.new_builtin("void"),
        };
        let parts = std::iter::once(&ret)
            .chain(std::iter::once(&receiver))
            .chain(params.iter());
        let mut ids = Vec::with_capacity(params.len() + 2);
        for part in parts {
            if part.is_diagnostic() {
                self.stats.increment(Statistics::REFUSED_DIAGNOSTIC_EDGES);
                return;
            }
            ids.push(part.id.clone());
        }
        let fn_type = self.emitter.new_function_type(&ids[0], &ids[1], &ids[2..]);
        self.link(method, EdgeKind::Typed, &fn_type);
    }

    /// `generates` edges from a method and its parameters to their binary counterparts.
    fn emit_method_generates(
        &mut self,
        method_id: SymbolId,
        name: &str,
        method_node: &SemanticNode,
        params: &[Option<ScanNode>],
    ) {
        let Some(mapper) = self.binary else {
            return;
        };
        let symbols = self.symbols;
        let Some(method_sym) = symbols.get(method_id) else {
            return;
        };
        let Some(parent) = method_sym
            .owner
            .and_then(|o| symbols.enclosing_class(o))
            .and_then(|c| symbols.get(c))
        else {
            warn!(method = %name, "method has no enclosing class");
            return;
        };
        let method_type = match method_sym.erased_type.as_ref().map(to_method_jvm_type) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                warn!(method = %name, error = %e, "cannot derive binary method type");
                return;
            }
            None => {
                warn!(method = %name, "missing erased method type");
                return;
            }
        };
        let parent_class = ReferenceType::new(parent.binary_name());

        let jvm = mapper.method_node(&parent_class, name, &method_type);
        let jvm_method = self.emitter.binary_node(jvm, NodeKind::Function, None);
        self.link(method_node, EdgeKind::Generates, &jvm_method);

        for (i, param) in params.iter().enumerate() {
            let jvm = mapper.parameter_node(&parent_class, name, &method_type, i);
            let jvm_param = self
                .emitter
                .binary_node(jvm, NodeKind::Variable, Some("local/parameter"));
            if let Some(param) = param {
                self.link(&param.node, EdgeKind::Generates, &jvm_param);
            }
            self.link_ordinal(&jvm_method, EdgeKind::Param, &jvm_param, i);
        }
    }

    pub(super) fn visit_var_def(
        &mut self,
        tree: &'a Tree,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let TreeKind::VarDef {
            name,
            symbol,
            modifiers,
            var_type,
            init,
        } = &tree.kind
        else {
            return Ok(None);
        };
        let ctx = owner.down_as_snippet(tree);
        let symbols = self.symbols;

        let resolved = symbol.and_then(|id| {
            let sym = symbols.get(id)?;
            let sig = self.signatures.signature(symbols, id)?;
            Some((sym, sig))
        });
        let Some((var_sym, signature)) = resolved else {
            return Ok(Some(self.emit_diagnostic(Some(&ctx), "missing variable signature", None)));
        };

        let initializer = init
            .as_deref()
            .and_then(|i| self.positions.text_of(i.span))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| text.chars().count() <= self.config.max_initializer_length);
        self.scan_opt(init.as_deref(), &ctx)?;

        let var_node = self
            .emitter
            .declaration_node(var_sym, &signature, initializer.as_deref());
        let documented = self.visit_doc_comment(&ctx, tree, &var_node, None, Some(modifiers));
        self.emit_defines_binding_anchor_edge(&ctx, name, tree.span.start, &var_node);
        self.emit_anchor(&ctx, EdgeKind::Defines, &var_node);
        if var_sym.kind.is_field() && !documented {
            self.emit_comment(tree, &var_node);
        }

        if let Some(mapper) = self.binary
            && var_sym.kind.is_field()
        {
            match var_sym
                .owner
                .and_then(|o| symbols.enclosing_class(o))
                .and_then(|c| symbols.get(c))
            {
                Some(parent) => {
                    let reference = ReferenceType::new(parent.binary_name());
                    let jvm = mapper.field_node(&reference, name);
                    let jvm_field = self.emitter.binary_node(jvm, NodeKind::Variable, Some("field"));
                    self.link(&var_node, EdgeKind::Generates, &jvm_field);
                }
                None => warn!(field = %name, "field has no enclosing class"),
            }
        }

        if let Some(scope) = ctx.scope() {
            self.link(&var_node, EdgeKind::ChildOf, &scope);
        }
        self.visit_annotations(&var_node, &modifiers.annotations, &ctx)?;

        if modifiers.is_static() {
            self.emitter.emit_fact(&var_node.id, facts::TAG_STATIC, "");
        }

        if let Some(type_node) = self.scan_opt(var_type.as_deref(), &ctx)? {
            self.link(&var_node, EdgeKind::Typed, &type_node.node);
            return Ok(Some(ScanNode {
                node: var_node,
                wildcards: type_node.wildcards.clone(),
                ty: Some(Box::new(type_node)),
            }));
        }
        Ok(Some(ScanNode::new(var_node)))
    }

    pub(super) fn visit_lambda(
        &mut self,
        tree: &'a Tree,
        params: &'a [Tree],
        body: &'a Tree,
        targets: &'a FunctionalTargets,
        owner: &TreeContext<'a>,
    ) -> Result<Option<ScanNode>> {
        let ctx = owner.down(tree);
        let lambda_node = self.emitter.new_lambda(tree.span);
        self.emit_anchor(&ctx, EdgeKind::Defines, &lambda_node);

        for target in targets.resolve()? {
            match self.get_node(target) {
                Some(target_node) => {
                    self.link(&lambda_node, EdgeKind::Extends, &target_node);
                }
                None => warn!(symbol = target, "unresolved lambda target type"),
            }
        }

        self.scan(body, &ctx)?;
        self.scan_list(params, &ctx)?;
        Ok(Some(ScanNode::new(lambda_node)))
    }
}

//! Documentation, comments, annotations and generated-code metadata.

use anyhow::Result;
use std::path::Path;
use tracing::warn;

use super::Scanner;
use crate::domain::comments::{bracket_text, strip_comment_markers};
use crate::domain::context::TreeContext;
use crate::domain::edge::EdgeKind;
use crate::domain::node::{NodeId, SemanticNode, facts};
use crate::domain::stats::Statistics;
use crate::domain::tree::{LiteralValue, Modifiers, Span, SymbolId, Tree, TreeKind};

const JAVADOC_SUBKIND: &str = "javadoc";

impl<'a> Scanner<'a> {
    // ============ Documentation comments ============

    /// Attaches the structured doc comment of `decl` and any deprecation tag.
    ///
    /// Returns whether the declaration was documented, in which case plain line comments
    /// are not attached.
    pub(super) fn visit_doc_comment(
        &mut self,
        ctx: &TreeContext<'a>,
        decl: &'a Tree,
        node: &SemanticNode,
        abs: Option<&SemanticNode>,
        modifiers: Option<&'a Modifiers>,
    ) -> bool {
        let mut documented = false;
        let mut deprecation: Option<String> = None;

        let comment = self.doc_comments.get(&decl.preferred_position()).copied();
        if let (Some(scanner), Some(comment)) = (self.doc_scanner, comment) {
            let doc = scanner.scan(&ctx.path(), comment);
            documented = true;
            deprecation = doc.deprecation.clone();

            let mut params: Vec<NodeId> = Vec::with_capacity(doc.references.len());
            let mut links: Vec<(usize, usize)> = Vec::with_capacity(doc.references.len());
            for reference in &doc.references {
                let target = self
                    .resolve_doc_reference(decl, &reference.target)
                    .and_then(|s| self.get_node(s));
                match target {
                    Some(target) if !target.is_diagnostic() => {
                        self.emit_doc_reference(reference.span, &target);
                        params.push(target.id);
                        links.push(reference.text_range);
                    }
                    _ => {
                        if self.config.verbose_logging {
                            warn!(reference = %reference.target, "failed to emit documentation reference");
                        }
                    }
                }
            }
            let text = bracket_text(&doc.text, &links);
            self.emit_doc(Some(JAVADOC_SUBKIND), &text, &params, node, abs);
        }

        // The annotation alone marks a declaration deprecated.
        if deprecation.is_none()
            && let Some(modifiers) = modifiers
            && modifiers
                .annotations
                .iter()
                .any(|a| self.annotation_named(a, &self.config.platform.deprecated_annotation))
        {
            deprecation = Some(String::new());
        }

        if let Some(deprecation) = deprecation {
            self.emitter
                .emit_fact(&node.id, facts::TAG_DEPRECATED, &deprecation);
            if let Some(abs) = abs {
                self.emitter
                    .emit_fact(&abs.id, facts::TAG_DEPRECATED, &deprecation);
            }
        }
        documented
    }

    /// Symbol named by a doc reference: `a.b.Foo`, `Foo`, `Foo#bar`, `#bar` or `Foo#bar(int)`.
    fn resolve_doc_reference(&self, decl: &Tree, target: &str) -> Option<SymbolId> {
        let symbols = self.symbols;
        let (class_part, member) = match target.split_once('#') {
            Some((class, member)) => (class, Some(member)),
            None => (target, None),
        };

        let class = if class_part.is_empty() {
            decl.declared_symbol().and_then(|s| symbols.enclosing_class(s))?
        } else if class_part.contains('.') {
            symbols.by_qualified_name(class_part)?
        } else {
            symbols.unique_class_named(class_part)?
        };

        match member {
            None => Some(class),
            Some(member) => {
                let name = member.split('(').next().unwrap_or(member).trim();
                symbols.members_named(class, name).next()
            }
        }
    }

    fn emit_doc_reference(&mut self, span: Span, target: &SemanticNode) {
        let anchor = self.new_anchor(span, None);
        self.emit_anchor_edge(anchor, EdgeKind::RefDoc, target, None);
    }

    /// Documentation node documenting `node` and, when present, its abstraction.
    fn emit_doc(
        &mut self,
        subkind: Option<&str>,
        text: &str,
        params: &[NodeId],
        node: &SemanticNode,
        abs: Option<&SemanticNode>,
    ) {
        let doc = self.emitter.new_doc(subkind, text, params);
        self.link(&doc, EdgeKind::Documents, node);
        if let Some(abs) = abs {
            self.link(&doc, EdgeKind::Documents, abs);
        }
    }

    // ============ Line comments ============

    /// Attaches comments on the declaration's line and the line above it.
    pub(super) fn emit_comment(&mut self, decl: &Tree, node: &SemanticNode) {
        let position = decl.preferred_position();
        if position < 0 {
            return;
        }
        let def_line = self.positions.line_of(position);
        self.emit_comments_on_line(def_line, node, def_line);
        if let Some(previous) = def_line.checked_sub(1).filter(|l| *l > 0) {
            self.emit_comments_on_line(previous, node, def_line);
        }
    }

    fn emit_comments_on_line(&mut self, line: usize, node: &SemanticNode, def_line: usize) -> bool {
        let Some(comments) = self.claims.claim(line, def_line) else {
            return false;
        };
        let texts: Vec<String> = comments
            .iter()
            .map(|c| bracket_text(&strip_comment_markers(c), &[]))
            .collect();
        for text in &texts {
            self.emit_doc(None, text, &[], node, None);
        }
        !texts.is_empty()
    }

    // ============ Annotations ============

    /// `annotatedby` edges from `owner` to each annotation type.
    ///
    /// Annotation lines are claimed up front so a trailing comment on an annotation line
    /// is not attributed to the declaration below it.
    pub(super) fn visit_annotations(
        &mut self,
        owner: &SemanticNode,
        annotations: &'a [Tree],
        ctx: &TreeContext<'a>,
    ) -> Result<()> {
        for annotation in annotations {
            let position = annotation.preferred_position();
            if position < 0 {
                continue;
            }
            let line = self.positions.line_of(position);
            self.claims.force_claim(line, line);
        }
        for node in self.scan_list(annotations, ctx)?.into_iter().flatten() {
            self.link(owner, EdgeKind::AnnotatedBy, &node.node);
        }
        Ok(())
    }

    fn annotation_named(&self, annotation: &Tree, qualified_name: &str) -> bool {
        let TreeKind::Annotation {
            annotation_type, ..
        } = &annotation.kind
        else {
            return false;
        };
        annotation_type
            .symbol()
            .and_then(|s| self.symbols.get(s))
            .is_some_and(|s| s.qualified_name == qualified_name)
    }

    // ============ Generated-code metadata ============

    /// Loads metadata named by `comments = "annotations:<path>"` on a generated-code
    /// annotation.
    pub(super) fn load_annotations_from_class_decl(&mut self, annotations: &'a [Tree]) {
        let generated = self.config.platform.generated_annotation.clone();
        let prefix = self.config.platform.metadata_comment_prefix.clone();

        for annotation in annotations {
            if !self.annotation_named(annotation, &generated) {
                continue;
            }
            let TreeKind::Annotation { args, .. } = &annotation.kind else {
                continue;
            };
            for arg in args {
                let TreeKind::Assign { lhs, rhs } = &arg.kind else {
                    continue;
                };
                let (
                    TreeKind::Ident { name, .. },
                    TreeKind::Literal {
                        value: LiteralValue::String(comments),
                    },
                ) = (&lhs.kind, &rhs.kind)
                else {
                    continue;
                };
                if name != "comments" {
                    continue;
                }
                if let Some(path) = comments.strip_prefix(prefix.as_str()) {
                    self.load_annotations_file(path);
                }
            }
        }
    }

    /// Loads a metadata file relative to the source file. Failures are logged and skipped.
    fn load_annotations_file(&mut self, path: &str) {
        let Some(loader) = self.metadata_loader else {
            return;
        };
        let unit = self.unit;
        let source = Path::new(&unit.source.path);
        let full_path = source.parent().unwrap_or(Path::new("")).join(path);
        match loader.load(&full_path) {
            Ok(metadata) => {
                self.metadata.push(metadata);
                self.metadata_files.push(full_path);
            }
            Err(e) => {
                self.stats.increment(Statistics::METADATA_LOAD_FAILURES);
                warn!(
                    path = %full_path.display(),
                    source = %source.display(),
                    error = %format!("{e:#}"),
                    "can't load metadata"
                );
            }
        }
    }
}

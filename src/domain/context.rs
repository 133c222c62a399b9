//! Immutable traversal cursor.

use std::rc::Rc;

use crate::domain::node::SemanticNode;
use crate::domain::tree::{Span, Tree};

struct Frame<'a> {
    tree: &'a Tree,
    parent: Option<Rc<Frame<'a>>>,
    node: Option<SemanticNode>,
    snippet: Option<Span>,
}

/// Position in the tree: the chain of enclosing trees, the node bound to each
/// frame, and the nearest statement-level snippet span.
///
/// Cloning is cheap; deriving a child never changes the parent.
#[derive(Clone)]
pub struct TreeContext<'a> {
    frame: Rc<Frame<'a>>,
}

impl<'a> TreeContext<'a> {
    pub fn new(root: &'a Tree) -> Self {
        Self {
            frame: Rc::new(Frame {
                tree: root,
                parent: None,
                node: None,
                snippet: None,
            }),
        }
    }

    /// Child context for `tree`, inheriting the snippet.
    pub fn down(&self, tree: &'a Tree) -> Self {
        Self {
            frame: Rc::new(Frame {
                tree,
                parent: Some(self.frame.clone()),
                node: None,
                snippet: self.frame.snippet,
            }),
        }
    }

    /// Child context for a statement-level `tree`, whose span becomes the snippet.
    pub fn down_as_snippet(&self, tree: &'a Tree) -> Self {
        let snippet = if tree.span.is_valid() {
            Some(tree.span)
        } else {
            self.frame.snippet
        };
        Self {
            frame: Rc::new(Frame {
                tree,
                parent: Some(self.frame.clone()),
                node: None,
                snippet,
            }),
        }
    }

    /// The same position with `node` bound to it.
    pub fn with_node(&self, node: SemanticNode) -> Self {
        Self {
            frame: Rc::new(Frame {
                tree: self.frame.tree,
                parent: self.frame.parent.clone(),
                node: Some(node),
                snippet: self.frame.snippet,
            }),
        }
    }

    pub fn tree(&self) -> &'a Tree {
        self.frame.tree
    }

    pub fn tree_span(&self) -> Span {
        self.frame.tree.span
    }

    pub fn node(&self) -> Option<&SemanticNode> {
        self.frame.node.as_ref()
    }

    pub fn snippet(&self) -> Option<Span> {
        self.frame.snippet
    }

    pub fn up(&self) -> Option<TreeContext<'a>> {
        self.frame
            .parent
            .as_ref()
            .map(|p| TreeContext { frame: p.clone() })
    }

    /// Nearest strict ancestor whose tree is a class or method declaration.
    pub fn class_or_method_parent(&self) -> Option<TreeContext<'a>> {
        let mut current = self.up();
        while let Some(ctx) = current {
            if ctx.tree().is_class_or_method() {
                return Some(ctx);
            }
            current = ctx.up();
        }
        None
    }

    /// Node of the enclosing class or method, if one is bound.
    pub fn scope(&self) -> Option<SemanticNode> {
        self.class_or_method_parent()
            .and_then(|ctx| ctx.node().cloned())
    }

    /// Labels of the trees from the root down to this position.
    pub fn path(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        let mut current = Some(self.frame.clone());
        while let Some(frame) = current {
            labels.push(frame.tree.kind.label());
            current = frame.parent.clone();
        }
        labels.reverse();
        labels
    }
}

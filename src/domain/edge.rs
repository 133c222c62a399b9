use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::node::NodeId;

const EDGE_PREFIX: &str = "/kythe/edge/";

/// Edge kind - relation between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    // ============ Anchor edges ============
    Defines,
    DefinesBinding,
    Ref,
    RefCall,
    RefImports,
    RefDoc,

    // ============ Structure ============
    ChildOf,
    Param,

    // ============ Types ============
    Extends,
    Typed,
    BoundedUpper,
    BoundedLower,
    Overrides,
    OverridesTransitive,

    // ============ Annotations & Docs ============
    AnnotatedBy,
    Documents,

    // ============ Binary projection ============
    Generates,
    Named,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 18] = [
        EdgeKind::Defines,
        EdgeKind::DefinesBinding,
        EdgeKind::Ref,
        EdgeKind::RefCall,
        EdgeKind::RefImports,
        EdgeKind::RefDoc,
        EdgeKind::ChildOf,
        EdgeKind::Param,
        EdgeKind::Extends,
        EdgeKind::Typed,
        EdgeKind::BoundedUpper,
        EdgeKind::BoundedLower,
        EdgeKind::Overrides,
        EdgeKind::OverridesTransitive,
        EdgeKind::AnnotatedBy,
        EdgeKind::Documents,
        EdgeKind::Generates,
        EdgeKind::Named,
    ];

    /// Edge kinds whose source is an anchor.
    pub fn is_anchor_edge(&self) -> bool {
        matches!(
            self,
            EdgeKind::Defines
                | EdgeKind::DefinesBinding
                | EdgeKind::Ref
                | EdgeKind::RefCall
                | EdgeKind::RefImports
                | EdgeKind::RefDoc
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Defines => "defines",
            EdgeKind::DefinesBinding => "defines/binding",
            EdgeKind::Ref => "ref",
            EdgeKind::RefCall => "ref/call",
            EdgeKind::RefImports => "ref/imports",
            EdgeKind::RefDoc => "ref/doc",
            EdgeKind::ChildOf => "childof",
            EdgeKind::Param => "param",
            EdgeKind::Extends => "extends",
            EdgeKind::Typed => "typed",
            EdgeKind::BoundedUpper => "bounded/upper",
            EdgeKind::BoundedLower => "bounded/lower",
            EdgeKind::Overrides => "overrides",
            EdgeKind::OverridesTransitive => "overrides/transitive",
            EdgeKind::AnnotatedBy => "annotatedby",
            EdgeKind::Documents => "documents",
            EdgeKind::Generates => "generates",
            EdgeKind::Named => "named",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(EDGE_PREFIX).unwrap_or(s);
        EdgeKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| anyhow::anyhow!("unknown edge kind: {s}"))
    }
}

/// A directed, optionally ordinal edge fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub kind: EdgeKind,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
}

impl Edge {
    pub fn new(source: NodeId, kind: EdgeKind, target: NodeId) -> Self {
        Self {
            source,
            kind,
            target,
            ordinal: None,
        }
    }

    pub fn ordinal(source: NodeId, kind: EdgeKind, target: NodeId, ordinal: u32) -> Self {
        Self {
            source,
            kind,
            target,
            ordinal: Some(ordinal),
        }
    }
}

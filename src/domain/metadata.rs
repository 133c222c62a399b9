use crate::domain::edge::EdgeKind;
use crate::domain::node::NodeId;

/// One span-to-edge rule from a generated-code metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRule {
    pub begin: i64,
    pub end: i64,
    pub edge: EdgeKind,
    pub vname: NodeId,
    /// Emit `vname -> node` instead of `node -> vname`.
    pub reverse: bool,
}

/// Rules loaded from a single metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    rules: Vec<MetadataRule>,
}

impl Metadata {
    pub fn new(rules: Vec<MetadataRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MetadataRule] {
        &self.rules
    }

    /// Rules whose span starts at `start`.
    pub fn rules_for_location(&self, start: i64) -> impl Iterator<Item = &MetadataRule> {
        self.rules.iter().filter(move |r| r.begin == start)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

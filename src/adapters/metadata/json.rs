use crate::domain::edge::EdgeKind;
use crate::domain::metadata::{Metadata, MetadataRule};
use crate::domain::node::NodeId;
use crate::domain::ports::{MetadataLoader, SourceReader};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

const FORMAT_TAG: &str = "kythe0";

#[derive(Debug, Deserialize)]
struct MetadataFile {
    #[serde(rename = "type")]
    format: String,
    #[serde(default)]
    meta: Vec<RuleJson>,
}

#[derive(Debug, Deserialize)]
struct RuleJson {
    #[serde(rename = "type")]
    rule_type: String,
    begin: i64,
    end: i64,
    edge: String,
    vname: VNameJson,
}

#[derive(Debug, Deserialize)]
struct VNameJson {
    #[serde(default)]
    signature: String,
    #[serde(default)]
    corpus: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    language: String,
}

/// Loads `kythe0` JSON metadata files. An edge name prefixed with `%` is reversed.
pub struct JsonMetadataLoader<R: SourceReader> {
    reader: R,
}

impl<R: SourceReader> JsonMetadataLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: SourceReader> MetadataLoader for JsonMetadataLoader<R> {
    fn load(&self, path: &Path) -> Result<Metadata> {
        if !self.reader.exists(path) {
            bail!("Can't find metadata file: {}", path.display());
        }
        let content = self.reader.read(path)?;
        parse_metadata(&content)
            .with_context(|| format!("Failed to parse metadata file: {}", path.display()))
    }
}

/// Parses the JSON body of a metadata file.
pub fn parse_metadata(content: &str) -> Result<Metadata> {
    let file: MetadataFile = serde_json::from_str(content).context("Invalid metadata JSON")?;
    if file.format != FORMAT_TAG {
        bail!("Unsupported metadata format: {}", file.format);
    }

    let mut rules = Vec::with_capacity(file.meta.len());
    for rule in file.meta {
        if rule.rule_type != "anchor_defines" {
            continue;
        }
        let (reverse, edge) = match rule.edge.strip_prefix('%') {
            Some(edge) => (true, edge),
            None => (false, rule.edge.as_str()),
        };
        let edge: EdgeKind = edge.parse()?;
        rules.push(MetadataRule {
            begin: rule.begin,
            end: rule.end,
            edge,
            vname: NodeId::new(
                rule.vname.signature,
                rule.vname.corpus,
                rule.vname.path,
                rule.vname.language,
            ),
            reverse,
        });
    }
    Ok(Metadata::new(rules))
}

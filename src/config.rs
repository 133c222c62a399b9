use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How declarations are tied to their binary-level counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum JvmMode {
    /// `generates` edges to binary class/method/field/parameter nodes.
    Semantic,
    /// `named` edges from classes to binary name nodes.
    #[default]
    Names,
}

/// Well-known platform names the scanner depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformNames {
    pub object_type: String,
    pub enum_type: String,
    pub deprecated_annotation: String,
    pub generated_annotation: String,
    /// File stem of the package documentation file.
    pub package_doc_file: String,
    /// Prefix of the `comments` value naming a metadata file.
    pub metadata_comment_prefix: String,
}

impl Default for PlatformNames {
    fn default() -> Self {
        Self {
            object_type: "java.lang.Object".to_string(),
            enum_type: "java.lang.Enum".to_string(),
            deprecated_annotation: "java.lang.Deprecated".to_string(),
            generated_annotation: "javax.annotation.Generated".to_string(),
            package_doc_file: "package-info".to_string(),
            metadata_comment_prefix: "annotations:".to_string(),
        }
    }
}

/// Indexer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub corpus: String,
    pub language: String,
    pub jvm_mode: JvmMode,
    /// Reference foreign symbols through binary-level nodes (semantic mode only).
    pub emit_jvm_references: bool,
    /// Emit `childof` scope edges from every anchor, not just call anchors.
    pub emit_anchor_scopes: bool,
    pub verbose_logging: bool,
    /// Longest initializer text recorded on a variable; longer ones are omitted.
    pub max_initializer_length: usize,
    pub platform: PlatformNames,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            corpus: String::new(),
            language: "java".to_string(),
            jvm_mode: JvmMode::Names,
            emit_jvm_references: false,
            emit_anchor_scopes: true,
            verbose_logging: false,
            max_initializer_length: 80,
            platform: PlatformNames::default(),
        }
    }
}

impl IndexerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn with_corpus(mut self, corpus: impl Into<String>) -> Self {
        self.corpus = corpus.into();
        self
    }

    pub fn with_jvm_mode(mut self, mode: JvmMode) -> Self {
        self.jvm_mode = mode;
        self
    }
}

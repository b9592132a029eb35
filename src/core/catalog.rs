//! # Tree Catalog
//!
//! The immutable decision tree: every node and every breadcrumb section.
//! Loaded once at startup, validated in full, then shared read-only
//! (`Arc<TreeCatalog>`) for the rest of the process.
//!
//! ```text
//! tree.json
//! ├── phrases:  { name: template }      // shared prompt text, `{subject}` placeholder
//! ├── sections: [ { id, label }, ... ]  // ancestor-first, order is significant
//! └── nodes:    { id: node }            // question (choices) or terminal (code)
//! ```
//!
//! A prompt is either literal text or a phrase reference:
//! `{ "phrase": "other", "subject": "search" }`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::core::error::{CatalogError, NavError};

/// The decision tree shipped with the binary. Checked by `build.rs`.
pub const BUNDLED_CATALOG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/tree.json"));

/// A labelled option on a question, pointing at another node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub label: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Awaiting a choice. Never empty.
    Question { choices: Vec<Choice> },
    /// End of a path, carrying its classification code.
    Terminal { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub prompt: String,
    pub kind: NodeKind,
}

impl Node {
    /// Choices in declaration order. Empty for terminals.
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            NodeKind::Question { choices } => choices,
            NodeKind::Terminal { .. } => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal { code } => Some(code),
            NodeKind::Question { .. } => None,
        }
    }

    /// Exact label match against the choices presented for this node.
    pub fn choice(&self, label: &str) -> Option<&Choice> {
        self.choices().iter().find(|c| c.label == label)
    }
}

/// A breadcrumb entry: an ID prefix and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub id: String,
    pub label: String,
}

impl Section {
    /// The section ID with a trailing `.0` removed ("1.0" -> "1").
    pub fn prefix(&self) -> &str {
        self.id.strip_suffix(".0").unwrap_or(&self.id)
    }

    /// Lexical prefix match, not numeric: "1.1" also matches "1.10".
    pub fn matches(&self, node_id: &str) -> bool {
        node_id.starts_with(self.prefix())
    }
}

/// Shared prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PhraseBank {
    phrases: HashMap<String, String>,
}

impl PhraseBank {
    pub fn new(phrases: HashMap<String, String>) -> Self {
        Self { phrases }
    }

    /// Renders a named phrase, substituting `{subject}` when given.
    pub fn render(&self, name: &str, subject: Option<&str>) -> Option<String> {
        let template = self.phrases.get(name)?;
        Some(match subject {
            Some(subject) => template.replace("{subject}", subject),
            None => template.clone(),
        })
    }
}

// ============================================================================
// On-disk shape
// ============================================================================

#[derive(Deserialize)]
struct CatalogDef {
    #[serde(default)]
    phrases: HashMap<String, String>,
    #[serde(default)]
    sections: Vec<Section>,
    nodes: BTreeMap<String, NodeDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindDef {
    Question,
    Terminal,
}

#[derive(Deserialize)]
struct NodeDef {
    kind: KindDef,
    prompt: PromptDef,
    #[serde(default)]
    choices: Vec<Choice>,
    code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PromptDef {
    Text(String),
    Phrase {
        phrase: String,
        #[serde(default)]
        subject: Option<String>,
    },
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug)]
pub struct TreeCatalog {
    nodes: HashMap<String, Arc<Node>>,
    sections: Vec<Section>,
}

impl TreeCatalog {
    /// Loads the catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Loads and validates a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!(
            "Loaded catalog from {} ({} nodes, {} sections)",
            path.display(),
            catalog.len(),
            catalog.sections.len()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let def: CatalogDef = serde_json::from_str(json)?;
        Self::build(def)
    }

    fn build(def: CatalogDef) -> Result<Self, CatalogError> {
        let bank = PhraseBank::new(def.phrases);

        let mut seen = HashSet::new();
        for section in &def.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(CatalogError::DuplicateSection(section.id.clone()));
            }
        }

        let ids: HashSet<String> = def.nodes.keys().cloned().collect();
        let mut nodes = HashMap::with_capacity(def.nodes.len());

        for (id, node) in def.nodes {
            let prompt = match node.prompt {
                PromptDef::Text(text) => text,
                PromptDef::Phrase { phrase, subject } => bank
                    .render(&phrase, subject.as_deref())
                    .ok_or_else(|| CatalogError::UnknownPhrase {
                        node: id.clone(),
                        phrase,
                    })?,
            };

            let kind = match node.kind {
                KindDef::Question => {
                    if node.choices.is_empty() {
                        return Err(CatalogError::EmptyQuestion(id));
                    }
                    // an empty label would read back as the END sentinel step
                    if node.choices.iter().any(|c| c.label.trim().is_empty()) {
                        return Err(CatalogError::EmptyLabel(id));
                    }
                    if let Some(dangling) = node.choices.iter().find(|c| !ids.contains(&c.target)) {
                        return Err(CatalogError::DanglingTarget {
                            node: id,
                            label: dangling.label.clone(),
                            target: dangling.target.clone(),
                        });
                    }
                    NodeKind::Question {
                        choices: node.choices,
                    }
                }
                KindDef::Terminal => {
                    if !node.choices.is_empty() {
                        return Err(CatalogError::TerminalWithChoices(id));
                    }
                    NodeKind::Terminal {
                        code: node.code.unwrap_or_else(|| id.clone()),
                    }
                }
            };

            nodes.insert(id.clone(), Arc::new(Node { id, prompt, kind }));
        }

        debug!(
            "Catalog built: {} nodes, {} sections",
            nodes.len(),
            def.sections.len()
        );

        Ok(Self {
            nodes,
            sections: def.sections,
        })
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: &str) -> Result<&Node, NavError> {
        self.nodes
            .get(id)
            .map(|n| n.as_ref())
            .ok_or_else(|| NavError::NodeNotFound(id.to_string()))
    }

    pub(crate) fn shared_node(&self, id: &str) -> Result<Arc<Node>, NavError> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| NavError::NodeNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Every section whose prefix matches `node_id`, in declaration order.
    /// Sections are never re-sorted: declaration order is the breadcrumb order.
    pub fn breadcrumb(&self, node_id: &str) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.matches(node_id)).collect()
    }

    /// The innermost (last declared) matching section, if any.
    pub fn current_section(&self, node_id: &str) -> Option<&Section> {
        self.sections.iter().rev().find(|s| s.matches(node_id))
    }

    /// Fails unless `id` names a node. Used to vet the configured start node.
    pub fn ensure_start(&self, id: &str) -> Result<(), CatalogError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(CatalogError::MissingStart(id.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn terminal_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_terminal()).count()
    }
}

//! # Errors
//!
//! Two families:
//!
//! - [`NavError`]: runtime navigation failures. Recoverable; the caller keeps
//!   the session alive and the engine state is untouched.
//! - [`CatalogError`]: a broken tree definition. Fatal; startup aborts.
//!
//! Storage problems never surface here. History persistence degrades
//! silently (see `history.rs`).

use thiserror::Error;

/// Why an advance, finish or rewind was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("node is terminal and has no choices")]
    TerminalNode,
    #[error("no choice labelled {0:?}")]
    UnknownChoice(String),
    #[error("node is not terminal")]
    NotTerminal,
    #[error("step {0} is outside the navigation path")]
    StepOutOfRange(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("invalid transition at {node}: {reason}")]
    InvalidTransition { node: String, reason: InvalidReason },
    #[error("nothing to go back to")]
    EmptyHistory,
}

impl NavError {
    pub(crate) fn invalid(node: &str, reason: InvalidReason) -> Self {
        NavError::InvalidTransition {
            node: node.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("node {node} has choice {label:?} targeting missing node {target}")]
    DanglingTarget {
        node: String,
        label: String,
        target: String,
    },
    #[error("question node {0} has no choices")]
    EmptyQuestion(String),
    #[error("question node {0} has a choice with an empty label")]
    EmptyLabel(String),
    #[error("terminal node {0} has choices")]
    TerminalWithChoices(String),
    #[error("node {node} uses unknown phrase {phrase:?}")]
    UnknownPhrase { node: String, phrase: String },
    #[error("section {0} is declared twice")]
    DuplicateSection(String),
    #[error("start node {0} is not in the catalog")]
    MissingStart(String),
}

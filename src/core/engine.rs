//! # Navigation Engine
//!
//! Walks the catalog one choice at a time and remembers how it got here.
//!
//! ```text
//! NavigationEngine
//! ├── catalog: Arc<TreeCatalog>   // shared, read-only
//! ├── current: Arc<Node>          // where the user is now
//! ├── stack: NavigationPath       // (node, choice) for every advance
//! └── restart_marker: Option<String>
//! ```
//!
//! `back()` is purely stack driven: it restores the node that was current
//! before the last advance, it never follows catalog links backwards.
//!
//! Every failing operation leaves the engine exactly as it was.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::catalog::{Node, Section, TreeCatalog};
use crate::core::error::{InvalidReason, NavError};

/// Choices whose label contains this text restart the session.
pub const DEFAULT_RESTART_MARKER: &str = "(start over)";

/// One advance: the node that was left and the label chosen there.
///
/// An empty `choice` marks the final step recorded at a terminal.
/// Serialized as a two-element array: `["1.2", "Yes"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct NavigationStep {
    pub node_id: String,
    pub choice: String,
}

impl NavigationStep {
    pub fn new(node_id: impl Into<String>, choice: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            choice: choice.into(),
        }
    }

    /// The terminal sentinel step (`choice` is empty).
    pub fn end(node_id: impl Into<String>) -> Self {
        Self::new(node_id, "")
    }

    pub fn is_end(&self) -> bool {
        self.choice.is_empty()
    }
}

impl From<(String, String)> for NavigationStep {
    fn from((node_id, choice): (String, String)) -> Self {
        Self { node_id, choice }
    }
}

impl From<NavigationStep> for (String, String) {
    fn from(step: NavigationStep) -> Self {
        (step.node_id, step.choice)
    }
}

pub type NavigationPath = Vec<NavigationStep>;

pub struct NavigationEngine {
    catalog: Arc<TreeCatalog>,
    current: Arc<Node>,
    stack: NavigationPath,
    restart_marker: Option<String>,
}

impl NavigationEngine {
    /// Starts a session at `start`. Restart semantics use
    /// [`DEFAULT_RESTART_MARKER`]; see [`with_restart_marker`](Self::with_restart_marker).
    pub fn new(catalog: Arc<TreeCatalog>, start: &str) -> Result<Self, NavError> {
        let current = catalog.shared_node(start)?;
        Ok(Self {
            catalog,
            current,
            stack: Vec::new(),
            restart_marker: Some(DEFAULT_RESTART_MARKER.to_string()),
        })
    }

    /// `None` turns restart choices into ordinary stack-pushing advances.
    pub fn with_restart_marker(mut self, marker: Option<String>) -> Self {
        self.restart_marker = marker.filter(|m| !m.is_empty());
        self
    }

    pub fn catalog(&self) -> &TreeCatalog {
        &self.catalog
    }

    /// Clears the stack and moves to `start`.
    pub fn reset(&mut self, start: &str) -> Result<&Node, NavError> {
        let node = self.catalog.shared_node(start)?;
        self.stack.clear();
        self.current = node;
        debug!("Reset to {}", start);
        Ok(self.current.as_ref())
    }

    /// Follows the choice labelled `label` from the current node.
    ///
    /// A restart choice (label contains the restart marker) clears the
    /// stack instead of pushing onto it.
    pub fn advance(&mut self, label: &str) -> Result<&Node, NavError> {
        if self.current.is_terminal() {
            return Err(NavError::invalid(&self.current.id, InvalidReason::TerminalNode));
        }
        let choice = self.current.choice(label).ok_or_else(|| {
            NavError::invalid(&self.current.id, InvalidReason::UnknownChoice(label.to_string()))
        })?;
        let target = self.catalog.shared_node(&choice.target)?;

        if self.is_restart(label) {
            debug!("Restart from {} via {:?}", self.current.id, label);
            self.stack.clear();
        } else {
            debug!("Advance {} -> {} via {:?}", self.current.id, target.id, label);
            self.stack.push(NavigationStep::new(self.current.id.clone(), label));
        }
        self.current = target;
        Ok(self.current.as_ref())
    }

    /// Pops the last step and returns to the node it was taken from.
    pub fn back(&mut self) -> Result<&Node, NavError> {
        let last = self.stack.last().ok_or(NavError::EmptyHistory)?;
        let node = self.catalog.shared_node(&last.node_id)?;
        self.stack.pop();
        debug!("Back to {}", node.id);
        self.current = node;
        Ok(self.current.as_ref())
    }

    /// Jumps to the node of step `index`, discarding that step and
    /// everything after it. `rewind_to(len - 1)` is `back()`.
    pub fn rewind_to(&mut self, index: usize) -> Result<&Node, NavError> {
        let step = self
            .stack
            .get(index)
            .ok_or_else(|| NavError::invalid(&self.current.id, InvalidReason::StepOutOfRange(index)))?;
        let node = self.catalog.shared_node(&step.node_id)?;
        self.stack.truncate(index);
        debug!("Rewound to step {} ({})", index, node.id);
        self.current = node;
        Ok(self.current.as_ref())
    }

    /// The completed path: the stack plus the terminal sentinel step.
    /// Only legal at a terminal. Does not modify the engine.
    pub fn finish(&self) -> Result<NavigationPath, NavError> {
        if !self.current.is_terminal() {
            return Err(NavError::invalid(&self.current.id, InvalidReason::NotTerminal));
        }
        let mut path = self.stack.clone();
        path.push(NavigationStep::end(self.current.id.clone()));
        Ok(path)
    }

    pub fn current_node(&self) -> &Node {
        &self.current
    }

    pub fn current_id(&self) -> &str {
        &self.current.id
    }

    pub fn path(&self) -> &[NavigationStep] {
        &self.stack
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Sections matching `node_id`, outer to inner as declared.
    pub fn breadcrumb(&self, node_id: &str) -> Vec<&Section> {
        self.catalog.breadcrumb(node_id)
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.catalog.current_section(&self.current.id)
    }

    fn is_restart(&self, label: &str) -> bool {
        self.restart_marker
            .as_deref()
            .is_some_and(|marker| label.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    fn engine() -> NavigationEngine {
        NavigationEngine::new(sample_catalog(), "0.0").unwrap()
    }

    #[test]
    fn test_new_rejects_unknown_start() {
        let err = NavigationEngine::new(sample_catalog(), "nope").err();
        assert_eq!(err, Some(NavError::NodeNotFound("nope".into())));
    }

    #[test]
    fn test_advance_pushes_step_and_moves() {
        let mut engine = engine();
        let node = engine.advance("Registration problem").unwrap();
        assert_eq!(node.id, "1.0");
        assert_eq!(engine.path(), &[NavigationStep::new("0.0", "Registration problem")]);
    }

    #[test]
    fn test_advance_unknown_label_leaves_state() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        let err = engine.advance("Maybe").unwrap_err();
        assert_eq!(
            err,
            NavError::invalid("1.0", InvalidReason::UnknownChoice("Maybe".into()))
        );
        assert_eq!(engine.current_id(), "1.0");
        assert_eq!(engine.path().len(), 1);
    }

    #[test]
    fn test_advance_from_terminal_is_invalid() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        engine.advance("No").unwrap();
        assert!(engine.is_terminal());
        let err = engine.advance("No").unwrap_err();
        assert_eq!(err, NavError::invalid("R1", InvalidReason::TerminalNode));
        assert_eq!(engine.path().len(), 2);
    }

    #[test]
    fn test_advance_then_back_round_trips() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        let before_id = engine.current_id().to_string();
        let before_path = engine.path().to_vec();

        engine.advance("Yes").unwrap();
        let node = engine.back().unwrap();

        assert_eq!(node.id, before_id);
        assert_eq!(engine.path(), before_path.as_slice());
    }

    #[test]
    fn test_back_on_empty_stack() {
        let mut engine = engine();
        assert_eq!(engine.back().unwrap_err(), NavError::EmptyHistory);
        assert_eq!(engine.current_id(), "0.0");
    }

    #[test]
    fn test_reset_clears_stack() {
        let mut engine = engine();
        engine.advance("Website problem").unwrap();
        engine.reset("0.0").unwrap();
        assert!(engine.path().is_empty());
        assert!(!engine.can_go_back());
        assert_eq!(engine.back().unwrap_err(), NavError::EmptyHistory);
    }

    #[test]
    fn test_reset_to_unknown_node_keeps_state() {
        let mut engine = engine();
        engine.advance("Website problem").unwrap();
        assert!(engine.reset("missing").is_err());
        assert_eq!(engine.current_id(), "2.0");
        assert_eq!(engine.path().len(), 1);
    }

    #[test]
    fn test_restart_choice_clears_stack() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        engine.advance("Yes").unwrap();
        let node = engine.advance("No (start over)").unwrap();
        assert_eq!(node.id, "0.0");
        assert!(engine.path().is_empty());
    }

    #[test]
    fn test_restart_disabled_pushes_like_any_advance() {
        let mut engine = engine().with_restart_marker(None);
        engine.advance("Registration problem").unwrap();
        engine.advance("Yes").unwrap();
        engine.advance("No (start over)").unwrap();
        assert_eq!(engine.current_id(), "0.0");
        assert_eq!(engine.path().len(), 3);
    }

    #[test]
    fn test_rewind_to_truncates() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        engine.advance("Yes").unwrap();
        let node = engine.rewind_to(1).unwrap();
        assert_eq!(node.id, "1.0");
        assert_eq!(engine.path(), &[NavigationStep::new("0.0", "Registration problem")]);

        let node = engine.rewind_to(0).unwrap();
        assert_eq!(node.id, "0.0");
        assert!(engine.path().is_empty());
    }

    #[test]
    fn test_rewind_out_of_range() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        let err = engine.rewind_to(1).unwrap_err();
        assert_eq!(err, NavError::invalid("1.0", InvalidReason::StepOutOfRange(1)));
        assert_eq!(engine.path().len(), 1);
    }

    #[test]
    fn test_finish_appends_end_sentinel() {
        let mut engine = engine();
        engine.advance("Website problem").unwrap();
        engine.advance("Yes").unwrap();
        let path = engine.finish().unwrap();
        assert_eq!(path.len(), 3);
        assert!(path[2].is_end());
        assert_eq!(path[2].node_id, "R3");
        // the engine itself is untouched
        assert_eq!(engine.path().len(), 2);
    }

    #[test]
    fn test_finish_requires_terminal() {
        let engine = engine();
        assert_eq!(
            engine.finish().unwrap_err(),
            NavError::invalid("0.0", InvalidReason::NotTerminal)
        );
    }

    #[test]
    fn test_breadcrumb_and_current_section() {
        let mut engine = engine();
        engine.advance("Registration problem").unwrap();
        engine.advance("Yes").unwrap();
        let labels: Vec<_> = engine
            .breadcrumb(engine.current_id())
            .iter()
            .map(|s| s.label.clone())
            .collect();
        assert_eq!(labels, vec!["Registration", "Other"]);
        assert_eq!(engine.current_section().map(|s| s.label.as_str()), Some("Other"));
    }

    #[test]
    fn test_step_serializes_as_pair() {
        let step = NavigationStep::new("1.0", "Yes");
        assert_eq!(serde_json::to_string(&step).unwrap(), r#"["1.0","Yes"]"#);
        let back: NavigationStep = serde_json::from_str(r#"["N3C",""]"#).unwrap();
        assert!(back.is_end());
    }
}

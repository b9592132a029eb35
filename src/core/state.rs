//! # Application State
//!
//! Core business state for Triage. This module contains domain logic only -
//! no terminal-specific types. Presentation state lives in the `cli` module.
//!
//! ```text
//! App
//! ├── engine: NavigationEngine   // live position + navigation stack
//! ├── history: HistoryStore      // saved sessions + review mode
//! ├── status_message: String     // status line text
//! ├── start_node: String         // where every session begins
//! ├── show_section: bool         // breadcrumb on/off
//! ├── allow_save: bool           // offer to log finished sessions
//! └── debug_mode: bool           // show the live step table
//! ```
//!
//! `App` is the single owner of both the engine and the store. State changes
//! only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::core::catalog::TreeCatalog;
use crate::core::config::ResolvedConfig;
use crate::core::engine::NavigationEngine;
use crate::core::error::NavError;
use crate::core::history::HistoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Answering questions in the live session.
    Navigating,
    /// Looking at a saved record. The live session is parked, untouched.
    Reviewing,
}

pub struct App {
    pub engine: NavigationEngine,
    pub history: HistoryStore,
    pub status_message: String,
    pub start_node: String,
    pub show_section: bool,
    pub allow_save: bool,
    pub debug_mode: bool,
}

impl App {
    pub fn from_config(
        catalog: Arc<TreeCatalog>,
        history: HistoryStore,
        config: &ResolvedConfig,
    ) -> Result<Self, NavError> {
        let engine = NavigationEngine::new(catalog, &config.start_node)?
            .with_restart_marker(config.restart_marker.clone());
        Ok(Self {
            engine,
            history,
            status_message: String::from("Welcome to Triage!"),
            start_node: config.start_node.clone(),
            show_section: config.show_section,
            allow_save: config.allow_save,
            debug_mode: config.debug_mode,
        })
    }

    pub fn mode(&self) -> Mode {
        if self.history.reviewing().is_some() {
            Mode::Reviewing
        } else {
            Mode::Navigating
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Welcome to Triage!");
        assert_eq!(app.engine.current_id(), "0.0");
        assert_eq!(app.mode(), Mode::Navigating);
        assert!(app.allow_save);
    }
}

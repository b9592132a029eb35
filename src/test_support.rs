//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use crate::core::catalog::TreeCatalog;
use crate::core::config::ResolvedConfig;
use crate::core::history::HistoryStore;
use crate::core::state::App;
use crate::core::storage::MemoryStore;

/// A small tree: two branches, one restart choice, four terminals.
pub const SAMPLE_CATALOG: &str = r#"{
    "phrases": {
        "best": "Which of the following best describes the issue?",
        "other": "Is this some other {subject} issue not mentioned or is there a suggestion?"
    },
    "sections": [
        { "id": "0.0", "label": "Start" },
        { "id": "1.0", "label": "Registration" },
        { "id": "1.1", "label": "Other" },
        { "id": "2.0", "label": "Website" }
    ],
    "nodes": {
        "0.0": { "kind": "question", "prompt": { "phrase": "best" }, "choices": [
            { "label": "Registration problem", "target": "1.0" },
            { "label": "Website problem", "target": "2.0" }
        ] },
        "1.0": { "kind": "question", "prompt": "Can you see the course?", "choices": [
            { "label": "Yes", "target": "1.1" },
            { "label": "No", "target": "R1" }
        ] },
        "1.1": { "kind": "question", "prompt": { "phrase": "other", "subject": "registration" }, "choices": [
            { "label": "Yes (specify)", "target": "R2" },
            { "label": "No (start over)", "target": "0.0" }
        ] },
        "2.0": { "kind": "question", "prompt": "Does the page load?", "choices": [
            { "label": "Yes", "target": "R3" },
            { "label": "No", "target": "R4" }
        ] },
        "R1": { "kind": "terminal", "prompt": "Record R1 Course Not Visible" },
        "R2": { "kind": "terminal", "prompt": "Record R2 Other Registration Issue", "code": "X-22" },
        "R3": { "kind": "terminal", "prompt": "Record R3 Page Content Wrong" },
        "R4": { "kind": "terminal", "prompt": "Record R4 Page Does Not Load" }
    }
}"#;

pub fn sample_catalog() -> Arc<TreeCatalog> {
    Arc::new(TreeCatalog::from_json(SAMPLE_CATALOG).expect("sample catalog is valid"))
}

/// Creates a test App over the sample catalog with in-memory history.
pub fn test_app() -> App {
    let history = HistoryStore::open(Box::new(MemoryStore::new()), "test");
    App::from_config(sample_catalog(), history, &ResolvedConfig::default()).expect("start node exists")
}

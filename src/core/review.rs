//! # Review Table
//!
//! Turns a navigation path into display rows for the review screen and the
//! debug panel. Step numbers count decisions; the terminal sentinel shows as
//! `END`, and the optional trailing row for the live node as `Current`.
//!
//! Stored paths can outlive the catalog they were recorded against, so a
//! step whose node no longer exists still produces a row, just without a
//! prompt.

use std::fmt;

use crate::core::catalog::{Node, TreeCatalog};
use crate::core::engine::NavigationStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Number(usize),
    End,
    Current,
}

impl fmt::Display for StepMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMarker::Number(n) => write!(f, "{}", n),
            StepMarker::End => write!(f, "END"),
            StepMarker::Current => write!(f, "Current"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub step: StepMarker,
    pub node_id: String,
    pub prompt: Option<String>,
    pub choice: String,
}

pub fn review_rows(catalog: &TreeCatalog, path: &[NavigationStep], current: Option<&Node>) -> Vec<ReviewRow> {
    let mut count = 0;
    let mut rows: Vec<ReviewRow> = path
        .iter()
        .map(|step| {
            let marker = if step.is_end() {
                StepMarker::End
            } else {
                count += 1;
                StepMarker::Number(count)
            };
            ReviewRow {
                step: marker,
                node_id: step.node_id.clone(),
                prompt: catalog.node(&step.node_id).ok().map(|n| n.prompt.clone()),
                choice: step.choice.clone(),
            }
        })
        .collect();

    if let Some(node) = current {
        rows.push(ReviewRow {
            step: StepMarker::Current,
            node_id: node.id.clone(),
            prompt: Some(node.prompt.clone()),
            choice: String::new(),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    #[test]
    fn test_rows_number_decisions_and_mark_end() {
        let catalog = sample_catalog();
        let path = vec![
            NavigationStep::new("0.0", "Website problem"),
            NavigationStep::new("2.0", "No"),
            NavigationStep::end("R4"),
        ];
        let rows = review_rows(&catalog, &path, None);
        let markers: Vec<_> = rows.iter().map(|r| r.step.to_string()).collect();
        assert_eq!(markers, vec!["1", "2", "END"]);
        assert_eq!(rows[1].prompt.as_deref(), Some("Does the page load?"));
        assert_eq!(rows[2].choice, "");
    }

    #[test]
    fn test_current_row_is_appended() {
        let catalog = sample_catalog();
        let path = vec![NavigationStep::new("0.0", "Website problem")];
        let current = catalog.node("2.0").unwrap();
        let rows = review_rows(&catalog, &path, Some(current));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].step, StepMarker::Current);
        assert_eq!(rows[1].node_id, "2.0");
    }

    #[test]
    fn test_unknown_node_has_no_prompt() {
        let catalog = sample_catalog();
        let path = vec![NavigationStep::new("retired", "Yes")];
        let rows = review_rows(&catalog, &path, None);
        assert_eq!(rows[0].prompt, None);
        assert_eq!(rows[0].step, StepMarker::Number(1));
    }
}

//! # Core Application Logic
//!
//! This module contains Triage's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Catalog (tree data)  │
//!                    │  • Engine (navigation)  │
//!                    │  • History (records)    │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │    TUI     │      │    Web     │
//!     │  Adapter   │      │  (future)  │      │  (future)  │
//!     │  (stdin)   │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: `TreeCatalog`: the immutable decision tree
//! - [`engine`]: `NavigationEngine`: current node, navigation stack, breadcrumbs
//! - [`history`]: `HistoryStore`: saved sessions and review mode
//! - [`config`]: layered settings from file, env and CLI
//! - [`storage`]: the key-value persistence seam behind the history store
//! - [`review`]: step table rows for review and debug display
//! - [`state`]: The `App` struct: all application state in one place
//! - [`action`]: The `Action` enum: everything that can happen in the app

pub mod action;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod review;
pub mod state;
pub mod storage;

pub use catalog::{Choice, Node, NodeKind, Section, TreeCatalog};
pub use engine::{NavigationEngine, NavigationPath, NavigationStep};
pub use error::{CatalogError, InvalidReason, NavError};
pub use history::{HistoryStore, SessionRecord, UserInput};

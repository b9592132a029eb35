//! # Actions
//!
//! Everything that can happen in Triage becomes an `Action`.
//! User picks a choice? That's `Action::Choose(label)`.
//! User logs a finished session? That's `Action::Finish(input)`.
//!
//! The `update()` function takes the current state and an action and
//! applies it. Navigation errors never escape: they become the status
//! message and the state stays as it was.
//!
//! ```text
//! State + Action  →  update()  →  New State (+ Effect)
//! ```
//!
//! While a saved record is under review the live session is frozen: only
//! review, history and quit actions are accepted.

use log::{debug, warn};

use crate::core::error::NavError;
use crate::core::history::{SessionRecord, UserInput};
use crate::core::state::{App, Mode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Follow the choice with this exact label.
    Choose(String),
    Back,
    /// Jump back to the node of step `n` (0-based), dropping later steps.
    JumpTo(usize),
    StartOver,
    /// Log the session (when saving is allowed) and start over.
    Finish(Option<UserInput>),
    /// Review saved record `n` (0-based, insertion order).
    Review(usize),
    ExitReview,
    ClearHistory,
    Quit,
}

/// What the adapter must do after `update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("Action: {:?}", action);

    if action == Action::Quit {
        return Effect::Quit;
    }

    let frozen = matches!(
        action,
        Action::Choose(_) | Action::Back | Action::JumpTo(_) | Action::StartOver | Action::Finish(_)
    );
    if frozen && app.mode() == Mode::Reviewing {
        app.status_message = String::from("Exit review to continue the session");
        return Effect::None;
    }

    match apply(app, action) {
        Ok(status) => app.status_message = status,
        Err(e) => {
            warn!("Rejected action: {}", e);
            app.status_message = e.to_string();
        }
    }
    Effect::None
}

fn apply(app: &mut App, action: Action) -> Result<String, NavError> {
    match action {
        Action::Choose(label) => {
            let node = app.engine.advance(&label)?;
            Ok(match node.code() {
                Some(code) => format!("Reached {}", code),
                None => String::new(),
            })
        }
        Action::Back => {
            let node = app.engine.back()?;
            Ok(format!("Back at {}", node.id))
        }
        Action::JumpTo(index) => {
            let node = app.engine.rewind_to(index)?;
            Ok(format!("Back at {}", node.id))
        }
        Action::StartOver => {
            app.engine.reset(&app.start_node)?;
            Ok(String::from("Started over"))
        }
        Action::Finish(input) => {
            let path = app.engine.finish()?;
            let endpoint = app.engine.current_id().to_string();
            app.engine.reset(&app.start_node)?;
            if app.allow_save {
                app.history.save(SessionRecord::new(endpoint.clone(), path, input));
                Ok(format!("Logged {}", endpoint))
            } else {
                Ok(String::from("Started over"))
            }
        }
        Action::Review(index) => match app.history.get(index) {
            Some(record) => {
                let status = format!("Reviewing {} incident", record.title);
                app.history.enter_review(record);
                Ok(status)
            }
            None => Ok(format!("No saved session #{}", index + 1)),
        },
        Action::ExitReview => Ok(match app.history.exit_review() {
            Some(_) => String::from("Review closed"),
            None => String::from("Not reviewing"),
        }),
        Action::ClearHistory => {
            app.history.clear();
            Ok(String::from("History cleared"))
        }
        Action::Quit => Ok(String::new()),
    }
}

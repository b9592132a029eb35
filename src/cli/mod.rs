//! # CLI Adapter
//!
//! The line-oriented front end. Reads commands from any `BufRead`, turns
//! them into `core::Action` values and redraws after each one.
//!
//! This is the only module that does terminal I/O. It reads engine and
//! history state through accessors and changes it only via `update()`.

pub mod command;
pub mod render;

use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::cli::command::Command;
use crate::core::action::{Action, Effect, update};
use crate::core::history::UserInput;
use crate::core::review::review_rows;
use crate::core::state::App;

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end().to_string()))
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;
    Ok(read_line(input)?.unwrap_or_default())
}

fn ask_user_input<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<UserInput>> {
    let title = ask(input, out, "Title (optional): ")?;
    let notes = ask(input, out, "Notes (optional): ")?;
    Ok(UserInput::from_fields(&title, &notes))
}

/// Maps a command onto an action. `None` when the command is answered
/// directly (listings, help) or refers to something that is not there.
fn to_action<R: BufRead, W: Write>(
    app: &App,
    command: Command,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Action>> {
    let action = match command {
        Command::Pick(n) => match app.engine.current_node().choices().get(n - 1) {
            Some(choice) => Action::Choose(choice.label.clone()),
            None => {
                writeln!(out, "No choice {}.", n)?;
                return Ok(None);
            }
        },
        Command::Back => Action::Back,
        Command::Jump(n) => Action::JumpTo(n - 1),
        Command::StartOver => Action::StartOver,
        Command::Finish => {
            let details = if app.allow_save && app.engine.is_terminal() && app.history.reviewing().is_none() {
                ask_user_input(input, out)?
            } else {
                None
            };
            Action::Finish(details)
        }
        Command::Review(n) => Action::Review(n - 1),
        Command::ExitReview => Action::ExitReview,
        Command::Clear => Action::ClearHistory,
        Command::Quit => Action::Quit,
        Command::History => {
            render::history_list(out, &app.history.load_all())?;
            return Ok(None);
        }
        Command::Path => {
            let engine = &app.engine;
            let rows = review_rows(engine.catalog(), engine.path(), Some(engine.current_node()));
            render::step_table(out, &rows)?;
            return Ok(None);
        }
        Command::Help => {
            render::help(out)?;
            return Ok(None);
        }
    };
    Ok(Some(action))
}

/// Runs until `q` or end of input.
pub fn run<R: BufRead, W: Write>(app: &mut App, mut input: R, mut out: W) -> io::Result<()> {
    info!("Session started at {}", app.engine.current_id());
    render::screen(&mut out, app)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = read_line(&mut input)? else {
            debug!("End of input");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = command::parse(&line) else {
            writeln!(out, "Unknown command {:?}. Type ? for help.", line.trim())?;
            continue;
        };

        let Some(action) = to_action(app, command, &mut input, &mut out)? else {
            continue;
        };
        if update(app, action) == Effect::Quit {
            break;
        }
        render::screen(&mut out, app)?;
    }

    info!("Session ended at {}", app.engine.current_id());
    Ok(())
}

//! Plain-text views. Everything writes to any `io::Write` so tests can
//! render into a buffer.

use std::io::{self, Write};

use textwrap::Options;

use crate::core::catalog::{Section, TreeCatalog};
use crate::core::history::SessionRecord;
use crate::core::review::{ReviewRow, review_rows};
use crate::core::state::App;

const WRAP_WIDTH: usize = 78;

pub fn breadcrumb_line(sections: &[&Section]) -> String {
    sections
        .iter()
        .map(|s| s.label.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Redraw after every action: the live node, or the record under review.
pub fn screen<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    writeln!(out)?;
    match app.history.reviewing() {
        Some(record) => review(out, app.engine.catalog(), record)?,
        None => node(out, app)?,
    }
    if !app.status_message.is_empty() {
        writeln!(out, "-- {}", app.status_message)?;
    }
    Ok(())
}

fn node<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let engine = &app.engine;
    let current = engine.current_node();

    if app.show_section {
        let crumbs = breadcrumb_line(&engine.breadcrumb(&current.id));
        if !crumbs.is_empty() {
            writeln!(out, "[{}]", crumbs)?;
        }
    }

    writeln!(out, "{}", textwrap::fill(&current.prompt, WRAP_WIDTH))?;

    for (i, choice) in current.choices().iter().enumerate() {
        let marker = format!("  {}. ", i + 1);
        let indent = " ".repeat(marker.len());
        let options = Options::new(WRAP_WIDTH)
            .initial_indent(&marker)
            .subsequent_indent(&indent);
        writeln!(out, "{}", textwrap::fill(&choice.label, options))?;
    }

    let mut hints = Vec::new();
    if let Some(code) = current.code() {
        writeln!(out, "  Code: {}", code)?;
        hints.push(if app.allow_save {
            "[f] log incident and restart"
        } else {
            "[f] start over"
        });
    }
    if engine.can_go_back() {
        hints.push("[b] back");
    }
    hints.push("[?] help");
    writeln!(out, "{}", hints.join("  "))?;

    if app.debug_mode {
        let rows = review_rows(engine.catalog(), engine.path(), Some(current));
        step_table(out, &rows)?;
    }
    Ok(())
}

/// A saved record, step by step.
pub fn review<W: Write>(out: &mut W, catalog: &TreeCatalog, record: &SessionRecord) -> io::Result<()> {
    writeln!(out, "Reviewing {} incident ({})", record.title, record.timestamp)?;
    if let Some(input) = &record.user_input {
        if !input.title.is_empty() {
            writeln!(out, "  Title: {}", input.title)?;
        }
        if !input.notes.is_empty() {
            writeln!(out, "  Notes: {}", input.notes)?;
        }
    }
    step_table(out, &review_rows(catalog, &record.path, None))?;
    writeln!(out, "[x] exit review")
}

pub fn step_table<W: Write>(out: &mut W, rows: &[ReviewRow]) -> io::Result<()> {
    for row in rows {
        let prompt = row
            .prompt
            .clone()
            .unwrap_or_else(|| format!("(unknown node {})", row.node_id));
        writeln!(out, "{:>7}  {:<8} {}", row.step.to_string(), row.node_id, prompt)?;
        if !row.choice.is_empty() {
            writeln!(out, "{:>7}  {:<8} -> {}", "", "", row.choice)?;
        }
    }
    Ok(())
}

pub fn history_list<W: Write>(out: &mut W, records: &[SessionRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "There are no saved incidents.");
    }
    writeln!(out, "Select an incident to review its history (r <n>).")?;
    for (i, record) in records.iter().enumerate() {
        writeln!(
            out,
            "  {}. {}  {}  ({} steps)",
            i + 1,
            record.title,
            record.timestamp,
            record.decision_count()
        )?;
    }
    Ok(())
}

pub fn help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "\
  <n>        pick choice n
  b          back one step
  j <n>      jump back to step n
  s          start over
  f          finish at an end node
  p          show the path so far
  h          list saved incidents
  r <n>      review saved incident n
  x          exit review
  clear      delete all saved incidents
  q          quit"
    )
}

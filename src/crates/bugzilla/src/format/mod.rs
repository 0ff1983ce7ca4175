//! Text rendering of query results.
//!
//! Every mode is a pure function of the records it is given: no sorting, no
//! deduplication, and unset or unsupported values print as empty strings.

pub mod template;

use crate::bug::{field_spec, BugRecord};
use serde_json::Value;
use std::fmt::Write;

/// Fields appended as ` +Label: value` lines in extra mode.
const EXTRA_FIELDS: &[&str] = &[
    "keywords",
    "qa_contact",
    "whiteboard",
    "devel_whiteboard",
    "internal_whiteboard",
    "qa_whiteboard",
    "fixed_in",
    "flags",
];

/// How query results are printed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `#id status - assignee - summary`
    #[default]
    Normal,
    /// Bare ids.
    Ids,
    /// Column header plus one compact row per bug.
    Oneline,
    /// Oneline rows followed by populated extra fields.
    Extra,
    /// Every canonical field as `Label: value`.
    Full,
    /// Native attributes exactly as returned.
    Raw,
    /// User template with `%{field}` placeholders.
    Template(String),
}

/// Render `bugs` in `mode`. The result ends with a newline unless empty.
pub fn render(bugs: &[BugRecord], mode: &OutputMode) -> String {
    match mode {
        OutputMode::Normal => lines(bugs, normal_line),
        OutputMode::Ids => lines(bugs, |bug| bug.id().to_string()),
        OutputMode::Oneline => {
            let mut out = oneline_header();
            out.push_str(&lines(bugs, oneline_row));
            out
        }
        OutputMode::Extra => lines(bugs, extra_block),
        OutputMode::Full => blocks(bugs, full_block),
        OutputMode::Raw => blocks(bugs, raw_block),
        OutputMode::Template(format) => lines(bugs, |bug| template::render_line(format, bug)),
    }
}

fn lines(bugs: &[BugRecord], line: impl Fn(&BugRecord) -> String) -> String {
    let mut out = String::new();
    for bug in bugs {
        out.push_str(&line(bug));
        out.push('\n');
    }
    out
}

fn blocks(bugs: &[BugRecord], block: impl Fn(&BugRecord) -> String) -> String {
    bugs.iter().map(block).collect::<Vec<_>>().join("\n")
}

fn normal_line(bug: &BugRecord) -> String {
    format!(
        "#{:<6} {:<10} - {} - {}",
        bug.id(),
        bug.text("status"),
        bug.text("assigned_to"),
        bug.text("summary")
    )
}

fn oneline_header() -> String {
    let titles = format!(
        "{:<7} {} {:<20} {:<12} [{}] {} {}",
        "ID", "Status", "Assignee", "Component", "Target Milestone", "Flags", "Summary"
    );
    let rule = "-".repeat(titles.chars().count());
    format!("{}\n{}\n", titles, rule)
}

fn oneline_row(bug: &BugRecord) -> String {
    format!(
        "#{} {} {:<20} {:<12} [{}] {} {}",
        bug.id(),
        bug.text("status"),
        bug.text("assigned_to"),
        bug.text("component"),
        bug.text("target_milestone"),
        bug.text("flags"),
        bug.text("summary")
    )
}

fn extra_block(bug: &BugRecord) -> String {
    let mut out = oneline_row(bug);
    for name in EXTRA_FIELDS {
        let value = bug.get(name);
        if !value.is_populated() {
            continue;
        }
        if let Some(spec) = field_spec(name) {
            let _ = write!(out, "\n +{}: {}", spec.label, value);
        }
    }
    out
}

fn full_block(bug: &BugRecord) -> String {
    let mut out = String::new();
    for (spec, value) in bug.fields() {
        let _ = writeln!(out, "{}: {}", spec.label, value);
    }
    out
}

fn raw_block(bug: &BugRecord) -> String {
    let mut out = String::new();
    for (name, value) in bug.attributes() {
        let _ = writeln!(out, "ATTRIBUTE[{}]: {}", name, raw_value(value));
    }
    out
}

fn raw_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

//! Canonical bug representation shared by every server generation.
//!
//! A [`BugRecord`] keeps the native attribute map exactly as the transport
//! returned it and, next to it, the values obtained by running that map through
//! the generation's [`FieldTable`]. Raw output walks the first, every other
//! output mode walks the second.

use crate::error::{BugzillaError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// How a canonical field's native value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    List,
    /// List of `{name, status}` structs, flattened to `name+status` strings.
    Flags,
}

/// A canonical field: stable name, display label and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind }
}

/// Every canonical field, in the order full output prints them.
pub const FIELDS: &[FieldSpec] = &[
    field("id", "ID", FieldKind::Number),
    field("summary", "Summary", FieldKind::Text),
    field("status", "Status", FieldKind::Text),
    field("resolution", "Resolution", FieldKind::Text),
    field("product", "Product", FieldKind::Text),
    field("component", "Component", FieldKind::Text),
    field("version", "Version", FieldKind::Text),
    field("platform", "Platform", FieldKind::Text),
    field("op_sys", "OS", FieldKind::Text),
    field("severity", "Severity", FieldKind::Text),
    field("priority", "Priority", FieldKind::Text),
    field("assigned_to", "Assignee", FieldKind::Text),
    field("reporter", "Reporter", FieldKind::Text),
    field("qa_contact", "QA Contact", FieldKind::Text),
    field("target_milestone", "Target Milestone", FieldKind::Text),
    field("keywords", "Keywords", FieldKind::List),
    field("cc", "CC", FieldKind::List),
    field("blocks", "Blocked", FieldKind::List),
    field("depends_on", "Depends", FieldKind::List),
    field("url", "URL", FieldKind::Text),
    field("whiteboard", "Status Whiteboard", FieldKind::Text),
    field("devel_whiteboard", "Devel Whiteboard", FieldKind::Text),
    field("internal_whiteboard", "Internal Whiteboard", FieldKind::Text),
    field("qa_whiteboard", "QA Whiteboard", FieldKind::Text),
    field("fixed_in", "Fixed In", FieldKind::Text),
    field("flags", "Flags", FieldKind::Flags),
    field("creation_time", "Created", FieldKind::Text),
    field("last_change_time", "Last Changed", FieldKind::Text),
];

const ALIASES: &[(&str, &str)] = &[
    ("bug_id", "id"),
    ("bug_status", "status"),
    ("short_desc", "summary"),
    ("creator", "reporter"),
    ("status_whiteboard", "whiteboard"),
    ("cf_fixed_in", "fixed_in"),
    ("blocked", "blocks"),
    ("dependson", "depends_on"),
];

/// Resolve a field name or alias to its canonical spec.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name);
    FIELDS.iter().find(|spec| spec.name == canonical)
}

/// Per-generation translation from canonical field names to native ones.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldTable {
    /// Build a table from `(canonical, native)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Native name for a canonical field, if this generation carries it.
    pub fn native_name(&self, canonical: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, native)| *native)
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    List(Vec<String>),
    /// Mapped for this generation, but absent or nil in the response.
    Unset,
    /// Not mapped for this generation at all.
    Unsupported,
}

static UNSUPPORTED: FieldValue = FieldValue::Unsupported;

impl FieldValue {
    /// True when the value carries something worth printing.
    pub fn is_populated(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Number(_) => true,
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Unset | FieldValue::Unsupported => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::List(items) => write!(f, "{}", items.join(",")),
            FieldValue::Unset | FieldValue::Unsupported => Ok(()),
        }
    }
}

/// One bug as returned by a single RPC response. Immutable once built.
#[derive(Debug, Clone)]
pub struct BugRecord {
    id: i64,
    native: Map<String, Value>,
    values: Vec<FieldValue>,
}

impl BugRecord {
    /// Normalize a native attribute map through a generation's field table.
    pub fn from_native(native: Map<String, Value>, table: &FieldTable) -> Result<Self> {
        let mut values = Vec::with_capacity(FIELDS.len());
        for spec in FIELDS {
            let value = match table.native_name(spec.name) {
                None => FieldValue::Unsupported,
                Some(native_name) => match native.get(native_name) {
                    None => FieldValue::Unset,
                    Some(value) => coerce(spec, native_name, value)?,
                },
            };
            values.push(value);
        }

        let id = match values.first() {
            Some(FieldValue::Number(id)) => *id,
            _ => {
                return Err(BugzillaError::MalformedResponse(
                    "bug record without a numeric id".to_string(),
                ))
            }
        };

        Ok(Self { id, native, values })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Normalized value of a canonical field or alias.
    pub fn get(&self, field: &str) -> &FieldValue {
        field_spec(field)
            .and_then(|spec| FIELDS.iter().position(|f| f.name == spec.name))
            .and_then(|index| self.values.get(index))
            .unwrap_or(&UNSUPPORTED)
    }

    /// Display text of a field; empty for unset or unsupported fields.
    pub fn text(&self, field: &str) -> String {
        self.get(field).to_string()
    }

    /// Canonical fields with their values, in full-output order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldSpec, &FieldValue)> {
        FIELDS.iter().zip(self.values.iter())
    }

    /// The native attributes exactly as the transport returned them.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.native
    }

    /// Status character of a flag (`+`, `-`, `?`), if the bug carries it.
    pub fn flag(&self, name: &str) -> Option<&str> {
        let FieldValue::List(flags) = self.get("flags") else {
            return None;
        };
        flags.iter().find_map(|flag| {
            let (flag_name, status) = split_flag(flag)?;
            (flag_name == name).then_some(status)
        })
    }

    /// One of the status/devel/internal/qa whiteboards.
    pub fn whiteboard(&self, kind: &str) -> &FieldValue {
        match kind {
            "status" | "" => self.get("whiteboard"),
            "devel" => self.get("devel_whiteboard"),
            "internal" => self.get("internal_whiteboard"),
            "qa" => self.get("qa_whiteboard"),
            _ => &UNSUPPORTED,
        }
    }
}

fn split_flag(flag: &str) -> Option<(&str, &str)> {
    let status_start = flag.len().checked_sub(1)?;
    if !flag.is_char_boundary(status_start) {
        return None;
    }
    let (name, status) = flag.split_at(status_start);
    matches!(status, "+" | "-" | "?").then_some((name, status))
}

fn coerce(spec: &FieldSpec, native_name: &str, value: &Value) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Unset);
    }

    let malformed = || {
        BugzillaError::MalformedResponse(format!(
            "field {} ({}) has unexpected value {}",
            spec.name, native_name, value
        ))
    };

    match spec.kind {
        FieldKind::Text => match value {
            Value::Array(items) => {
                let parts = items
                    .iter()
                    .map(scalar_text)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(malformed)?;
                Ok(FieldValue::Text(parts.join(",")))
            }
            other => scalar_text(other).map(FieldValue::Text).ok_or_else(malformed),
        },
        FieldKind::Number => match value {
            Value::Number(n) => n.as_i64().map(FieldValue::Number).ok_or_else(malformed),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Number)
                .map_err(|_| malformed()),
            _ => Err(malformed()),
        },
        FieldKind::List => match value {
            Value::Array(items) => items
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List)
                .ok_or_else(malformed),
            Value::String(s) if s.is_empty() => Ok(FieldValue::List(Vec::new())),
            other => scalar_text(other)
                .map(|text| FieldValue::List(vec![text]))
                .ok_or_else(malformed),
        },
        FieldKind::Flags => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(flag) => {
                        let name = flag.get("name").and_then(Value::as_str)?;
                        let status = flag.get("status").and_then(Value::as_str)?;
                        Some(format!("{}{}", name, status))
                    }
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List)
                .ok_or_else(malformed),
            _ => Err(malformed()),
        },
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: FieldTable = FieldTable::new(&[
        ("id", "id"),
        ("summary", "summary"),
        ("status", "bug_status"),
        ("blocks", "blocks"),
        ("flags", "flags"),
        ("whiteboard", "whiteboard"),
    ]);

    fn native(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unset_and_unsupported_are_distinct() {
        let bug = BugRecord::from_native(
            native(json!({"id": 7, "summary": "", "bug_status": "NEW"})),
            &TABLE,
        )
        .unwrap();

        assert_eq!(bug.id(), 7);
        assert_eq!(bug.get("summary"), &FieldValue::Text(String::new()));
        assert_eq!(bug.get("blocks"), &FieldValue::Unset);
        assert_eq!(bug.get("component"), &FieldValue::Unsupported);
        assert_eq!(bug.get("no_such_field"), &FieldValue::Unsupported);
        assert_eq!(bug.text("bug_status"), "NEW");
    }

    #[test]
    fn test_unmapped_native_fields_are_dropped_but_kept_raw() {
        let bug = BugRecord::from_native(
            native(json!({"id": 1, "cf_internal": "secret"})),
            &TABLE,
        )
        .unwrap();

        assert!(bug.fields().all(|(_, value)| *value != FieldValue::Text("secret".into())));
        assert_eq!(bug.attributes().get("cf_internal"), Some(&json!("secret")));
    }

    #[test]
    fn test_flags_and_whiteboard_lookup() {
        let bug = BugRecord::from_native(
            native(json!({
                "id": "307471",
                "flags": [
                    {"name": "needinfo", "status": "?"},
                    {"name": "qe_test_coverage", "status": "-"}
                ],
                "whiteboard": " bzcl34nup",
                "blocks": [12, 13]
            })),
            &TABLE,
        )
        .unwrap();

        assert_eq!(bug.id(), 307471);
        assert_eq!(bug.flag("needinfo"), Some("?"));
        assert_eq!(bug.flag("qe_test_coverage"), Some("-"));
        assert_eq!(bug.flag("review"), None);
        assert_eq!(bug.text("flags"), "needinfo?,qe_test_coverage-");
        assert_eq!(bug.whiteboard("status").to_string(), " bzcl34nup");
        assert_eq!(bug.whiteboard("devel"), &FieldValue::Unsupported);
        assert_eq!(bug.text("blocks"), "12,13");
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let err = BugRecord::from_native(native(json!({"summary": "x"})), &TABLE).unwrap_err();
        assert!(err.is_malformed());

        let err = BugRecord::from_native(native(json!({"id": "abc"})), &TABLE).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_struct_in_text_field_is_malformed() {
        let err = BugRecord::from_native(
            native(json!({"id": 2, "summary": {"nested": true}})),
            &TABLE,
        )
        .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(field_spec("bug_id").map(|s| s.name), Some("id"));
        assert_eq!(field_spec("cf_fixed_in").map(|s| s.name), Some("fixed_in"));
        assert_eq!(field_spec("blocks").map(|s| s.label), Some("Blocked"));
        assert!(field_spec("bogus").is_none());
    }
}

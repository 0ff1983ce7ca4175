//! `%{field}` / `%{field:subkey}` output templates.

use crate::bug::BugRecord;
use regex::{Captures, Regex};
use std::sync::OnceLock;

const PLACEHOLDER: &str = r"%\{([A-Za-z0-9_]+)(?::([^}]*))?\}";

fn placeholder() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PLACEHOLDER).ok()).as_ref()
}

/// Expand every placeholder in `template` for one bug.
///
/// - `%{field}`: display text of a canonical field or alias
/// - `%{flag:name}`: status character of that flag
/// - `%{whiteboard:kind}`: status, devel, internal or qa whiteboard
///
/// Anything that does not resolve expands to the empty string.
pub fn render_line(template: &str, bug: &BugRecord) -> String {
    let Some(pattern) = placeholder() else {
        return template.to_string();
    };

    pattern
        .replace_all(template, |caps: &Captures| {
            let field = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match caps.get(2).map(|m| m.as_str()) {
                None => bug.text(field),
                Some(subkey) => expand_subkey(bug, field, subkey),
            }
        })
        .into_owned()
}

fn expand_subkey(bug: &BugRecord, field: &str, subkey: &str) -> String {
    match field {
        "flag" => bug.flag(subkey).unwrap_or_default().to_string(),
        "whiteboard" => bug.whiteboard(subkey).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::dialect;
    use crate::generation::Generation;
    use crate::testing::fixtures;
    use serde_json::Value;

    fn redhat_307471() -> BugRecord {
        let Value::Object(mut response) = fixtures::redhat_307471() else {
            unreachable!()
        };
        let Some(Value::Array(mut bugs)) = response.remove("bugs") else {
            unreachable!()
        };
        let Value::Object(native) = bugs.remove(0) else {
            unreachable!()
        };
        BugRecord::from_native(native, dialect(Generation::Gx).field_table()).unwrap()
    }

    #[test]
    fn test_flag_and_whiteboard_subkeys() {
        let bug = redhat_307471();
        let line = render_line(
            "id=%{bug_id} sw=%{whiteboard:status} needinfo=%{flag:needinfo} sum=%{summary}",
            &bug,
        );
        assert!(line.starts_with("id=307471 sw= bzcl34nup needinfo=? sum=bugzilla command"));
    }

    #[test]
    fn test_unresolved_placeholders_are_empty() {
        let bug = redhat_307471();
        assert_eq!(render_line("[%{no_such_field}]", &bug), "[]");
        assert_eq!(render_line("[%{flag:review}]", &bug), "[]");
        assert_eq!(render_line("[%{status:upper}]", &bug), "[]");
        assert_eq!(render_line("[%{whiteboard:bogus}]", &bug), "[]");
    }

    #[test]
    fn test_text_without_placeholders_is_kept() {
        let bug = redhat_307471();
        assert_eq!(render_line("100% done {}", &bug), "100% done {}");
        assert_eq!(render_line("%{status}%{id}", &bug), "CLOSED307471");
    }
}

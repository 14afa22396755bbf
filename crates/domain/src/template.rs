//! `{field}` placeholder substitution from a record.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::record::Record;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*([A-Za-z0-9_.\-]+)\s*\}").expect("placeholder pattern compiles")
});

/// Replace every `{field}` with the text form of the record's field.
///
/// Placeholders naming a field the record does not have are left as-is.
#[must_use]
pub fn render(template: &str, record: &Record) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match record.get(&caps[1]) {
            Some(value) => value.as_text(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Render every string leaf of a JSON document.
///
/// A string that is exactly one known placeholder becomes the field's
/// typed JSON value instead of its text form.
#[must_use]
pub fn render_json(value: &serde_json::Value, record: &Record) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::String(text) => {
            if let Some(field) = sole_placeholder(text)
                && let Some(found) = record.get(field)
            {
                return found.to_json();
            }
            Value::String(render(text, record))
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| render_json(v, record)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_json(v, record)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn sole_placeholder(text: &str) -> Option<&str> {
    let caps = PLACEHOLDER.captures(text)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == text.len() {
        caps.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

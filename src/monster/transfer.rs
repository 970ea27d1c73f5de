//! Monster list JSON: export, import and the persisted form.
//!
//! Parsing is field-by-field and lenient: elements that are not objects or
//! lack fields still produce a record (missing text becomes empty, missing
//! favorite becomes false). Only a payload that is not a top-level array is
//! rejected.

use serde_json::Value;

use crate::error::TransferError;
use crate::monster::model::Monster;

/// Serialize a full list, pretty-printed for download.
pub fn export_json(monsters: &[Monster]) -> String {
    serde_json::to_string_pretty(monsters).unwrap_or_else(|_| "[]".to_string())
}

/// Parse an uploaded or persisted monster list.
pub fn parse_list(text: &str) -> Result<Vec<Monster>, TransferError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(monster_from_value).collect()),
        _ => Err(TransferError::NotAList),
    }
}

/// Rebuild one record from an arbitrary JSON value.
pub fn monster_from_value(value: &Value) -> Monster {
    Monster {
        name: text_field(value.get("name")),
        description: text_field(value.get("description")),
        favorite: value.get("favorite").map(truthy).unwrap_or(false),
        role: text_field(value.get("role")),
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// JavaScript-style truthiness, so `"yes"` and `1` count as favorite.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::model::default_monsters;

    #[test]
    fn export_then_import_is_identity() {
        let mut list = default_monsters();
        list.push(Monster::new("Ghost \"Boo\"", "Line one\nline two", false, ""));
        let parsed = parse_list(&export_json(&list)).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn export_includes_every_field() {
        let json = export_json(&[Monster::new("Imp", "Tiny.", false, "")]);
        for field in ["\"name\"", "\"description\"", "\"favorite\"", "\"role\""] {
            assert!(json.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn missing_fields_default() {
        let parsed = parse_list(r#"[{"name":"Imp","description":"Tiny."}]"#).unwrap();
        assert_eq!(parsed, vec![Monster::new("Imp", "Tiny.", false, "")]);
    }

    #[test]
    fn favorite_uses_truthiness() {
        let parsed = parse_list(r#"[{"favorite":"yes"},{"favorite":0},{"favorite":null}]"#).unwrap();
        assert!(parsed[0].favorite);
        assert!(!parsed[1].favorite);
        assert!(!parsed[2].favorite);
    }

    #[test]
    fn non_object_elements_become_blank_records() {
        let parsed = parse_list("[1, \"x\"]").unwrap();
        assert_eq!(parsed, vec![Monster::default(), Monster::default()]);
    }

    #[test]
    fn rejects_non_list() {
        assert!(matches!(parse_list(r#"{"name":"Imp"}"#), Err(TransferError::NotAList)));
        assert!(matches!(parse_list("not json"), Err(TransferError::Malformed(_))));
    }
}

//! Payload shapes observed from the upstream collaborators.
//!
//! The worker and meta services have gone through several response formats.
//! Each shape we know about gets its own variant, anything else lands in
//! `Unrecognized` and normalizes to an empty result.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum BooksPayload {
    /// `[{...}, {...}]`
    List(Vec<Value>),
    /// `{"books": [{...}]}`
    Wrapped(Vec<Value>),
    Unrecognized,
}

impl From<Value> for BooksPayload {
    fn from(raw: Value) -> Self {
        match raw {
            Value::Array(items) => BooksPayload::List(items),
            Value::Object(mut map) => match map.remove("books") {
                Some(Value::Array(items)) => BooksPayload::Wrapped(items),
                _ => BooksPayload::Unrecognized,
            },
            _ => BooksPayload::Unrecognized,
        }
    }
}

impl BooksPayload {
    pub fn into_candidates(self) -> Vec<Value> {
        match self {
            BooksPayload::List(items) | BooksPayload::Wrapped(items) => items,
            BooksPayload::Unrecognized => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionsPayload {
    /// `null`, `false`, `0` or `""`
    Empty,
    /// `["...", "..."]`, possibly holding raw dictionary entries
    List(Vec<Value>),
    /// `"..."`
    Text(String),
    /// `{"meanings": [{"definitions": [{"definition": "..."}]}]}`
    Meanings(Vec<Value>),
    /// `{"definitions": [...]}` or the older `{"definition": [...]}`
    Definitions(Vec<Value>),
    Unrecognized,
}

impl From<Value> for DefinitionsPayload {
    fn from(raw: Value) -> Self {
        if is_falsy(&raw) {
            return DefinitionsPayload::Empty;
        }

        match raw {
            Value::Array(items) => DefinitionsPayload::List(items),
            Value::String(text) => DefinitionsPayload::Text(text),
            Value::Object(mut map) => {
                if let Some(Value::Array(meanings)) = map.remove("meanings") {
                    return DefinitionsPayload::Meanings(meanings);
                }
                if let Some(Value::Array(defs)) = map.remove("definitions") {
                    return DefinitionsPayload::Definitions(defs);
                }
                if let Some(Value::Array(defs)) = map.remove("definition") {
                    return DefinitionsPayload::Definitions(defs);
                }
                DefinitionsPayload::Unrecognized
            }
            _ => DefinitionsPayload::Unrecognized,
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_books_payload_shapes() {
        assert!(matches!(
            BooksPayload::from(json!([{"title": "A"}])),
            BooksPayload::List(items) if items.len() == 1
        ));
        assert!(matches!(
            BooksPayload::from(json!({"books": []})),
            BooksPayload::Wrapped(items) if items.is_empty()
        ));
        assert_eq!(
            BooksPayload::from(json!({"books": "nope"})),
            BooksPayload::Unrecognized
        );
        assert_eq!(BooksPayload::from(json!(42)), BooksPayload::Unrecognized);
        assert_eq!(BooksPayload::from(Value::Null), BooksPayload::Unrecognized);
    }

    #[test]
    fn test_definitions_payload_falsy_values() {
        for raw in [Value::Null, json!(false), json!(0), json!("")] {
            assert_eq!(DefinitionsPayload::from(raw), DefinitionsPayload::Empty);
        }
    }

    #[test]
    fn test_definitions_payload_prefers_meanings() {
        let raw = json!({
            "meanings": [],
            "definitions": ["ignored"]
        });
        assert_eq!(
            DefinitionsPayload::from(raw),
            DefinitionsPayload::Meanings(Vec::new())
        );
    }

    #[test]
    fn test_definitions_payload_legacy_key() {
        let raw = json!({"definition": ["a thing"]});
        assert_eq!(
            DefinitionsPayload::from(raw),
            DefinitionsPayload::Definitions(vec![json!("a thing")])
        );
    }
}

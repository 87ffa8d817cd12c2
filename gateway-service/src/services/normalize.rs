//! Turns whatever the collaborators sent back into the two shapes the
//! gateway promises its clients. Nothing in here can fail: input we do not
//! understand becomes an empty list.

use crate::models::responses::BookRecord;
use crate::models::upstream::{BooksPayload, DefinitionsPayload};
use serde_json::{Map, Value};

pub const DEFAULT_DEFINITION_LIMIT: usize = 5;
const UNTITLED: &str = "Untitled";

pub fn normalize_books(raw: Value) -> Vec<BookRecord> {
    BooksPayload::from(raw)
        .into_candidates()
        .iter()
        .filter_map(Value::as_object)
        .map(book_from_fields)
        .collect()
}

pub fn normalize_definitions(raw: Value, limit: usize) -> Vec<String> {
    let mut definitions = match DefinitionsPayload::from(raw) {
        DefinitionsPayload::Empty | DefinitionsPayload::Unrecognized => Vec::new(),
        DefinitionsPayload::Text(text) => vec![text],
        DefinitionsPayload::List(items) => items.into_iter().flat_map(list_item_definitions).collect(),
        DefinitionsPayload::Meanings(meanings) => flatten_meanings(&meanings),
        DefinitionsPayload::Definitions(items) => strings(items),
    };

    definitions.truncate(limit);
    definitions
}

fn book_from_fields(fields: &Map<String, Value>) -> BookRecord {
    let title = fields
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let author = first_usable(fields, &["author", "author_name"], author_from);
    let year = first_usable(fields, &["year", "first_publish_year"], year_from);

    BookRecord {
        title,
        author,
        year,
    }
}

/// Value of the first of `keys` that `extract` accepts. Null, blank or
/// otherwise unusable values fall through to the next alias.
fn first_usable<T>(
    fields: &Map<String, Value>,
    keys: &[&str],
    extract: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find_map(extract)
}

fn author_from(value: &Value) -> Option<String> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(name.clone()),
        Value::Array(names) => names
            .first()
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn year_from(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|year| i32::try_from(year).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn list_item_definitions(item: Value) -> Vec<String> {
    match item {
        Value::String(definition) => vec![definition],
        // dictionaryapi.dev answers with a list of entries, each carrying meanings
        Value::Object(entry) => entry
            .get("meanings")
            .and_then(Value::as_array)
            .map(|meanings| flatten_meanings(meanings))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn flatten_meanings(meanings: &[Value]) -> Vec<String> {
    meanings
        .iter()
        .filter_map(|meaning| meaning.get("definitions").and_then(Value::as_array))
        .flatten()
        .filter_map(|entry| entry.get("definition").and_then(Value::as_str))
        .filter(|definition| !definition.is_empty())
        .map(str::to_string)
        .collect()
}

fn strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

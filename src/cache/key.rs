//! Cache key builder for `type::identifier::datapoint[::args]` keys.

use serde_json::{Map, Value};

const SEPARATOR: &str = "::";

/// Builds a cache key from its pieces.
///
/// Pieces are joined up to the first empty one. Request arguments are only
/// appended when all three pieces are present and `args` is a non-empty JSON
/// object; they are written as canonical JSON with sorted keys, so argument
/// order never changes the key.
pub fn cache_key(kind: &str, identifier: &str, datapoint: &str, args: Option<&Value>) -> String {
    let pieces: Vec<&str> = [kind, identifier, datapoint]
        .into_iter()
        .take_while(|piece| !piece.is_empty())
        .collect();

    let mut key = pieces.join(SEPARATOR);

    let args = args.filter(|args| matches!(args, Value::Object(map) if !map.is_empty()));
    if let (3, Some(args)) = (pieces.len(), args) {
        key.push_str(SEPARATOR);
        key.push_str(&canonical(args).to_string());
    }

    key
}

/// Rebuilds `value` with every object's keys inserted in sorted order.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), canonical(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

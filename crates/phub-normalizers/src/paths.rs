//! Typed lookups over untyped JSON trees.
//!
//! A path is a list of segments. Objects are indexed by key; arrays by a
//! segment that parses as an index. Any miss or type mismatch yields `None`.

use serde_json::Value as JsonValue;

pub(crate) static NULL: JsonValue = JsonValue::Null;

pub(crate) fn json_at<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut cur = value;
    for segment in path {
        cur = match cur {
            JsonValue::Object(map) => map.get(*segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

pub(crate) fn json_str<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a str> {
    json_at(value, path)?.as_str()
}

pub(crate) fn json_string(value: &JsonValue, path: &[&str]) -> Option<String> {
    json_str(value, path).map(ToString::to_string)
}

/// Number, or a string that parses as a finite number.
pub(crate) fn json_numeric(value: &JsonValue, path: &[&str]) -> Option<f64> {
    match json_at(value, path)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Identifier that may be serialized as a string or a number. Empty is absent.
pub(crate) fn json_id(value: &JsonValue, path: &[&str]) -> Option<String> {
    let id = match json_at(value, path)? {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

pub(crate) fn json_array<'a>(value: &'a JsonValue, path: &[&str]) -> &'a [JsonValue] {
    json_at(value, path)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub(crate) fn json_object<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    json_at(value, path).filter(|v| v.is_object())
}

/// First candidate path that resolves to an object.
pub(crate) fn first_object<'a>(value: &'a JsonValue, candidates: &[&[&str]]) -> Option<&'a JsonValue> {
    candidates.iter().find_map(|path| json_object(value, path))
}

pub(crate) fn first_string(value: &JsonValue, candidates: &[&[&str]]) -> Option<String> {
    candidates.iter().find_map(|path| json_string(value, path))
}

pub(crate) fn first_numeric(value: &JsonValue, candidates: &[&[&str]]) -> Option<f64> {
    candidates.iter().find_map(|path| json_numeric(value, path))
}

/// String members of the array at `path`, in order.
pub(crate) fn json_strings(value: &JsonValue, path: &[&str]) -> Vec<String> {
    json_array(value, path)
        .iter()
        .filter_map(|v| v.as_str().map(ToString::to_string))
        .collect()
}

//! Shape checks for upstream feed payloads.
//!
//! Fetch collaborators hand over decoded JSON; these functions accept the
//! layouts each feed is known to publish and reject anything else.

use serde_json::Value;

use crate::error::ReconError;
use crate::model::{RawCard, RawExtras};

/// Primary card feed: a bare array, or `{"cards": [...]}`.
pub fn parse_cards_payload(payload: Value) -> Result<Vec<RawCard>, ReconError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("cards") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ReconError::UnexpectedShape {
                    source: "cards".into(),
                    detail: "object without a `cards` array".into(),
                })
            }
        },
        other => {
            return Err(ReconError::UnexpectedShape {
                source: "cards".into(),
                detail: format!("expected array or object, got {}", kind_of(&other)),
            })
        }
    };
    Ok(objects_as(items))
}

/// Extras feed: a bare array only.
pub fn parse_extras_payload(payload: Value) -> Result<Vec<RawExtras>, ReconError> {
    match payload {
        Value::Array(items) => Ok(objects_as(items)),
        other => Err(ReconError::UnexpectedShape {
            source: "extras".into(),
            detail: format!("expected array, got {}", kind_of(&other)),
        }),
    }
}

/// Sets feed: an object of per-series arrays, or a flat array.
pub fn parse_sets_payload(payload: Value) -> Result<Vec<Value>, ReconError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => Ok(obj
            .into_iter()
            .filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .flatten()
            .collect()),
        other => Err(ReconError::UnexpectedShape {
            source: "sets".into(),
            detail: format!("expected array or object, got {}", kind_of(&other)),
        }),
    }
}

/// Decode each object element; non-objects are skipped with a debug note.
fn objects_as<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("skipping feed record: {e}");
                None
            }
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cards_accepts_both_layouts() {
        let bare = parse_cards_payload(json!([{"set": "A1", "number": 1}, 5])).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped = parse_cards_payload(json!({"cards": [{"set": "A1"}, {"set": "A2"}]})).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn cards_rejects_other_shapes() {
        assert!(parse_cards_payload(json!({"data": []})).is_err());
        let err = parse_cards_payload(json!("nope")).unwrap_err();
        assert!(err.to_string().contains("got string"));
    }

    #[test]
    fn extras_requires_array() {
        assert_eq!(parse_extras_payload(json!([{"set": "A1"}])).unwrap().len(), 1);
        assert!(parse_extras_payload(json!({"cards": []})).is_err());
    }

    #[test]
    fn sets_flattens_series_groups() {
        let sets = parse_sets_payload(json!({"A": [{"code": "A1"}, {"code": "A2"}], "B": [{"code": "B1"}], "meta": 1}))
            .unwrap();
        assert_eq!(sets.len(), 3);
        assert_eq!(parse_sets_payload(json!([{"code": "A1"}])).unwrap().len(), 1);
        assert!(parse_sets_payload(json!(null)).is_err());
    }
}

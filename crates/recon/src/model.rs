use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Canonical
// ---------------------------------------------------------------------------

/// Canonical card record.
///
/// Field order and JSON names match the historical `cards.json` layout;
/// changing either breaks byte-stable diffs for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    #[serde(deserialize_with = "text_or_empty")]
    pub series: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub set: String,
    #[serde(deserialize_with = "number_or_zero")]
    pub number: u32,
    #[serde(deserialize_with = "text_or_empty")]
    pub id: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub rarity: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub image: String,
    #[serde(deserialize_with = "list_or_empty")]
    pub packs: Vec<String>,
    #[serde(deserialize_with = "text_or_empty")]
    pub element: String,
    #[serde(rename = "type", deserialize_with = "text_or_empty")]
    pub card_type: String,
    #[serde(rename = "isFoil", deserialize_with = "flag")]
    pub is_foil: bool,
}

impl Card {
    pub fn has_type(&self) -> bool {
        !self.card_type.trim().is_empty()
    }
}

/// CanonicalID → Card. `BTreeMap` keeps the persisted order stable.
pub type Catalog = BTreeMap<String, Card>;

/// CanonicalIDs whose `type` is still unresolved.
pub type MissingSet = BTreeSet<String>;

/// External reference key → CanonicalID.
pub type SyncMapping = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One record from the primary card feed.
///
/// Every field is optional. Scalars are accepted as strings, numbers or
/// booleans and rendered to text; anything else reads as absent. Defaults:
/// empty string, empty pack list, `is_foil = false`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCard {
    #[serde(deserialize_with = "lenient_string")]
    pub set: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub rarity: Option<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub packs: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_string")]
    pub element: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub card_type: Option<String>,
    #[serde(rename = "isFoil", deserialize_with = "lenient_bool")]
    pub is_foil: Option<bool>,
}

/// One record from the extras feed: element/type keyed by set + number.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExtras {
    #[serde(deserialize_with = "lenient_string")]
    pub set: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub element: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub card_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

/// Render a scalar JSON value as text. Non-scalars read as absent.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

/// JSON truthiness for flag fields (`1`, `"yes"` and `true` are all set).
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(items.iter().filter_map(scalar_text).collect()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(truthy(&value)))
}

// Persisted rows predate the typed schema; a stray null or quoted number
// must not drop the whole card on reload.

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(deserializer)?.unwrap_or_default();
    Ok(crate::normalize::normalize_number(&text).1)
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string_list(deserializer)?.unwrap_or_default())
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_card_accepts_numeric_number() {
        let raw: RawCard = serde_json::from_str(r#"{"set": "A1", "number": 7}"#).unwrap();
        assert_eq!(raw.set.as_deref(), Some("A1"));
        assert_eq!(raw.number.as_deref(), Some("7"));
        assert!(raw.packs.is_none());
        assert!(raw.is_foil.is_none());
    }

    #[test]
    fn raw_card_tolerates_odd_shapes() {
        let raw: RawCard = serde_json::from_str(
            r#"{"set": null, "number": "12a", "packs": "Mewtwo", "isFoil": 1, "name": {"en": "x"}}"#,
        )
        .unwrap();
        assert!(raw.set.is_none());
        assert!(raw.packs.is_none());
        assert!(raw.name.is_none());
        assert_eq!(raw.is_foil, Some(true));
    }

    #[test]
    fn card_serializes_historical_field_names() {
        let card = Card {
            id: "A1-001".into(),
            card_type: "pokemon".into(),
            is_foil: true,
            ..Card::default()
        };
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.starts_with(r#"{"series":"","set":"","number":0,"id":"A1-001""#));
        assert!(json.contains(r#""type":"pokemon""#));
        assert!(json.ends_with(r#""isFoil":true}"#));
    }

    #[test]
    fn card_reads_partial_legacy_rows() {
        let card: Card = serde_json::from_str(r#"{"id": "a1-001", "name": "Bulbasaur"}"#).unwrap();
        assert_eq!(card.id, "a1-001");
        assert_eq!(card.name, "Bulbasaur");
        assert!(card.packs.is_empty());
        assert!(!card.has_type());
    }

    #[test]
    fn card_reads_loose_legacy_values() {
        let card: Card = serde_json::from_str(
            r#"{"id": "A1-002", "number": "2", "element": null, "isFoil": 0}"#,
        )
        .unwrap();
        assert_eq!(card.number, 2);
        assert_eq!(card.element, "");
        assert!(!card.is_foil);
    }
}

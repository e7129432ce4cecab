use serde::Serialize;
use serde_json::Value;

use crate::model::scalar_text;
use crate::normalize::{normalize_set, PROMO_CANONICAL};

/// Canonical set (expansion) record, persisted to `sets.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetEntry {
    pub code: String,
    pub name: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    pub series: String,
    pub count: Value,
    #[serde(rename = "releaseDate")]
    pub release_date: Value,
    pub packs: Value,
}

/// Series of a set code: the remainder after `P-` for promo sets, else
/// the first character.
pub fn set_series(code: &str) -> String {
    match code.strip_prefix(PROMO_CANONICAL) {
        Some(rest) => rest.to_string(),
        None => code.chars().next().map(String::from).unwrap_or_default(),
    }
}

/// Initials of a set name, ignoring `-`, `and`, `of`.
///
/// The filler words are removed as substrings, so a word that contains one
/// splits in two ("Profound" gives "Pr" and "ound"); existing short names
/// depend on that.
pub fn short_name(name: &str) -> String {
    let cleaned = name.replace('-', " ").replace("and", " ").replace("of", " ");
    cleaned
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}

fn display_name(raw: &serde_json::Map<String, Value>) -> String {
    let from_name = match raw.get("name") {
        Some(Value::Object(localized)) => localized.get("en").and_then(scalar_text),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    from_name
        .filter(|s| !s.is_empty())
        .or_else(|| {
            raw.get("label")
                .and_then(|label| label.get("en"))
                .and_then(scalar_text)
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Build one set entry from a raw feed object. Non-objects are skipped.
pub fn canonicalize_set(raw: &Value) -> Option<SetEntry> {
    let obj = raw.as_object()?;
    let code = normalize_set(&obj.get("code").and_then(scalar_text).unwrap_or_default());
    let name = display_name(obj);
    let count = obj
        .get("count")
        .or_else(|| obj.get("total"))
        .cloned()
        .unwrap_or_else(|| Value::from(0));

    Some(SetEntry {
        series: set_series(&code),
        short_name: short_name(&name),
        name,
        count,
        release_date: obj.get("releaseDate").cloned().unwrap_or(Value::Null),
        packs: obj.get("packs").cloned().unwrap_or_else(|| Value::Array(Vec::new())),
        code,
    })
}

/// Canonicalize and order a set list: by series, regular sets before promo
/// sets, then code.
pub fn build_set_catalog(raw_sets: &[Value]) -> Vec<SetEntry> {
    let mut sets: Vec<SetEntry> = raw_sets.iter().filter_map(canonicalize_set).collect();
    sets.sort_by(|a, b| {
        (&a.series, a.code.starts_with(PROMO_CANONICAL), &a.code)
            .cmp(&(&b.series, b.code.starts_with(PROMO_CANONICAL), &b.code))
    });
    sets
}

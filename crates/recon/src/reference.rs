//! Decoding of the free-form cross-reference export.
//!
//! The export has shipped as a JSON array, as JSON lines, as back-to-back
//! JSON objects and as text that only survives pattern scraping. Each
//! layout is a [`ParseStrategy`]; [`parse_reference_text`] tries them in
//! [`STRATEGY_CHAIN`] order and stops at the first that yields entries.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ReconError;

/// Field names that may carry the external reference key, in priority order.
pub const KEY_ALIASES: [&str; 4] = ["cardRefKey", "cardDefKey", "cardKey", "defKey"];

/// One reference row: an opaque external key and where the card lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub key: String,
    /// URL or path whose segments encode set code and card number.
    pub location: String,
    /// Explicit expansion, when the export carries one.
    pub expansion: Option<String>,
}

// ---------------------------------------------------------------------------
// Strategy chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Whole text is one JSON value.
    JsonDocument,
    /// One JSON value per non-blank line.
    JsonLines,
    /// JSON values written back to back.
    ConcatenatedJson,
    /// `{ ... "<key alias>": "...", ... "url": "..." }` blocks found by pattern.
    RegexPairs,
}

pub const STRATEGY_CHAIN: [ParseStrategy; 4] = [
    ParseStrategy::JsonDocument,
    ParseStrategy::JsonLines,
    ParseStrategy::ConcatenatedJson,
    ParseStrategy::RegexPairs,
];

impl ParseStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::JsonDocument => "json",
            Self::JsonLines => "json-lines",
            Self::ConcatenatedJson => "concatenated-json",
            Self::RegexPairs => "regex",
        }
    }

    /// Never fails: `None` means this layout does not fit the text.
    pub fn parse(&self, text: &str) -> Option<Vec<ReferenceEntry>> {
        let entries = match self {
            Self::JsonDocument => {
                let value: Value = serde_json::from_str(text).ok()?;
                entries_from_value(&value)
            }
            Self::JsonLines => {
                let mut values = Vec::new();
                for line in text.lines().filter(|l| !l.trim().is_empty()) {
                    values.push(serde_json::from_str::<Value>(line).ok()?);
                }
                values.iter().flat_map(entries_from_value).collect()
            }
            Self::ConcatenatedJson => {
                let values: Vec<Value> = serde_json::Deserializer::from_str(text.trim())
                    .into_iter::<Value>()
                    .map_while(Result::ok)
                    .collect();
                values.iter().flat_map(entries_from_value).collect()
            }
            Self::RegexPairs => regex_pairs(text),
        };
        (!entries.is_empty()).then_some(entries)
    }
}

/// Decode a reference export, returning the entries and the strategy that
/// produced them.
pub fn parse_reference_text(text: &str) -> Result<(Vec<ReferenceEntry>, ParseStrategy), ReconError> {
    for strategy in STRATEGY_CHAIN {
        if let Some(entries) = strategy.parse(text) {
            log::debug!("reference export decoded as {} ({} entries)", strategy.name(), entries.len());
            return Ok((entries, strategy));
        }
    }
    Err(ReconError::ReferenceFormat(
        "no known layout produced any entries".into(),
    ))
}

// ---------------------------------------------------------------------------
// Entry extraction
// ---------------------------------------------------------------------------

fn non_empty_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    obj.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn key_alias(obj: &Map<String, Value>) -> Option<&str> {
    KEY_ALIASES.iter().find_map(|alias| non_empty_str(obj, alias))
}

fn entry_from_object(obj: &Map<String, Value>, fallback_key: Option<&str>) -> Option<ReferenceEntry> {
    let key = key_alias(obj).or(fallback_key)?;
    let location = non_empty_str(obj, "url");
    let expansion = non_empty_str(obj, "expansionId");
    if location.is_none() && expansion.is_none() {
        return None;
    }
    Some(ReferenceEntry {
        key: key.to_string(),
        location: location.unwrap_or("").to_string(),
        expansion: expansion.map(String::from),
    })
}

/// Pull entries out of any decoded value.
///
/// - array: each object element with a key alias is an entry
/// - object with a key alias: a single entry
/// - other objects: outer key → URL string, or outer key → entry object
pub fn entries_from_value(value: &Value) -> Vec<ReferenceEntry> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|obj| entry_from_object(obj, None))
            .collect(),
        Value::Object(obj) if key_alias(obj).is_some() => {
            entry_from_object(obj, None).into_iter().collect()
        }
        Value::Object(obj) => obj
            .iter()
            .filter_map(|(outer_key, v)| match v {
                Value::String(url) if !outer_key.is_empty() && !url.is_empty() => Some(ReferenceEntry {
                    key: outer_key.clone(),
                    location: url.clone(),
                    expansion: None,
                }),
                Value::Object(inner) => entry_from_object(inner, Some(outer_key.as_str()).filter(|k| !k.is_empty())),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn regex_pairs(text: &str) -> Vec<ReferenceEntry> {
    static PAIR_RE: OnceLock<Regex> = OnceLock::new();
    let re = PAIR_RE.get_or_init(|| {
        Regex::new(
            r#"\{[^}]*"(?:cardRefKey|cardDefKey|cardKey|defKey)"\s*:\s*"([^"]+)"[^}]*"url"\s*:\s*"([^"]+)"[^}]*\}"#,
        )
        .unwrap()
    });
    re.captures_iter(text)
        .map(|caps| ReferenceEntry {
            key: caps[1].to_string(),
            location: caps[2].to_string(),
            expansion: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Location parsing
// ---------------------------------------------------------------------------

/// Recover `(raw_set_code, number_digits)` from a location string.
///
/// Prefers the two segments after a `cards` segment; otherwise the first
/// all-digit segment and the one before it; otherwise the last two
/// segments. The number keeps only its digit characters (possibly none).
pub fn parse_location(location: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = location
        .trim()
        .trim_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    let by_cards = parts
        .iter()
        .position(|p| *p == "cards")
        .filter(|idx| idx + 2 < parts.len())
        .map(|idx| (parts[idx + 1], parts[idx + 2]));

    let by_digits = || {
        let idx = parts
            .iter()
            .position(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))?;
        (idx > 0).then(|| (parts[idx - 1], parts[idx]))
    };

    let by_tail = || (parts.len() >= 2).then(|| (parts[parts.len() - 2], parts[parts.len() - 1]));

    let (set_code, number) = by_cards.or_else(by_digits).or_else(by_tail)?;
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    Some((set_code.to_string(), digits))
}

/// Card number encoded in a card-definition key: `PK_10_000030_00` → 3.
pub fn number_from_card_def_key(key: &str) -> Option<u32> {
    let parts: Vec<&str> = key.split('_').collect();
    if parts.len() < 4 {
        return None;
    }
    let base: u32 = parts[2].parse().ok()?;
    let suffix: u32 = parts[3].parse().ok()?;
    (base / 10).checked_add(suffix)
}

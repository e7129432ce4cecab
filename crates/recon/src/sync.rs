//! Cross-reference sync mapping: external reference key → CanonicalID.
//!
//! Rebuilt from scratch on every run. When a key shows up more than once,
//! the `A4B` expansion loses to any other expansion (it reprints cards whose
//! canonical home is the original set); every other tie keeps the first
//! mapping seen.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::SyncMapping;
use crate::normalize::{build_id, expansion_of, normalize_number, normalize_set, pad_number};
use crate::reference::{number_from_card_def_key, parse_location, ReferenceEntry};

/// Expansion whose duplicate definitions are de-preferred.
pub const DEPREFERRED_EXPANSION: &str = "A4B";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub seen: usize,
    /// Entries with no recoverable expansion.
    pub skipped: Vec<String>,
    /// Duplicate keys where a later non-A4B candidate replaced an A4B mapping.
    pub replaced: usize,
    /// Duplicate keys where the later candidate was dropped.
    pub rejected: usize,
}

/// Candidate CanonicalID for one reference entry, or `None` when no
/// expansion can be recovered.
pub fn candidate_id(entry: &ReferenceEntry) -> Option<String> {
    let parsed = parse_location(&entry.location);

    let expansion = entry
        .expansion
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| parsed.as_ref().map(|(set, _)| set.as_str()))
        .filter(|e| !e.trim().is_empty())?;

    let from_location = parsed
        .as_ref()
        .map(|(_, digits)| digits.as_str())
        .filter(|d| !d.is_empty())
        .map(|d| normalize_number(d).1);
    let number = from_location
        .or_else(|| number_from_card_def_key(&entry.key))
        .unwrap_or(0);

    Some(build_id(&normalize_set(expansion), &pad_number(number)))
}

/// Build the mapping, applying the A4B de-preference rule to duplicates.
pub fn build_sync_mapping(entries: &[ReferenceEntry]) -> (SyncMapping, SyncReport) {
    let mut mapping = SyncMapping::new();
    let mut report = SyncReport::default();

    for entry in entries {
        report.seen += 1;
        let Some(candidate) = candidate_id(entry) else {
            log::debug!("sync: no expansion for {}", entry.key);
            report.skipped.push(entry.key.clone());
            continue;
        };

        let Some(existing) = mapping.get(&entry.key) else {
            mapping.insert(entry.key.clone(), candidate);
            continue;
        };

        let existing_is_a4b = expansion_of(existing).to_uppercase() == DEPREFERRED_EXPANSION;
        let candidate_is_a4b = expansion_of(&candidate) == DEPREFERRED_EXPANSION;

        if existing_is_a4b && !candidate_is_a4b {
            log::debug!("sync: {} {} -> {}", entry.key, existing, candidate);
            mapping.insert(entry.key.clone(), candidate);
            report.replaced += 1;
        } else {
            report.rejected += 1;
        }
    }

    (mapping, report)
}

/// Ordering key for persisted output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncSortKey {
    pub prefix: String,
    pub expansion_number: u64,
    pub suffix: String,
    pub card_number: u64,
    pub key: String,
}

/// Well-formed values (`A1-003`, `A4B-123`) sort by expansion letters,
/// expansion number, suffix, then card number. Anything else sorts by its
/// uppercased text with zeroed numeric parts.
pub fn sort_key(key: &str, value: &str) -> SyncSortKey {
    static VALUE_RE: OnceLock<Regex> = OnceLock::new();
    let re = VALUE_RE.get_or_init(|| Regex::new(r"^([A-Za-z]+)(\d+)([A-Za-z]*)-(\d+)").unwrap());

    match re.captures(value) {
        Some(caps) => SyncSortKey {
            prefix: caps[1].to_uppercase(),
            expansion_number: caps[2].parse().unwrap_or(0),
            suffix: caps[3].to_uppercase(),
            card_number: caps[4].parse().unwrap_or(0),
            key: key.to_string(),
        },
        None => SyncSortKey {
            prefix: value.to_uppercase(),
            expansion_number: 0,
            suffix: String::new(),
            card_number: 0,
            key: key.to_string(),
        },
    }
}

/// Mapping entries in persisted order.
pub fn ordered_entries(mapping: &SyncMapping) -> Vec<(String, String)> {
    let mut items: Vec<(SyncSortKey, &String, &String)> = mapping
        .iter()
        .map(|(k, v)| (sort_key(k, v), k, v))
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items
        .into_iter()
        .map(|(_, k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, location: &str) -> ReferenceEntry {
        ReferenceEntry {
            key: key.into(),
            location: location.into(),
            expansion: None,
        }
    }

    fn with_expansion(key: &str, location: &str, expansion: &str) -> ReferenceEntry {
        ReferenceEntry {
            expansion: Some(expansion.into()),
            ..entry(key, location)
        }
    }

    #[test]
    fn candidate_from_location() {
        assert_eq!(candidate_id(&entry("K", "/cards/promo-a/7")).as_deref(), Some("P-A-007"));
        assert_eq!(candidate_id(&entry("K", "/cards/a4b/0042")).as_deref(), Some("A4B-042"));
    }

    #[test]
    fn explicit_expansion_wins_over_location() {
        let e = with_expansion("K", "https://x/cards/A1/5", "PROMO-B");
        assert_eq!(candidate_id(&e).as_deref(), Some("P-B-005"));
    }

    #[test]
    fn number_falls_back_to_card_def_key() {
        let e = with_expansion("PK_10_000030_00", "", "A1");
        assert_eq!(candidate_id(&e).as_deref(), Some("A1-003"));
        let e = with_expansion("opaque", "", "A1");
        assert_eq!(candidate_id(&e).as_deref(), Some("A1-000"));
    }

    #[test]
    fn no_expansion_is_skipped() {
        let (mapping, report) = build_sync_mapping(&[entry("K", "nowhere")]);
        assert!(mapping.is_empty());
        assert_eq!(report.skipped, vec!["K".to_string()]);
    }

    #[test]
    fn a4b_then_original_prefers_original() {
        let (mapping, report) =
            build_sync_mapping(&[entry("K", "/cards/A4B/10"), entry("K", "/cards/A1/10")]);
        assert_eq!(mapping["K"], "A1-010");
        assert_eq!(report.replaced, 1);
    }

    #[test]
    fn original_then_a4b_keeps_original() {
        let (mapping, report) =
            build_sync_mapping(&[entry("K", "/cards/A1/10"), entry("K", "/cards/a4b/10")]);
        assert_eq!(mapping["K"], "A1-010");
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn same_preference_keeps_first_seen() {
        let (mapping, _) =
            build_sync_mapping(&[entry("K", "/cards/A1/10"), entry("K", "/cards/A2/10")]);
        assert_eq!(mapping["K"], "A1-010");

        let (mapping, _) =
            build_sync_mapping(&[entry("K", "/cards/A4B/10"), entry("K", "/cards/A4B/11")]);
        assert_eq!(mapping["K"], "A4B-010");
    }

    #[test]
    fn ordering_is_numeric_within_expansion() {
        let mapping: SyncMapping = [
            ("k1", "A10-001"),
            ("k2", "A2-005"),
            ("k3", "A2-004"),
            ("k4", "A4B-001"),
            ("k5", "A4-100"),
            ("k6", "P-A-001"),
            ("k7", "B1-001"),
            ("k0", "A2-004"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let keys: Vec<String> = ordered_entries(&mapping).into_iter().map(|(k, _)| k).collect();
        // "P-A-001" has no well-formed prefix and sorts by its raw text,
        // which lands after the "B" bucket
        assert_eq!(keys, vec!["k0", "k3", "k2", "k5", "k4", "k1", "k7", "k6"]);
    }
}

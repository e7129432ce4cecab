//! Enrichment: patch `type`/`element` from a secondary lookup and shrink
//! the missing set.
//!
//! This is the only path allowed to field-patch a [`Card`](crate::model::Card); the detail
//! source exposes type and element only, so a full record can't be rebuilt.

use std::collections::BTreeSet;
use std::fmt;

use crate::missing;
use crate::model::{Catalog, MissingSet};
use crate::normalize::{normalize_id, normalize_number};

/// Fields an enrichment update may set. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub card_type: Option<String>,
    pub element: Option<String>,
}

/// Type line scraped from a card-detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Lowercased primary type, e.g. `pokemon` or `trainer`.
    pub primary: String,
    /// Trainer subtype (`supporter`, `item`, `tool`, …).
    pub subtype: Option<String>,
    /// Pokemon element (`fire`, `water`, …).
    pub element: Option<String>,
}

impl FieldUpdate {
    /// Trainers take their subtype as `type`; pokemon carry an element;
    /// anything else keeps the primary type verbatim.
    pub fn from_type_info(info: &TypeInfo) -> Self {
        match (info.primary.as_str(), &info.subtype) {
            ("trainer", Some(subtype)) => Self {
                card_type: Some(subtype.clone()),
                element: None,
            },
            ("pokemon", _) => Self {
                card_type: Some("pokemon".into()),
                element: info.element.clone(),
            },
            _ => Self {
                card_type: Some(info.primary.clone()),
                element: None,
            },
        }
    }
}

/// Per-ID detail lookup, implemented by the HTML collaborator.
pub trait TypeLookup {
    type Error: fmt::Display;

    /// `Ok(None)` when the page or its type line is absent.
    fn lookup(&mut self, set_code: &str, number: u32) -> Result<Option<TypeInfo>, Self::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Keys (as supplied) that found a catalog entry.
    pub matched: BTreeSet<String>,
    /// Keys with no catalog entry under either spelling.
    pub unmatched: Vec<String>,
    /// Missing-set members whose ID could not be parsed into a lookup.
    pub unparsable: Vec<String>,
    /// Members the lookup returned nothing for.
    pub unknown: Vec<String>,
    /// Members whose lookup failed outright.
    pub failed: Vec<String>,
}

/// Apply updates in order. Misses are skipped, never fatal.
pub fn apply_updates(catalog: &mut Catalog, updates: &[(String, FieldUpdate)]) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();

    for (key, update) in updates {
        let target = if catalog.contains_key(key) {
            Some(key.clone())
        } else {
            let normalized = normalize_id(key);
            catalog.contains_key(&normalized).then_some(normalized)
        };

        let Some(target) = target else {
            log::debug!("enrich: no catalog entry for {key}");
            report.unmatched.push(key.clone());
            continue;
        };

        if let Some(card) = catalog.get_mut(&target) {
            if let Some(ref card_type) = update.card_type {
                card.card_type = card_type.clone();
            }
            if let Some(ref element) = update.element {
                card.element = element.clone();
            }
            report.matched.insert(key.clone());
        }
    }

    report
}

/// Apply updates and drop every matched key from the missing set.
pub fn resolve_updates(
    catalog: &mut Catalog,
    missing_set: &MissingSet,
    updates: &[(String, FieldUpdate)],
) -> (MissingSet, EnrichmentReport) {
    let report = apply_updates(catalog, updates);
    let remaining = missing::resolve(missing_set, &report.matched);
    (remaining, report)
}

/// Look up every missing-set member, then resolve.
pub fn resolve_missing<L: TypeLookup>(
    catalog: &mut Catalog,
    missing_set: &MissingSet,
    lookup: &mut L,
) -> (MissingSet, EnrichmentReport) {
    let total = missing_set.len();
    let mut updates = Vec::new();
    let mut unparsable = Vec::new();
    let mut unknown = Vec::new();
    let mut failed = Vec::new();

    for (idx, id) in missing_set.iter().enumerate() {
        let progress = format!("[{}/{}] {}", idx + 1, total, id);
        let Some((set_code, number)) = parse_missing_id(id) else {
            log::warn!("{progress}: unable to parse id");
            unparsable.push(id.clone());
            continue;
        };

        match lookup.lookup(&set_code, number) {
            Ok(Some(info)) => {
                let update = FieldUpdate::from_type_info(&info);
                log::info!(
                    "{progress}: {} -> {}",
                    info.primary,
                    update.card_type.as_deref().unwrap_or("")
                );
                updates.push((id.clone(), update));
            }
            Ok(None) => {
                log::info!("{progress}: unknown");
                unknown.push(id.clone());
            }
            Err(e) => {
                log::warn!("{progress}: lookup failed: {e}");
                failed.push(id.clone());
            }
        }
    }

    let (remaining, mut report) = resolve_updates(catalog, missing_set, &updates);
    report.unparsable = unparsable;
    report.unknown = unknown;
    report.failed = failed;
    (remaining, report)
}

/// Recover `(set_code, number)` from a missing-set ID.
///
/// `P-A-001` / `PROMO-A-001` keep the two-segment promo set code; other IDs
/// use their first segment. The number is the last segment, digit-extracted
/// when it is not purely numeric.
pub fn parse_missing_id(id: &str) -> Option<(String, u32)> {
    let s = id.trim();
    if !s.contains('-') {
        return None;
    }
    let parts: Vec<&str> = s.split('-').collect();
    let is_promo = matches!(parts[0].to_uppercase().as_str(), "P" | "PROMO");

    let set_code = if parts.len() >= 3 && is_promo {
        format!("{}-{}", parts[0], parts[1])
    } else {
        parts[0].to_string()
    };
    let num_part = parts[parts.len() - 1];

    if !num_part.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let (_, number) = normalize_number(num_part);
    Some((set_code, number))
}

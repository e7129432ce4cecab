//! Tracking of cards whose `type` is still unknown.
//!
//! The set grows across runs by union and only shrinks when an ID is
//! resolved (enrichment matched it, or the catalog now carries a type).

use std::collections::BTreeSet;

use crate::model::{Card, Catalog, MissingSet};
use crate::normalize::normalize_id;

/// IDs of cards with a blank `type`.
pub fn scan(cards: &[Card]) -> MissingSet {
    cards
        .iter()
        .filter(|c| !c.has_type() && !c.id.is_empty())
        .map(|c| normalize_id(&c.id))
        .collect()
}

pub fn reconcile(existing: &MissingSet, detected: &MissingSet) -> MissingSet {
    existing.union(detected).cloned().collect()
}

/// Drop IDs whose catalog entry now has a type.
pub fn prune_resolved(missing: &MissingSet, catalog: &Catalog) -> MissingSet {
    missing
        .iter()
        .filter(|id| catalog.get(*id).map_or(true, |card| !card.has_type()))
        .cloned()
        .collect()
}

/// Remove exactly the keys that enrichment matched.
pub fn resolve(missing: &MissingSet, matched: &BTreeSet<String>) -> MissingSet {
    missing.difference(matched).cloned().collect()
}

use crate::model::{Card, Catalog};
use crate::normalize::{normalize_id, normalize_set};

/// Whether incoming cards replace existing entries with the same ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Incoming cards always win.
    Override,
    /// Incoming cards only fill IDs the catalog does not have yet.
    KeepExisting,
}

impl OverridePolicy {
    pub fn from_flag(override_existing: bool) -> Self {
        if override_existing {
            Self::Override
        } else {
            Self::KeepExisting
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Override => "overridden/added",
            Self::KeepExisting => "added",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub catalog: Catalog,
    /// IDs that were new to the catalog.
    pub added: usize,
    /// IDs whose existing entry was replaced.
    pub replaced: usize,
    /// Incoming cards dropped because an entry already existed.
    pub kept: usize,
}

/// Rebuild a persisted card list into a canonical catalog.
///
/// Stored IDs and set codes are re-normalized on read, since the canonical
/// form may have changed after an entry was written. Rows without an ID are
/// dropped; later rows win on key collisions.
pub fn upgrade_legacy(cards: Vec<Card>) -> Catalog {
    let mut catalog = Catalog::new();
    for mut card in cards {
        let raw_id = card.id.trim();
        if raw_id.is_empty() {
            continue;
        }
        let id = normalize_id(raw_id);
        if !card.set.is_empty() {
            card.set = normalize_set(&card.set);
        }
        card.id = id.clone();
        catalog.insert(id, card);
    }
    catalog
}

/// Merge freshly canonicalized cards into an existing catalog.
///
/// Never deletes: IDs absent from `incoming` keep their existing entry.
/// `existing` is left untouched; the merged result is a new catalog.
pub fn merge(existing: &Catalog, incoming: Vec<Card>, policy: OverridePolicy) -> MergeOutcome {
    let mut catalog = existing.clone();
    let mut added = 0;
    let mut replaced = 0;
    let mut kept = 0;

    for card in incoming {
        let id = card.id.trim().to_string();
        if id.is_empty() {
            continue;
        }
        match (catalog.contains_key(&id), policy) {
            (false, _) => {
                catalog.insert(id, card);
                added += 1;
            }
            (true, OverridePolicy::Override) => {
                catalog.insert(id, card);
                replaced += 1;
            }
            (true, OverridePolicy::KeepExisting) => kept += 1,
        }
    }

    log::debug!("merge: {added} added, {replaced} replaced, {kept} kept");

    MergeOutcome {
        catalog,
        added,
        replaced,
        kept,
    }
}

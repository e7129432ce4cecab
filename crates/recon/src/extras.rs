//! Secondary per-card overrides: the extras feed (element/type) and the
//! curated foil allow-list.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Card, RawExtras};
use crate::normalize::{build_id, normalize_number, normalize_set, pad_number};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtrasEntry {
    pub element: String,
    pub card_type: String,
}

/// Extras keyed by CanonicalID.
#[derive(Debug, Clone, Default)]
pub struct ExtrasLookup {
    entries: BTreeMap<String, ExtrasEntry>,
}

impl ExtrasLookup {
    /// Key every record by its canonical ID. Later records win.
    pub fn build(records: &[RawExtras]) -> Self {
        let mut entries = BTreeMap::new();
        for record in records {
            let set = normalize_set(record.set.as_deref().unwrap_or(""));
            let (_, number) = normalize_number(record.number.as_deref().unwrap_or(""));
            entries.insert(
                lookup_key(&set, number),
                ExtrasEntry {
                    element: record.element.clone().unwrap_or_default(),
                    card_type: record.card_type.clone().unwrap_or_default(),
                },
            );
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExtrasEntry> {
        self.entries.get(id)
    }

    /// Copy non-empty element/type onto matching cards. Returns the number
    /// of cards touched.
    ///
    /// Cards are matched on set and integer number, so a card published as
    /// `"0042"` (ID `A3-0042`) still picks up the extras for `A3-042`.
    pub fn apply(&self, cards: &mut [Card]) -> usize {
        let mut touched = 0;
        for card in cards.iter_mut() {
            let Some(extra) = self.entries.get(&lookup_key(&card.set, card.number)) else {
                continue;
            };
            if !extra.element.is_empty() {
                card.element = extra.element.clone();
            }
            if !extra.card_type.is_empty() {
                card.card_type = extra.card_type.clone();
            }
            touched += 1;
        }
        touched
    }
}

fn lookup_key(set: &str, number: u32) -> String {
    build_id(set, &pad_number(number))
}

/// Parse the foil allow-list: one ID per line, blank lines and `#` / `//`
/// comments skipped, case-insensitive.
pub fn parse_foil_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
        .map(str::to_uppercase)
        .collect()
}

/// Mark listed cards as foil. Returns the number of cards marked.
pub fn apply_foil_overrides(cards: &mut [Card], foiled: &BTreeSet<String>) -> usize {
    if foiled.is_empty() {
        return 0;
    }
    let mut marked = 0;
    for card in cards.iter_mut() {
        if !card.id.is_empty() && foiled.contains(&card.id.to_uppercase()) {
            card.is_foil = true;
            marked += 1;
        }
    }
    marked
}

// Catalog store (release/cards.json)

use std::path::Path;

use serde_json::Value;
use tcgsync_recon::{upgrade_legacy, Card, Catalog};

use crate::write::{read_json, write_json, TWO_SPACES};

/// Load the persisted catalog through the legacy upgrade path.
///
/// Absent, unreadable or non-array files load as an empty catalog.
/// Non-object elements are dropped; object fields are read leniently.
pub fn load_catalog(path: &Path) -> Catalog {
    let value = match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => return Catalog::new(),
        Err(e) => {
            log::warn!("ignoring unreadable catalog {e}");
            return Catalog::new();
        }
    };

    let Value::Array(items) = value else {
        log::warn!("ignoring catalog {}: not a JSON array", path.display());
        return Catalog::new();
    };

    let cards: Vec<Card> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    upgrade_legacy(cards)
}

/// Persist as a JSON array sorted by ID.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), String> {
    let cards: Vec<&Card> = catalog.values().collect();
    write_json(path, &cards, TWO_SPACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn card(id: &str, set: &str, card_type: &str) -> Card {
        Card {
            id: id.into(),
            set: set.into(),
            series: set.chars().next().map(String::from).unwrap_or_default(),
            number: 1,
            card_type: card_type.into(),
            ..Card::default()
        }
    }

    #[test]
    fn absent_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(load_catalog(&dir.path().join("cards.json")).is_empty());
    }

    #[test]
    fn garbage_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_catalog(&path).is_empty());
        fs::write(&path, "{\"id\": \"A1-001\"}").unwrap();
        assert!(load_catalog(&path).is_empty());
    }

    #[test]
    fn save_then_load_is_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("release").join("cards.json");

        let mut catalog = Catalog::new();
        for c in [card("B1-001", "B1", ""), card("A1-001", "A1", "grass")] {
            catalog.insert(c.id.clone(), c);
        }

        save_catalog(&path, &catalog).unwrap();
        assert_eq!(load_catalog(&path), catalog);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("A1-001").unwrap() < text.find("B1-001").unwrap());
        assert!(text.starts_with("[\n  {\n    \"series\": \"A\",\n    \"set\": \"A1\","));
    }

    #[test]
    fn legacy_entries_are_upgraded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(
            &path,
            r#"[
                {"id": "PROMO-A-007", "set": "promo-a", "number": "7", "isFoil": 1},
                {"id": "", "set": "A1"},
                "junk"
            ]"#,
        )
        .unwrap();

        let catalog = load_catalog(&path);
        assert_eq!(catalog.len(), 1);
        let card = &catalog["P-A-007"];
        assert_eq!(card.set, "P-A");
        assert_eq!(card.number, 7);
        assert!(card.is_foil);
    }
}

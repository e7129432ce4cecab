// Set catalog store (release/sets.json)

use std::path::Path;

use tcgsync_recon::sets::SetEntry;

use crate::write::{write_json, FOUR_SPACES};

/// Persist the set catalog in the order given, 4-space indented.
pub fn save_sets(path: &Path, sets: &[SetEntry]) -> Result<(), String> {
    write_json(path, sets, FOUR_SPACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_camel_case_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sets.json");
        let sets = vec![SetEntry {
            code: "A1".into(),
            name: "Genetic Apex".into(),
            short_name: "GA".into(),
            series: "A".into(),
            count: json!(286),
            release_date: json!("2024-10-30"),
            packs: json!(["Mewtwo"]),
        }];

        save_sets(&path, &sets).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"code\": \"A1\","));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["shortName"], "GA");
        assert_eq!(parsed[0]["releaseDate"], "2024-10-30");
    }
}

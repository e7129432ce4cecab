// Missing-data store (misc/missing_data.json)

use std::path::Path;

use serde_json::Value;
use tcgsync_recon::MissingSet;

use crate::write::{read_json, write_json, TWO_SPACES};

/// Load the MissingSet. Absent or unreadable files are empty; blank and
/// non-scalar entries are ignored, integers are taken as their text.
pub fn load_missing(path: &Path) -> MissingSet {
    let items = match read_json(path) {
        Ok(Some(Value::Array(items))) => items,
        Ok(Some(_)) => {
            log::warn!("ignoring missing-data store {}: not a JSON array", path.display());
            return MissingSet::new();
        }
        Ok(None) => return MissingSet::new(),
        Err(e) => {
            log::warn!("ignoring unreadable missing-data store {e}");
            return MissingSet::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Persist as a sorted JSON array of strings.
pub fn save_missing(path: &Path, missing: &MissingSet) -> Result<(), String> {
    write_json(path, missing, TWO_SPACES)
}

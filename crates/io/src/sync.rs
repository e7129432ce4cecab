// Sync mapping store (release/sync.json)

use std::path::Path;

use serde_json::{Map, Value};
use tcgsync_recon::sync::ordered_entries;
use tcgsync_recon::SyncMapping;

use crate::write::{read_json, write_json, TWO_SPACES};

/// Persist the mapping as a JSON object in sync order (expansion, then
/// card number), not key order.
pub fn save_sync(path: &Path, mapping: &SyncMapping) -> Result<(), String> {
    let object: Map<String, Value> = ordered_entries(mapping)
        .into_iter()
        .map(|(key, id)| (key, Value::String(id)))
        .collect();
    write_json(path, &Value::Object(object), TWO_SPACES)
}

/// Read a previously written mapping. Only used for reporting; the mapping
/// itself is rebuilt from scratch every run.
pub fn load_sync(path: &Path) -> SyncMapping {
    match read_json(path) {
        Ok(Some(Value::Object(object))) => object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(id) => Some((key, id)),
                _ => None,
            })
            .collect(),
        Ok(_) => SyncMapping::new(),
        Err(e) => {
            log::warn!("ignoring unreadable sync mapping {e}");
            SyncMapping::new()
        }
    }
}

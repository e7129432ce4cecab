// Shared JSON writer

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

pub(crate) const TWO_SPACES: &[u8] = b"  ";
pub(crate) const FOUR_SPACES: &[u8] = b"    ";

/// Pretty-print `value` with the given indent and replace `path` with it.
/// Non-ASCII text is written as-is.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    indent: &[u8],
) -> Result<(), String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    value.serialize(&mut ser).map_err(|e| e.to_string())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {}", parent.display(), e))?;
    }

    // Write beside the target then rename, so readers never see half a file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &buf).map_err(|e| format!("{}: {}", tmp.display(), e))?;
    fs::rename(&tmp, path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(())
}

/// Read and decode a JSON store. `Ok(None)` when the file does not exist.
pub(crate) fn read_json(path: &Path) -> Result<Option<serde_json::Value>, String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("{}: {}", path.display(), e)),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn creates_parents_and_keeps_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.json");

        write_json(&path, &json!({"name": "Flabébé"}), TWO_SPACES).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"name\": \"Flabébé\"\n}");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn four_space_indent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!([1]), FOUR_SPACES).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[\n    1\n]");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        assert_eq!(read_json(&dir.path().join("nope.json")).unwrap(), None);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{oops").unwrap();
        assert!(read_json(&bad).is_err());
    }
}

// Plain-text inputs: foil allow-list and the cross-reference export

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tcgsync_recon::extras::parse_foil_list;

/// Load the foil allow-list. An absent file is an empty list.
pub fn load_foil_list(path: &Path) -> BTreeSet<String> {
    match fs::read_to_string(path) {
        Ok(text) => parse_foil_list(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => BTreeSet::new(),
        Err(e) => {
            log::warn!("ignoring foil list {}: {}", path.display(), e);
            BTreeSet::new()
        }
    }
}

/// First candidate that exists on disk.
pub fn find_reference(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

/// Read the reference export as text; undecodable bytes are replaced.
pub fn read_reference(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn foil_list_absent_is_empty() {
        let dir = tempdir().unwrap();
        assert!(load_foil_list(&dir.path().join("FoiledCards.txt")).is_empty());
    }

    #[test]
    fn foil_list_reads_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FoiledCards.txt");
        fs::write(&path, "# header\na1-001\n\n// note\n P-A-007 \n").unwrap();

        let ids: Vec<String> = load_foil_list(&path).into_iter().collect();
        assert_eq!(ids, vec!["A1-001", "P-A-007"]);
    }

    #[test]
    fn first_existing_reference_wins() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("reference.json");
        let second = dir.path().join("misc").join("reference.json");
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&second, "[]").unwrap();

        let candidates = vec![first.clone(), second.clone()];
        assert_eq!(find_reference(&candidates), Some(second));

        fs::write(&first, "{}").unwrap();
        assert_eq!(find_reference(&candidates), Some(first.clone()));
        assert_eq!(read_reference(&first).unwrap(), "{}");
    }

    #[test]
    fn reference_lossy_decoding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.json");
        fs::write(&path, [b'{', 0xff, b'}']).unwrap();
        assert_eq!(read_reference(&path).unwrap(), "{\u{fffd}}");
    }
}

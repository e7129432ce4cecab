// Pipeline settings
// Loaded from ./tcgsync.toml or ~/.config/tcgsync/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "tcgsync.toml";

/// Where each persisted store lives. Relative paths resolve against the
/// directory of the config file (or the working directory for defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Published outputs: cards, sets, sync mapping
    pub release_dir: PathBuf,

    /// Working state: missing-data set
    pub misc_dir: PathBuf,

    pub cards_file: String,
    pub missing_file: String,
    pub sync_file: String,
    pub sets_file: String,

    /// Curated foil allow-list (plain text, one ID per line)
    pub foil_list: PathBuf,

    /// Cross-reference export, first existing candidate wins
    pub reference: Vec<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            release_dir: PathBuf::from("release"),
            misc_dir: PathBuf::from("misc"),
            cards_file: "cards.json".into(),
            missing_file: "missing_data.json".into(),
            sync_file: "sync.json".into(),
            sets_file: "sets.json".into(),
            foil_list: PathBuf::from("FoiledCards.txt"),
            reference: vec![
                PathBuf::from("reference.json"),
                PathBuf::from("misc/reference.json"),
            ],
        }
    }
}

/// Upstream endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub cards_url: String,
    pub extras_url: String,
    pub sets_url: String,

    /// Prefix for card image locations; `<set>/<number>.webp` is appended
    pub image_base_url: String,

    /// Card-detail site used to fill in missing types
    pub detail_base_url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        let db = "https://raw.githubusercontent.com/flibustier/pokemon-tcg-pocket-database/main/dist";
        Self {
            cards_url: format!("{db}/cards.json"),
            extras_url: format!("{db}/cards.extra.json"),
            sets_url: format!("{db}/sets.json"),
            image_base_url: "https://raw.githubusercontent.com/flibustier/pokemon-tcg-exchange/refs/heads/main/public/images/cards-by-set/".into(),
            detail_base_url: "https://pocket.limitlesstcg.com".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Retries for 429 / 5xx / network errors (0 = single attempt)
    pub max_retries: u32,
    /// First wait between retries, doubled per attempt. A `Retry-After`
    /// header takes precedence.
    pub backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("tcgsync/", env!("CARGO_PKG_VERSION")).into(),
            max_retries: 3,
            backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Incoming cards replace existing catalog entries with the same ID
    pub override_existing: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self { override_existing: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub sources: SourceSettings,
    pub http: HttpSettings,
    pub merge: MergeSettings,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Settings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let files = [
            ("paths.cards_file", &self.paths.cards_file),
            ("paths.missing_file", &self.paths.missing_file),
            ("paths.sync_file", &self.paths.sync_file),
            ("paths.sets_file", &self.paths.sets_file),
        ];
        for (field, value) in files {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{field} must not be empty")));
            }
        }

        if self.paths.reference.is_empty() {
            return Err(ConfigError::Validation(
                "paths.reference needs at least one candidate".into(),
            ));
        }

        let urls = [
            ("sources.cards_url", &self.sources.cards_url),
            ("sources.extras_url", &self.sources.extras_url),
            ("sources.sets_url", &self.sources.sets_url),
            ("sources.detail_base_url", &self.sources.detail_base_url),
        ];
        for (field, value) in urls {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{field} must be an http(s) URL, got \"{value}\""
                )));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation("http.timeout_secs must be > 0".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

impl Settings {
    /// User-level config file path
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tcgsync")
            .join("config.toml")
    }

    /// Read a specific config file. Any failure is an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&contents)?;
        settings.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(settings)
    }

    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, `./tcgsync.toml`
    /// then the user config file are tried; the first one that exists must
    /// parse. No config file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::discover(&[PathBuf::from(CONFIG_FILE_NAME), Self::user_config_path()]),
        }
    }

    fn discover(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                let settings = Self::from_file(path)?;
                log::debug!("loaded config from {}", path.display());
                Ok(settings)
            }
            None => Ok(Self::with_base_dir(".")),
        }
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn release_dir(&self) -> PathBuf {
        self.resolve(&self.paths.release_dir)
    }

    pub fn misc_dir(&self) -> PathBuf {
        self.resolve(&self.paths.misc_dir)
    }

    pub fn cards_path(&self) -> PathBuf {
        self.release_dir().join(&self.paths.cards_file)
    }

    pub fn sets_path(&self) -> PathBuf {
        self.release_dir().join(&self.paths.sets_file)
    }

    pub fn sync_path(&self) -> PathBuf {
        self.release_dir().join(&self.paths.sync_file)
    }

    pub fn missing_path(&self) -> PathBuf {
        self.misc_dir().join(&self.paths.missing_file)
    }

    pub fn foil_list_path(&self) -> PathBuf {
        self.resolve(&self.paths.foil_list)
    }

    pub fn reference_candidates(&self) -> Vec<PathBuf> {
        self.paths.reference.iter().map(|p| self.resolve(p)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert!(settings.merge.override_existing);
        assert_eq!(settings.http.max_retries, 3);
        assert_eq!(settings.http.backoff_ms, 1000);
    }

    #[test]
    fn http_backoff_is_configurable() {
        let settings = Settings::from_toml("[http]
backoff_ms = 0
max_retries = 5").unwrap();
        assert_eq!(settings.http.backoff_ms, 0);
        assert_eq!(settings.http.max_retries, 5);
        assert_eq!(settings.http.timeout_secs, 30);
    }

    #[test]
    fn empty_toml_is_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml(
            r#"
[merge]
override_existing = false

[paths]
release_dir = "out"
"#,
        )
        .unwrap();
        assert!(!settings.merge.override_existing);
        assert_eq!(settings.paths.release_dir, PathBuf::from("out"));
        assert_eq!(settings.paths.cards_file, "cards.json");
        assert_eq!(settings.sources, SourceSettings::default());
    }

    #[test]
    fn rejects_bad_values() {
        let err = Settings::from_toml("[sources]\ncards_url = \"ftp://x\"").unwrap_err();
        assert!(err.to_string().contains("sources.cards_url"));

        let err = Settings::from_toml("[paths]\ncards_file = \" \"").unwrap_err();
        assert!(err.to_string().contains("paths.cards_file"));

        let err = Settings::from_toml("[paths]\nreference = []").unwrap_err();
        assert!(err.to_string().contains("paths.reference"));

        let err = Settings::from_toml("[http]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        assert!(matches!(Settings::from_toml("merge = 5"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tcgsync.toml");
        fs::write(&path, "[paths]\nmisc_dir = \"state\"\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.cards_path(), dir.path().join("release").join("cards.json"));
        assert_eq!(settings.missing_path(), dir.path().join("state").join("missing_data.json"));
        assert_eq!(settings.foil_list_path(), dir.path().join("FoiledCards.txt"));
        assert_eq!(
            settings.reference_candidates(),
            vec![dir.path().join("reference.json"), dir.path().join("misc/reference.json")]
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn discovery_takes_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("tcgsync.toml");
        let user = dir.path().join("user").join("config.toml");
        fs::create_dir_all(user.parent().unwrap()).unwrap();
        fs::write(&user, "[merge]\noverride_existing = false\n").unwrap();

        let settings = Settings::discover(&[local.clone(), user.clone()]).unwrap();
        assert!(!settings.merge.override_existing);
        assert_eq!(settings.base_dir, dir.path().join("user"));

        let none = Settings::discover(&[local]).unwrap();
        assert_eq!(none.base_dir, PathBuf::from("."));
    }

    #[test]
    fn broken_discovered_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("tcgsync.toml");
        let user = dir.path().join("config.toml");
        fs::write(&local, "[paths\nrelease_dir = \"out\"").unwrap();
        fs::write(&user, "").unwrap();

        let err = Settings::discover(&[local, user]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut settings = Settings::default();
        settings.merge.override_existing = false;
        let text = settings.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }
}

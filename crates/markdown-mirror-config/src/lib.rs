use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable consulted when the config file carries no token.
pub const TOKEN_ENV_VAR: &str = "MARKDOWN_MIRROR_TOKEN";

/// Default state document name, placed in the docs root.
pub const STATE_FILE_NAME: &str = ".markdown-mirror.json";

/// Destination limit on blocks per append call.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub docs_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_page_id: Option<String>,
    #[serde(default = "default_root_title")]
    pub root_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default)]
    pub flat: bool,
    /// Leading directory elided from the remote tree. Empty disables.
    #[serde(default = "default_skip_segment")]
    pub skip_segment: String,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,
}

fn default_root_title() -> String {
    "Documentation".to_string()
}

fn default_skip_segment() -> String {
    "docs".to_string()
}

fn default_requests_per_second() -> f64 {
    3.0
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_watchdog_secs() -> u64 {
    10
}

impl Config {
    /// A config for `docs_path` with every other setting at its default.
    pub fn new(docs_path: impl Into<PathBuf>) -> Self {
        Self {
            docs_path: docs_path.into(),
            state_path: None,
            root_page_id: None,
            root_title: default_root_title(),
            api_token: None,
            flat: false,
            skip_segment: default_skip_segment(),
            exclude: Vec::new(),
            requests_per_second: default_requests_per_second(),
            batch_size: default_batch_size(),
            watchdog_secs: default_watchdog_secs(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in path settings
        config.docs_path = Self::expand_path(&config.docs_path).unwrap_or(config.docs_path);
        config.state_path = config
            .state_path
            .map(|p| Self::expand_path(&p).unwrap_or(p));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-mirror");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Where the sync state document lives.
    pub fn resolved_state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| self.docs_path.join(STATE_FILE_NAME))
    }

    pub fn skip_segment(&self) -> Option<&str> {
        let segment = self.skip_segment.trim();
        (!segment.is_empty()).then_some(segment)
    }

    /// Credential from the config file, else from the environment.
    pub fn api_token(&self) -> Option<String> {
        self.resolve_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn resolve_token(&self, from_env: Option<String>) -> Option<String> {
        self.api_token
            .clone()
            .or(from_env)
            .filter(|token| !token.trim().is_empty())
    }

    /// Blocks per append call, clamped to what the destination accepts.
    pub fn batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.exclude
            .iter()
            .map(|raw| {
                glob::Pattern::new(raw)
                    .map_err(|e| ConfigError::Invalid(format!("exclude pattern '{raw}': {e}")))
            })
            .collect()
    }

    /// Check everything a run needs before any file is touched.
    ///
    /// `require_token` is false for offline commands.
    pub fn validate(&self, require_token: bool) -> Result<(), ConfigError> {
        if !self.docs_path.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "docs directory not found: {}",
                self.docs_path.display()
            )));
        }
        if !(self.requests_per_second.is_finite() && self.requests_per_second > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "requests_per_second must be positive, got {}",
                self.requests_per_second
            )));
        }
        if require_token && self.api_token().is_none() {
            return Err(ConfigError::Invalid(format!(
                "no API token: set api_token or {TOKEN_ENV_VAR}"
            )));
        }
        self.exclude_patterns()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-mirror/config.toml"));
    }

    #[test]
    fn test_defaults_apply_to_minimal_file() {
        let config: Config = toml::from_str(r#"docs_path = "/srv/docs""#).unwrap();

        assert_eq!(config, Config::new("/srv/docs"));
        assert_eq!(config.skip_segment(), Some("docs"));
        assert_eq!(
            config.resolved_state_path(),
            PathBuf::from("/srv/docs/.markdown-mirror.json")
        );
        assert_eq!(config.watchdog_secs, 10);
    }

    #[test]
    fn test_full_file() {
        let config: Config = toml::from_str(
            r#"
docs_path = "/srv/docs"
state_path = "/var/lib/mirror/state.json"
root_page_id = "abc123"
root_title = "Handbook"
flat = true
skip_segment = ""
exclude = ["drafts/**"]
requests_per_second = 2.5
batch_size = 500
"#,
        )
        .unwrap();

        assert_eq!(config.root_page_id.as_deref(), Some("abc123"));
        assert_eq!(config.skip_segment(), None);
        assert_eq!(config.batch_size(), MAX_BATCH_SIZE);
        assert_eq!(config.exclude_patterns().unwrap().len(), 1);
        assert_eq!(
            config.resolved_state_path(),
            PathBuf::from("/var/lib/mirror/state.json")
        );
    }

    #[test]
    fn test_batch_size_lower_bound() {
        let config = Config {
            batch_size: 0,
            ..Config::new("/srv/docs")
        };
        assert_eq!(config.batch_size(), 1);
    }

    #[test]
    fn test_token_prefers_file_then_env() {
        let mut config = Config::new("/srv/docs");
        assert_eq!(config.resolve_token(None), None);
        assert_eq!(
            config.resolve_token(Some("from-env".into())),
            Some("from-env".to_string())
        );

        config.api_token = Some("from-file".into());
        assert_eq!(
            config.resolve_token(Some("from-env".into())),
            Some("from-file".to_string())
        );

        config.api_token = Some("  ".into());
        assert_eq!(config.resolve_token(None), None);
    }

    #[test]
    fn test_validate() {
        let temp_dir = TempDir::new().unwrap();
        let ok = Config {
            api_token: Some("secret".into()),
            ..Config::new(temp_dir.path())
        };
        assert!(ok.validate(true).is_ok());

        let missing_dir = Config::new(temp_dir.path().join("nope"));
        assert!(matches!(missing_dir.validate(false), Err(ConfigError::Invalid(_))));

        let bad_rate = Config {
            requests_per_second: 0.0,
            ..ok.clone()
        };
        assert!(matches!(bad_rate.validate(true), Err(ConfigError::Invalid(_))));

        let bad_glob = Config {
            exclude: vec!["[".into()],
            ..ok.clone()
        };
        assert!(matches!(bad_glob.validate(true), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("MIRROR_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$MIRROR_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("MIRROR_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_expands_tilde() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "docs_path = \"~/handbook/docs\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        let docs = config.docs_path.to_string_lossy();
        assert!(!docs.starts_with('~'));
        assert!(docs.ends_with("handbook/docs"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "docs_path = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            root_page_id: Some("root".into()),
            exclude: vec!["drafts/**".into()],
            ..Config::new("/tmp/test-docs")
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}

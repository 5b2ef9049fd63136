//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.cinedex/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::providers::tmdb::DEFAULT_TMDB_BASE_URL;
use crate::core::aggregator::BrowseContext;
use crate::core::storage::default_favourites_path;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CinedexConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// "popular", "genre:<id>" or "search:<query>"
    pub start_with: Option<String>,
    pub favourites_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub language: Option<String>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub start_context: BrowseContext,
    pub favourites_path: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub language: Option<String>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub start_context: Option<BrowseContext>,
    pub favourites_file: Option<PathBuf>,
    pub language: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.cinedex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cinedex").join("config.toml"))
}

/// Load config from `~/.cinedex/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CinedexConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CinedexConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CinedexConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CinedexConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CinedexConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CinedexConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    // Keep the API key out of the log.
    debug!(
        "Config: start_with={:?}, favourites_file={:?}, base_url={:?}, language={:?}",
        config.general.start_with,
        config.general.favourites_file,
        config.tmdb.base_url,
        config.tmdb.language
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# cinedex configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# start_with = "popular"              # "popular", "genre:28" or "search:alien"
# favourites_file = "~/.cinedex/favourites.json"

# [tmdb]
# api_key = "..."                     # Or set TMDB_API_KEY env var
# base_url = "https://api.themoviedb.org/3"
# language = "en-US"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

/// Parses `popular`, `genre:<id>` or `search:<query>`.
pub fn parse_context(value: &str) -> Option<BrowseContext> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("popular") {
        return Some(BrowseContext::Popular);
    }
    if let Some(id) = value.strip_prefix("genre:") {
        return id.trim().parse().ok().map(BrowseContext::Genre);
    }
    if let Some(query) = value.strip_prefix("search:") {
        let query = query.trim();
        return (!query.is_empty()).then(|| BrowseContext::Search(query.to_string()));
    }
    None
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|h| h.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CinedexConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Start context: CLI → env → config → popular
    let start_context = cli
        .start_context
        .clone()
        .or_else(|| {
            std::env::var("CINEDEX_START_WITH")
                .ok()
                .and_then(|v| parse_context(&v))
        })
        .or_else(|| {
            config.general.start_with.as_deref().and_then(|v| {
                let parsed = parse_context(v);
                if parsed.is_none() {
                    warn!("Ignoring invalid start_with in config: {:?}", v);
                }
                parsed
            })
        })
        .unwrap_or_default();

    // Favourites file: CLI → env → config → ~/.cinedex/favourites.json
    let favourites_path = cli
        .favourites_file
        .clone()
        .or_else(|| std::env::var("CINEDEX_FAVOURITES_FILE").ok().map(|p| expand_home(&p)))
        .or_else(|| config.general.favourites_file.as_deref().map(expand_home))
        .or_else(default_favourites_path);

    // API key: env → config
    let tmdb_api_key = std::env::var("TMDB_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.tmdb.api_key.clone());

    // Base URL: env → config → default
    let tmdb_base_url = std::env::var("TMDB_BASE_URL")
        .ok()
        .or_else(|| config.tmdb.base_url.clone())
        .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string());

    // Language: CLI → env → config → API default
    let language = cli
        .language
        .clone()
        .or_else(|| std::env::var("CINEDEX_LANGUAGE").ok())
        .or_else(|| config.tmdb.language.clone());

    ResolvedConfig {
        start_context,
        favourites_path,
        tmdb_api_key,
        tmdb_base_url,
        language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = CinedexConfig::default();
        assert!(config.general.start_with.is_none());
        assert!(config.tmdb.api_key.is_none());
    }

    #[test]
    fn test_parse_context() {
        assert_eq!(parse_context("popular"), Some(BrowseContext::Popular));
        assert_eq!(parse_context("Popular"), Some(BrowseContext::Popular));
        assert_eq!(parse_context("genre:28"), Some(BrowseContext::Genre(28)));
        assert_eq!(
            parse_context("search: blade runner "),
            Some(BrowseContext::Search("blade runner".into()))
        );
        assert_eq!(parse_context("genre:abc"), None);
        assert_eq!(parse_context("search:"), None);
        assert_eq!(parse_context("trending"), None);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = CinedexConfig {
            general: GeneralConfig {
                start_with: Some("genre:35".to_string()),
                favourites_file: Some("/tmp/favs.json".to_string()),
            },
            tmdb: TmdbConfig {
                api_key: None,
                base_url: None,
                language: Some("de-DE".to_string()),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        if std::env::var("CINEDEX_START_WITH").is_err() {
            assert_eq!(resolved.start_context, BrowseContext::Genre(35));
        }
        if std::env::var("CINEDEX_FAVOURITES_FILE").is_err() {
            assert_eq!(resolved.favourites_path, Some(PathBuf::from("/tmp/favs.json")));
        }
        if std::env::var("CINEDEX_LANGUAGE").is_err() {
            assert_eq!(resolved.language.as_deref(), Some("de-DE"));
        }
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = CinedexConfig {
            general: GeneralConfig {
                start_with: Some("genre:35".to_string()),
                favourites_file: Some("/tmp/favs.json".to_string()),
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            start_context: Some(BrowseContext::Search("heat".into())),
            favourites_file: Some(PathBuf::from("/elsewhere.json")),
            language: Some("fr-FR".into()),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.start_context, BrowseContext::Search("heat".into()));
        assert_eq!(resolved.favourites_path, Some(PathBuf::from("/elsewhere.json")));
        assert_eq!(resolved.language.as_deref(), Some("fr-FR"));
    }

    #[test]
    fn test_invalid_start_with_falls_back() {
        let config = CinedexConfig {
            general: GeneralConfig {
                start_with: Some("nonsense".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        if std::env::var("CINEDEX_START_WITH").is_err() {
            assert_eq!(resolved.start_context, BrowseContext::Popular);
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
start_with = "search:alien"
favourites_file = "~/favs.json"

[tmdb]
api_key = "abc123"
base_url = "http://localhost:8080/3"
language = "en-GB"
"#;
        let config: CinedexConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.start_with.as_deref(), Some("search:alien"));
        assert_eq!(config.tmdb.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.tmdb.base_url.as_deref(), Some("http://localhost:8080/3"));
        assert_eq!(config.tmdb.language.as_deref(), Some("en-GB"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[tmdb]
language = "ja-JP"
"#;
        let config: CinedexConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tmdb.language.as_deref(), Some("ja-JP"));
        assert!(config.tmdb.api_key.is_none());
        assert!(config.general.start_with.is_none());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cinedex").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.tmdb.api_key.is_none());
        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("# [tmdb]"));
        // The generated file is all comments, so it loads as defaults
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.general.start_with.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tmdb\napi_key = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path.json"), PathBuf::from("/abs/path.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.json"), home.join("x.json"));
        }
    }
}

pub mod theme;

use crate::{
    error::SuggestError,
    flavor::{Flavor, Select, Suggest, substring},
    options::{OptionsOverride, SelectionPolicy},
    paths::resolve_path,
};
use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

pub use theme::{NamedColor, ThemeColor, ThemeConfig};

pub const APP_NAME: &str = "suggest";

fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config_home.is_empty()
    {
        return Some(PathBuf::from(xdg_config_home).join(APP_NAME));
    }
    dirs::home_dir().map(|home| home.join(".config").join(APP_NAME))
}

pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where candidates come from.
    /// ```toml
    /// [source]
    /// catalog = "~/data/presidents.json"
    /// ```
    #[serde(default)]
    pub source: Option<SourceConfig>,

    /// Session option overrides, applied over the flavor defaults.
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    /// Directory of the file this was loaded from; relative catalog paths
    /// resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlavorName {
    #[default]
    Suggest,
    Select,
}

impl FlavorName {
    pub fn build(self) -> Arc<dyn Flavor> {
        match self {
            Self::Suggest => Arc::new(Suggest),
            Self::Select => Arc::new(Select),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// JSON catalog file: a list of items, or `{items, articles, images}`.
    pub catalog: Option<String>,
    #[serde(default)]
    pub flavor: FlavorName,
    /// Simulated service latency in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Show every candidate the source returns
    All,
    /// Case-insensitive substring of the label
    Substring,
    /// Fuzzy match of the label; installed by the front end
    Fuzzy,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    pub min_len: Option<usize>,
    /// `soft` or `hard`.
    pub policy: Option<SelectionPolicy>,
    pub flyout: Option<bool>,
    pub timeout_content: Option<String>,
    /// Label of the "create new" row; omit to disable it.
    pub suggest_new: Option<String>,
    pub limit: Option<usize>,
    pub service_url: Option<String>,
    pub filter: Option<FilterMode>,
}

impl OptionsConfig {
    /// Overrides for `bind`. A fuzzy filter needs a matcher and is left to
    /// the caller.
    pub fn to_override(&self) -> OptionsOverride {
        let overrides = OptionsOverride {
            min_len: self.min_len,
            policy: self.policy,
            flyout: self.flyout,
            timeout_content: self.timeout_content.clone(),
            suggest_new: self.suggest_new.clone(),
            limit: self.limit,
            service_url: self.service_url.clone(),
            ..OptionsOverride::default()
        };
        match self.filter {
            Some(FilterMode::All) => overrides.filter(|_, _| true),
            Some(FilterMode::Substring) => overrides.filter(|item, text| substring(&item.label, text)),
            Some(FilterMode::Fuzzy) | None => overrides,
        }
    }
}

impl Config {
    pub fn source(&self) -> Result<&SourceConfig, SuggestError> {
        self.source
            .as_ref()
            .ok_or(SuggestError::MissingConfig("source"))
    }

    pub fn catalog_path(&self) -> Result<PathBuf, SuggestError> {
        let catalog = self
            .source()?
            .catalog
            .as_deref()
            .ok_or(SuggestError::MissingConfig("source.catalog"))?;
        resolve_path(catalog, self.base_dir.as_deref()).ok_or_else(|| {
            SuggestError::InvalidConfig(format!("cannot resolve catalog path {catalog}"))
        })
    }

    pub fn flavor(&self) -> FlavorName {
        self.source.as_ref().map(|s| s.flavor).unwrap_or_default()
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.source.as_ref().map_or(0, |s| s.latency_ms))
    }
}

pub fn load_config_from_str(s: &str) -> Result<Config> {
    let config: Config = toml::from_str(s)?;
    Ok(config)
}

/// Load the config file at `config_override`, or the default location.
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    let config_file = match config_override {
        Some(path) => path.to_path_buf(),
        None => default_config_file()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine the config directory"))?,
    };
    if !config_file.exists() {
        anyhow::bail!("Config file not found at {}", config_file.display());
    }
    let contents = fs::read_to_string(&config_file)?;
    let mut config = load_config_from_str(&contents)?;
    config.base_dir = config_file.parent().map(Path::to_path_buf);
    log::debug!("loaded config from {}", config_file.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn empty_config_is_valid_but_has_no_catalog() {
        let config = load_config_from_str("").unwrap();
        assert!(matches!(
            config.catalog_path(),
            Err(SuggestError::MissingConfig("source"))
        ));
        assert_eq!(config.flavor(), FlavorName::Suggest);
        assert_eq!(config.latency(), Duration::ZERO);
    }

    #[test]
    fn source_without_catalog_is_reported() {
        let config = load_config_from_str("[source]\nflavor = \"select\"").unwrap();
        assert!(matches!(
            config.catalog_path(),
            Err(SuggestError::MissingConfig("source.catalog"))
        ));
        assert_eq!(config.flavor(), FlavorName::Select);
    }

    #[test]
    fn full_config() {
        let config = load_config_from_str(
            r##"
[source]
catalog = "/srv/presidents.json"
flavor = "suggest"
latency_ms = 40

[options]
policy = "soft"
min_len = 2
limit = 5
suggest_new = "Create new"
timeout_content = "Search is slow"
service_url = "https://example.org"
filter = "substring"

[theme]
accent = "#ff00ff"
"##,
        )
        .unwrap();
        assert_eq!(
            config.catalog_path().unwrap(),
            PathBuf::from("/srv/presidents.json")
        );
        assert_eq!(config.latency(), Duration::from_millis(40));
        assert_eq!(config.theme.accent, ThemeColor::Rgb(255, 0, 255));
        assert_eq!(config.theme.muted, ThemeColor::Named(NamedColor::Gray));

        let overrides = config.options.to_override();
        assert_eq!(overrides.policy, Some(SelectionPolicy::Soft));
        assert_eq!(overrides.min_len, Some(2));
        assert_eq!(overrides.limit, Some(5));
        assert_eq!(overrides.suggest_new.as_deref(), Some("Create new"));
        let filter = overrides.filter.unwrap();
        assert!(filter(&Candidate::from_value(json!({"name": "Abraham Lincoln"})), "LINC"));
        assert!(!filter(&Candidate::from_value(json!({"name": "Grant"})), "linc"));
    }

    #[test]
    fn fuzzy_filter_is_left_to_caller() {
        let config = load_config_from_str("[options]\nfilter = \"fuzzy\"").unwrap();
        assert_eq!(config.options.filter, Some(FilterMode::Fuzzy));
        assert!(config.options.to_override().filter.is_none());
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(load_config_from_str("bogus = 1").is_err());
        assert!(load_config_from_str("[options]\nsoft = true").is_err());
        assert!(load_config_from_str("[source]\nurl = \"x\"").is_err());
    }

    #[test]
    fn invalid_color_rejected() {
        let err = load_config_from_str("[theme]\naccent = \"notacolor\"")
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid color"), "Error was: {err}");
    }

    #[test]
    fn relative_catalog_resolves_next_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[source]\ncatalog = \"catalog.json\"").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.catalog_path().unwrap(), dir.path().join("catalog.json"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}

//! Application configuration for the Brain Guide pipeline.
//!
//! User config lives at `~/.brainguide/brainguide.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BrainGuideError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "brainguide.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".brainguide";

// ---------------------------------------------------------------------------
// Config structs (matching brainguide.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Content locations.
    #[serde(default)]
    pub content: ContentConfig,

    /// Per-language UI strings inserted into generated documents.
    #[serde(default)]
    pub translations: TranslationsConfig,

    /// Per-language public site roots, keyed by language code.
    #[serde(default)]
    pub base_urls: BTreeMap<String, String>,

    /// Pandoc render settings.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Language assumed for sections that carry no `language` field.
    #[serde(default = "default_language")]
    pub language: String,

    /// Concatenator output folder name, resolved under `content.source_dir`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_language() -> String {
    "en".into()
}
fn default_output_dir() -> String {
    "combined".into()
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Root folder of authored section files.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Root folder of index entries (link targets).
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            index_dir: default_index_dir(),
        }
    }
}

fn default_source_dir() -> String {
    "content".into()
}
fn default_index_dir() -> String {
    "index".into()
}

/// `[translations]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationsConfig {
    /// References heading text, keyed by language code.
    #[serde(default = "default_references")]
    pub references: BTreeMap<String, String>,
}

impl Default for TranslationsConfig {
    fn default() -> Self {
        Self {
            references: default_references(),
        }
    }
}

fn default_references() -> BTreeMap<String, String> {
    BTreeMap::from([("en".to_string(), "References".to_string())])
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// BibTeX bibliography passed to pandoc's citeproc.
    #[serde(default = "default_bibliography")]
    pub bibliography: String,

    /// CSL citation style. Empty string disables `--csl`.
    #[serde(default = "default_csl")]
    pub csl: String,

    /// Pandoc target format: "html" or "md".
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Whether to apply the caption-removal Lua filter.
    #[serde(default = "default_true")]
    pub remove_captions: bool,

    /// Directory where Lua filters are materialized.
    #[serde(default = "default_filters_dir")]
    pub filters_dir: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bibliography: default_bibliography(),
            csl: default_csl(),
            output_format: default_output_format(),
            remove_captions: default_true(),
            filters_dir: default_filters_dir(),
        }
    }
}

fn default_bibliography() -> String {
    "brain-guides.bib".into()
}
fn default_csl() -> String {
    "ieee.csl".into()
}
fn default_output_format() -> String {
    "html".into()
}
fn default_true() -> bool {
    true
}
fn default_filters_dir() -> String {
    "filters".into()
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

impl AppConfig {
    /// References heading text for a language.
    ///
    /// Absence is an explicit configuration error, not a fallback: a guide in
    /// a language without a translated heading must not silently ship an
    /// English one.
    pub fn references_heading(&self, language: &str) -> Result<&str> {
        self.translations
            .references
            .get(language)
            .map(String::as_str)
            .ok_or_else(|| BrainGuideError::MissingTranslation {
                language: language.to_string(),
            })
    }

    /// Public site root for a language.
    pub fn base_url(&self, language: &str) -> Result<&str> {
        self.base_urls
            .get(language)
            .map(String::as_str)
            .ok_or_else(|| BrainGuideError::MissingBaseUrl {
                language: language.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.brainguide/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BrainGuideError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.brainguide/brainguide.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BrainGuideError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        BrainGuideError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BrainGuideError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BrainGuideError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BrainGuideError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that the configured section source folder exists.
pub fn validate_source_dir(config: &AppConfig) -> Result<()> {
    let source = Path::new(&config.content.source_dir);
    if !source.is_dir() {
        return Err(BrainGuideError::config(format!(
            "content source folder does not exist: {}",
            source.display()
        )));
    }
    Ok(())
}

/// Check that the configured index folder exists.
pub fn validate_index_dir(config: &AppConfig) -> Result<()> {
    let index = Path::new(&config.content.index_dir);
    if !index.is_dir() {
        return Err(BrainGuideError::config(format!(
            "index folder does not exist: {}",
            index.display()
        )));
    }
    Ok(())
}

/// Check that every configured base URL parses as an absolute URL.
pub fn validate_base_urls(config: &AppConfig) -> Result<()> {
    for (language, base) in &config.base_urls {
        Url::parse(base).map_err(|e| {
            BrainGuideError::config(format!("base URL for `{language}` is invalid: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("source_dir"));
        assert!(toml_str.contains("remove_captions"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.language, "en");
        assert_eq!(parsed.defaults.output_dir, "combined");
        assert_eq!(parsed.render.output_format, "html");
    }

    #[test]
    fn config_with_translations_and_base_urls() {
        let toml_str = r#"
[defaults]
language = "en"

[translations.references]
en = "References"
es = "Referencias"

[base_urls]
en = "https://site.com"
es = "https://es.site.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.references_heading("es").unwrap(), "Referencias");
        assert_eq!(config.base_url("en").unwrap(), "https://site.com");
    }

    #[test]
    fn missing_translation_is_explicit_error() {
        let config = AppConfig::default();
        let err = config.references_heading("fr").unwrap_err();
        assert!(matches!(
            err,
            BrainGuideError::MissingTranslation { ref language } if language == "fr"
        ));
    }

    #[test]
    fn missing_base_url_is_explicit_error() {
        let config = AppConfig::default();
        let err = config.base_url("en").unwrap_err();
        assert!(matches!(
            err,
            BrainGuideError::MissingBaseUrl { ref language } if language == "en"
        ));
    }

    #[test]
    fn base_url_validation_rejects_garbage() {
        let mut config = AppConfig::default();
        config
            .base_urls
            .insert("en".into(), "not a url".into());
        let result = validate_base_urls(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("`en`"));
    }

    #[test]
    fn base_url_validation_accepts_absolute_urls() {
        let mut config = AppConfig::default();
        config
            .base_urls
            .insert("en".into(), "https://site.com".into());
        config
            .base_urls
            .insert("de".into(), "https://de.site.com/guides".into());
        assert!(validate_base_urls(&config).is_ok());
    }
}

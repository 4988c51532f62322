//! Application configuration for bookmuse.
//!
//! User config lives at `~/.bookmuse/bookmuse.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are referenced by environment-variable *name* and are never
//! stored in the file; [`Credentials::resolve`] reads them at run start.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BookmuseError, Result};
use crate::types::SourceId;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bookmuse.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bookmuse";

// ---------------------------------------------------------------------------
// Config structs (matching bookmuse.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Keyword derivation strategy.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Text-generation service settings.
    #[serde(default)]
    pub textgen: TextgenConfig,

    /// Catalog source settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Content filter settings.
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Category fallback keywords: genre display label to broader search term.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            strategy: StrategyConfig::default(),
            textgen: TextgenConfig::default(),
            sources: SourcesConfig::default(),
            filters: FiltersConfig::default(),
            fallbacks: default_fallbacks(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Result-count bound per keyword per source.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Language restriction passed to catalog sources.
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-call timeout for every external request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many surviving items receive a generated justification.
    #[serde(default = "default_justify_top_n")]
    pub justify_top_n: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            justify_top_n: default_justify_top_n(),
        }
    }
}

fn default_max_results() -> u32 {
    10
}
fn default_language() -> String {
    "ko".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_justify_top_n() -> usize {
    3
}

/// Keyword derivation strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyMode {
    /// Concatenate profile fields; no external call, always succeeds.
    #[default]
    Deterministic,
    /// Ask the text-generation service; parse failure fails the run.
    Generative,
}

/// `[strategy]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub mode: StrategyMode,
}

/// `[textgen]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextgenConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_textgen_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint URL.
    #[serde(default = "default_textgen_endpoint")]
    pub endpoint: String,

    /// Model identifier.
    #[serde(default = "default_textgen_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for TextgenConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_textgen_key_env(),
            endpoint: default_textgen_endpoint(),
            model: default_textgen_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_textgen_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_textgen_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_textgen_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.7
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Enabled catalog sources, in priority order.
    #[serde(default = "default_enabled_sources")]
    pub enabled: Vec<SourceId>,

    /// Google Books volumes endpoint (keyless for search).
    #[serde(default = "default_google_books_endpoint")]
    pub google_books_endpoint: String,

    /// Kakao book search endpoint.
    #[serde(default = "default_kakao_endpoint")]
    pub kakao_endpoint: String,

    /// Env var holding the Kakao REST API key.
    #[serde(default = "default_kakao_key_env")]
    pub kakao_api_key_env: String,

    /// Library catalog search endpoint.
    #[serde(default = "default_library_endpoint")]
    pub library_endpoint: String,

    /// Env var holding the library catalog auth key.
    #[serde(default = "default_library_key_env")]
    pub library_api_key_env: String,

    /// Fill missing descriptions with a best-effort secondary lookup.
    #[serde(default = "default_true")]
    pub enrich_descriptions: bool,

    /// Bounded retries for transport errors (not status errors).
    #[serde(default = "default_retry_transport")]
    pub retry_transport: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_sources(),
            google_books_endpoint: default_google_books_endpoint(),
            kakao_endpoint: default_kakao_endpoint(),
            kakao_api_key_env: default_kakao_key_env(),
            library_endpoint: default_library_endpoint(),
            library_api_key_env: default_library_key_env(),
            enrich_descriptions: default_true(),
            retry_transport: default_retry_transport(),
        }
    }
}

fn default_enabled_sources() -> Vec<SourceId> {
    vec![SourceId::Kakao, SourceId::GoogleBooks]
}
fn default_google_books_endpoint() -> String {
    "https://www.googleapis.com/books/v1/volumes".into()
}
fn default_kakao_endpoint() -> String {
    "https://dapi.kakao.com/v3/search/book".into()
}
fn default_kakao_key_env() -> String {
    "KAKAO_REST_API_KEY".into()
}
fn default_library_endpoint() -> String {
    "https://data4library.kr/api/srchBooks".into()
}
fn default_library_key_env() -> String {
    "LIBRARY_AUTH_KEY".into()
}
fn default_true() -> bool {
    true
}
fn default_retry_transport() -> u32 {
    1
}

/// `[filters]` section.
///
/// Denylists are title-substring heuristics (first-line defense), kept as
/// configuration data so they can be tested and extended without code
/// changes. Matching is case-sensitive in the source's own script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Exam/test-prep terms.
    #[serde(default = "default_exam_terms")]
    pub exam_terms: Vec<String>,

    /// Age-restricted terms.
    #[serde(default = "default_age_restricted_terms")]
    pub age_restricted_terms: Vec<String>,

    /// Mature-content terms.
    #[serde(default = "default_mature_terms")]
    pub mature_terms: Vec<String>,

    /// Gate for the audience-level filter.
    #[serde(default)]
    pub age_filter_enabled: bool,

    /// Optional inclusive publish-year range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRangeConfig>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            exam_terms: default_exam_terms(),
            age_restricted_terms: default_age_restricted_terms(),
            mature_terms: default_mature_terms(),
            age_filter_enabled: false,
            year_range: None,
        }
    }
}

fn default_exam_terms() -> Vec<String> {
    ["문제집", "기출문제집", "기출", "수능", "모의고사", "자격증", "토익", "토플"]
        .map(String::from)
        .to_vec()
}
fn default_age_restricted_terms() -> Vec<String> {
    ["19금", "성인용"].map(String::from).to_vec()
}
fn default_mature_terms() -> Vec<String> {
    ["잔혹", "엽기"].map(String::from).to_vec()
}

/// `[filters.year_range]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YearRangeConfig {
    pub min: i32,
    pub max: i32,
    /// Whether items with an unparseable/missing date pass the filter.
    /// Defaults to false: undated items are excluded (one policy for all
    /// sources, no per-source special case).
    #[serde(default)]
    pub include_undated: bool,
}

fn default_fallbacks() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("과학·기술".to_string(), "교양 과학 입문".to_string()),
        ("인문·철학".to_string(), "인문학 입문".to_string()),
        ("경제·자기계발".to_string(), "자기계발 베스트".to_string()),
    ])
}

impl FiltersConfig {
    /// All denylist terms across categories, in category order.
    pub fn denylist(&self) -> impl Iterator<Item = &str> {
        self.exam_terms
            .iter()
            .chain(&self.age_restricted_terms)
            .chain(&self.mature_terms)
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API keys resolved from the environment at run start.
///
/// The pipeline never reads the process environment itself; the caller
/// resolves credentials once and passes them in, keeping the pipeline pure
/// and testable.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub textgen_key: Option<String>,
    pub kakao_key: Option<String>,
    pub library_key: Option<String>,
}

impl Credentials {
    /// Read the env vars named in `config`. Missing vars become `None`;
    /// whether that is an error depends on which features the run uses.
    pub fn resolve(config: &AppConfig) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            textgen_key: read(&config.textgen.api_key_env),
            kakao_key: read(&config.sources.kakao_api_key_env),
            library_key: read(&config.sources.library_api_key_env),
        }
    }

    /// The text-generation key, or a config error naming the missing env var.
    pub fn require_textgen(&self, config: &AppConfig) -> Result<&str> {
        self.textgen_key.as_deref().ok_or_else(|| {
            BookmuseError::config(format!(
                "text-generation API key not found. Set the {} environment variable.",
                config.textgen.api_key_env
            ))
        })
    }

    /// The key for `source`, or a config error if that source needs one.
    /// Google Books search is keyless.
    pub fn require_source(&self, config: &AppConfig, source: SourceId) -> Result<Option<&str>> {
        match source {
            SourceId::GoogleBooks => Ok(None),
            SourceId::Kakao => self
                .kakao_key
                .as_deref()
                .map(Some)
                .ok_or_else(|| missing_key_error("Kakao", &config.sources.kakao_api_key_env)),
            SourceId::Library => self
                .library_key
                .as_deref()
                .map(Some)
                .ok_or_else(|| missing_key_error("library catalog", &config.sources.library_api_key_env)),
        }
    }
}

fn missing_key_error(service: &str, var_name: &str) -> BookmuseError {
    BookmuseError::config(format!(
        "{service} API key not found. Set the {var_name} environment variable."
    ))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bookmuse/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BookmuseError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bookmuse/bookmuse.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BookmuseError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BookmuseError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BookmuseError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BookmuseError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BookmuseError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_results"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("KAKAO_REST_API_KEY"));
        assert!(toml_str.contains("과학·기술"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_results, 10);
        assert_eq!(parsed.defaults.language, "ko");
        assert_eq!(parsed.strategy.mode, StrategyMode::Deterministic);
        assert_eq!(
            parsed.sources.enabled,
            vec![SourceId::Kakao, SourceId::GoogleBooks]
        );
    }

    #[test]
    fn strategy_mode_parses_kebab_case() {
        let config: AppConfig = toml::from_str("[strategy]\nmode = \"generative\"\n").expect("parse");
        assert_eq!(config.strategy.mode, StrategyMode::Generative);
    }

    #[test]
    fn year_range_defaults_to_excluding_undated() {
        let toml_str = r#"
[filters.year_range]
min = 2015
max = 2025
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        let range = config.filters.year_range.expect("year range");
        assert_eq!(range.min, 2015);
        assert!(!range.include_undated);
    }

    #[test]
    fn denylist_spans_all_categories() {
        let filters = FiltersConfig::default();
        let terms: Vec<&str> = filters.denylist().collect();
        assert!(terms.contains(&"기출문제집"));
        assert!(terms.contains(&"19금"));
        assert!(terms.contains(&"잔혹"));
    }

    #[test]
    fn default_fallback_map_covers_science() {
        let config = AppConfig::default();
        assert_eq!(
            config.fallbacks.get("과학·기술").map(String::as_str),
            Some("교양 과학 입문")
        );
    }

    #[test]
    fn missing_textgen_key_is_config_error() {
        let config = AppConfig::default();
        let creds = Credentials::default();
        let err = creds.require_textgen(&config).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn google_books_needs_no_key() {
        let config = AppConfig::default();
        let creds = Credentials::default();
        assert!(
            creds
                .require_source(&config, SourceId::GoogleBooks)
                .expect("keyless")
                .is_none()
        );
        assert!(creds.require_source(&config, SourceId::Kakao).is_err());
    }
}

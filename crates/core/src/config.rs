//! Configuration management for ragchat.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A YAML config file (`RAGCHAT_CONFIG`, or `./ragchat.yaml` when present)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is built once at process start and shared read-only.
//! Missing service credentials are not a startup failure: they surface as a
//! `ConfigError` on the request that needs them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default relevance threshold. Scores are compared as-is against the search
/// service's own scale.
pub const DEFAULT_MIN_SCORE: f64 = 1.0;

/// Upper bound on sampling temperature for grounded answers.
pub const MAX_TEMPERATURE: f32 = 0.3;

const DEFAULT_CONFIG_FILE: &str = "ragchat.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Search service settings
    pub search: SearchConfig,

    /// Generation service settings
    pub generation: GenerationConfig,

    /// Retrieval gating settings
    pub retrieval: RetrievalConfig,

    /// HTTP bind address for `ragchat serve`
    pub bind: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
}

/// Search service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub index_name: Option<String>,
    pub api_version: String,
    /// Document field holding the body text
    pub content_field: String,
    /// Document field holding the display name
    pub name_field: String,
    pub timeout_secs: u64,
}

/// Generation service connection and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider identifier (currently "azure-openai")
    pub provider: String,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

/// Knobs of the retrieval-gating pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum relevance score a candidate needs to ground an answer
    pub min_score: f64,
    /// Number of candidates requested from the search service
    pub top_k: u32,
    /// Allow-listed topic substrings; empty disables the topic gate
    pub topic_keywords: Vec<String>,
    /// Maximum characters of a document body placed in the context
    pub max_excerpt_chars: usize,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    search: Option<SearchFileSection>,
    generation: Option<GenerationFileSection>,
    retrieval: Option<RetrievalFileSection>,
    server: Option<ServerFileSection>,
    logging: Option<LoggingFileSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFileSection {
    endpoint: Option<String>,
    api_key_env: Option<String>,
    index_name: Option<String>,
    api_version: Option<String>,
    content_field: Option<String>,
    name_field: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationFileSection {
    provider: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    deployment: Option<String>,
    api_version: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalFileSection {
    min_score: Option<f64>,
    top_k: Option<u32>,
    topic_keywords: Option<Vec<String>>,
    max_excerpt_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerFileSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingFileSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            index_name: None,
            api_version: "2023-07-01-preview".to_string(),
            content_field: "content".to_string(),
            name_field: "metadata_storage_name".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "azure-openai".to_string(),
            endpoint: None,
            api_key: None,
            deployment: None,
            api_version: "2024-02-15-preview".to_string(),
            temperature: MAX_TEMPERATURE,
            max_tokens: 800,
            timeout_secs: 120,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            top_k: 5,
            topic_keywords: Vec::new(),
            max_excerpt_chars: 2000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            bind: "127.0.0.1:7071".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `RAGCHAT_CONFIG`: Path to a YAML config file
    /// - `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`, `AZURE_SEARCH_INDEX_NAME`,
    ///   `AZURE_SEARCH_API_VERSION`: Search service
    /// - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_DEPLOYMENT`,
    ///   `AZURE_OPENAI_API_VERSION`: Generation service
    /// - `RAGCHAT_MIN_SCORE`: Relevance threshold (default 1.0)
    /// - `RAGCHAT_TOP_K`: Candidates requested per search (default 5)
    /// - `RAGCHAT_TOPIC_KEYWORDS`: Comma-separated topic allow-list
    /// - `RAGCHAT_CONTENT_FIELD`, `RAGCHAT_NAME_FIELD`: Document field names
    /// - `RAGCHAT_MAX_EXCERPT_CHARS`: Excerpt cap per document
    /// - `RAGCHAT_SEARCH_TIMEOUT_SECS`, `RAGCHAT_GENERATION_TIMEOUT_SECS`: Timeouts
    /// - `RAGCHAT_BIND`: HTTP bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    /// - `RAGCHAT_LOG_FORMAT`: `json` for JSON-lines logs
    ///
    /// # Example
    /// ```no_run
    /// use ragchat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Threshold: {}", config.retrieval.min_score);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment.
    pub fn load_from<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        let config_path = match lookup("RAGCHAT_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path, &lookup)?;
        }

        // Environment variables override YAML config
        let search = &mut config.search;
        override_string(&mut search.endpoint, lookup("AZURE_SEARCH_ENDPOINT"));
        override_string(&mut search.api_key, lookup("AZURE_SEARCH_KEY"));
        override_string(&mut search.index_name, lookup("AZURE_SEARCH_INDEX_NAME"));
        if let Some(version) = lookup("AZURE_SEARCH_API_VERSION") {
            search.api_version = version;
        }
        if let Some(field) = lookup("RAGCHAT_CONTENT_FIELD") {
            search.content_field = field;
        }
        if let Some(field) = lookup("RAGCHAT_NAME_FIELD") {
            search.name_field = field;
        }
        if let Some(secs) = parse_var(&lookup, "RAGCHAT_SEARCH_TIMEOUT_SECS")? {
            search.timeout_secs = secs;
        }

        let generation = &mut config.generation;
        override_string(&mut generation.endpoint, lookup("AZURE_OPENAI_ENDPOINT"));
        override_string(&mut generation.api_key, lookup("AZURE_OPENAI_API_KEY"));
        override_string(&mut generation.deployment, lookup("AZURE_OPENAI_DEPLOYMENT"));
        if let Some(version) = lookup("AZURE_OPENAI_API_VERSION") {
            generation.api_version = version;
        }
        if let Some(secs) = parse_var(&lookup, "RAGCHAT_GENERATION_TIMEOUT_SECS")? {
            generation.timeout_secs = secs;
        }

        let retrieval = &mut config.retrieval;
        if let Some(min_score) = parse_var(&lookup, "RAGCHAT_MIN_SCORE")? {
            retrieval.min_score = min_score;
        }
        if let Some(top_k) = parse_var(&lookup, "RAGCHAT_TOP_K")? {
            retrieval.top_k = top_k;
        }
        if let Some(keywords) = lookup("RAGCHAT_TOPIC_KEYWORDS") {
            retrieval.topic_keywords = split_keywords(&keywords);
        }
        if let Some(chars) = parse_var(&lookup, "RAGCHAT_MAX_EXCERPT_CHARS")? {
            retrieval.max_excerpt_chars = chars;
        }

        if let Some(bind) = lookup("RAGCHAT_BIND") {
            config.bind = bind;
        }

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = Some(level);
        }

        // Check for NO_COLOR environment variable
        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        if let Some(format) = lookup("RAGCHAT_LOG_FORMAT") {
            config.json_logs = format.eq_ignore_ascii_case("json");
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml<F>(&self, path: &Path, lookup: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(search) = config_file.search {
            override_string(&mut result.search.endpoint, search.endpoint);
            override_string(&mut result.search.index_name, search.index_name);
            override_string(
                &mut result.search.api_key,
                search.api_key_env.and_then(|var| lookup(&var)),
            );
            if let Some(version) = search.api_version {
                result.search.api_version = version;
            }
            if let Some(field) = search.content_field {
                result.search.content_field = field;
            }
            if let Some(field) = search.name_field {
                result.search.name_field = field;
            }
            if let Some(secs) = search.timeout_secs {
                result.search.timeout_secs = secs;
            }
        }

        if let Some(generation) = config_file.generation {
            if let Some(provider) = generation.provider {
                result.generation.provider = provider;
            }
            override_string(&mut result.generation.endpoint, generation.endpoint);
            override_string(&mut result.generation.deployment, generation.deployment);
            override_string(
                &mut result.generation.api_key,
                generation.api_key_env.and_then(|var| lookup(&var)),
            );
            if let Some(version) = generation.api_version {
                result.generation.api_version = version;
            }
            if let Some(temperature) = generation.temperature {
                result.generation.temperature = temperature;
            }
            if let Some(max_tokens) = generation.max_tokens {
                result.generation.max_tokens = max_tokens;
            }
            if let Some(secs) = generation.timeout_secs {
                result.generation.timeout_secs = secs;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(min_score) = retrieval.min_score {
                result.retrieval.min_score = min_score;
            }
            if let Some(top_k) = retrieval.top_k {
                result.retrieval.top_k = top_k;
            }
            if let Some(keywords) = retrieval.topic_keywords {
                result.retrieval.topic_keywords = keywords
                    .into_iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
            }
            if let Some(chars) = retrieval.max_excerpt_chars {
                result.retrieval.max_excerpt_chars = chars;
            }
        }

        if let Some(bind) = config_file.server.and_then(|s| s.bind) {
            result.bind = bind;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.json_logs = format.eq_ignore_ascii_case("json");
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        min_score: Option<f64>,
        top_k: Option<u32>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> AppResult<Self> {
        if let Some(min_score) = min_score {
            self.retrieval.min_score = min_score;
        }

        if let Some(top_k) = top_k {
            self.retrieval.top_k = top_k;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate value ranges. Does not require service credentials.
    pub fn validate(&self) -> AppResult<()> {
        if !self.retrieval.min_score.is_finite() {
            return Err(AppError::Config(format!(
                "Minimum score must be a finite number, got {}",
                self.retrieval.min_score
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.retrieval.max_excerpt_chars == 0 {
            return Err(AppError::Config(
                "max_excerpt_chars must be at least 1".to_string(),
            ));
        }

        let temperature = self.generation.temperature;
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and {}, got {}",
                MAX_TEMPERATURE, temperature
            )));
        }

        if self.generation.max_tokens == 0 {
            return Err(AppError::Config("max_tokens must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Names of the environment variables whose values are still missing.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let checks = [
            (&self.search.endpoint, "AZURE_SEARCH_ENDPOINT"),
            (&self.search.api_key, "AZURE_SEARCH_KEY"),
            (&self.search.index_name, "AZURE_SEARCH_INDEX_NAME"),
            (&self.generation.endpoint, "AZURE_OPENAI_ENDPOINT"),
            (&self.generation.api_key, "AZURE_OPENAI_API_KEY"),
            (&self.generation.deployment, "AZURE_OPENAI_DEPLOYMENT"),
        ];

        checks
            .into_iter()
            .filter(|(value, _)| value.is_none())
            .map(|(_, name)| name)
            .collect()
    }
}

/// Resolve a required setting, failing with a `ConfigError` naming `name`.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{} is not set", name)))
}

fn override_string(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = Some(value);
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {:?} ({})", key, raw, e))),
        None => Ok(None),
    }
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

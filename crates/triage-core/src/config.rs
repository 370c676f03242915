//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_FALLBACK__MODE=reject`).
//! Relative paths in the embedding section are resolved against the
//! directory the configuration was loaded from.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "shipping",
    "invoice",
    "cancellation",
    "subscription",
    "order_status",
    "payment_issue",
    "general_query",
    "refund",
    "technical_support",
    "feedback",
];

pub const DEFAULT_PROMPT: &str = "User query regarding {category}: '{text}'. friendly response.";

pub struct Config {
    figment: Figment,
    base: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, base: dir.to_path_buf() })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.embedding.tokenizer = settings
            .embedding
            .tokenizer
            .map(|p| resolve_with_base(&self.base, p.to_string_lossy()));
        settings.embedding.model_dir = settings
            .embedding
            .model_dir
            .map(|p| resolve_with_base(&self.base, p.to_string_lossy()));
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub router: RouterSettings,
    pub fallback: FallbackSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub personalization: PersonalizationSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.router.categories.is_empty() {
            return Err(Error::InvalidConfig("router.categories is empty".into()));
        }
        let mut seen = HashSet::new();
        for c in &self.router.categories {
            if !seen.insert(c.as_str()) {
                return Err(Error::DuplicateCategory(c.clone()));
            }
        }
        if !self.fallback.threshold.is_finite() || self.fallback.threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fallback.threshold must be a non-negative number, got {}",
                self.fallback.threshold
            )));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub categories: Vec<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self { categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect() }
    }
}

/// What to do with a vector match whose distance exceeds the threshold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Log the low-confidence match and use it anyway.
    #[default]
    Advisory,
    /// Discard the match and answer without a category.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    pub threshold: f32,
    pub mode: ThresholdMode,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self { threshold: 1e6, mode: ThresholdMode::Advisory }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    #[default]
    Hash,
    TokenMean,
    XlmRoberta,
}

/// Where model-backed embedders run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreference {
    /// Metal when built with the `metal` feature and a GPU is present, else CPU.
    #[default]
    Auto,
    Cpu,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub dim: usize,
    pub tokenizer: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
    pub max_len: usize,
    pub device: DevicePreference,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            dim: 768,
            tokenizer: None,
            model_dir: None,
            max_len: 256,
            device: DevicePreference::Auto,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub prompt: String,
    pub responses: HashMap<String, String>,
    pub free_response: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            responses: HashMap::new(),
            free_response: "Thanks {user}, a support agent will look into: {text}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizationSettings {
    pub placeholder: String,
    pub context_key: String,
    pub default_name: String,
}

impl Default for PersonalizationSettings {
    fn default() -> Self {
        Self {
            placeholder: "{user}".to_string(),
            context_key: "user_name".to_string(),
            default_name: "there".to_string(),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

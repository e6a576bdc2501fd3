use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub content_store: ContentStoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub quiz: QuizSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which resort source backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStoreKind {
    Supabase,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentStoreSettings {
    pub kind: ContentStoreKind,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    #[serde(default = "default_resorts_table")]
    pub resorts_table: String,
    pub request_timeout_secs: Option<u64>,
    pub catalog_path: Option<String>,
}

fn default_resorts_table() -> String { "resorts".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Shared store for rate-limit counters; in-memory when unset
    pub redis_url: Option<String>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Peers whose Forwarded / X-Forwarded-For headers name the client
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trusted_proxies: Vec::new(),
        }
    }
}

fn default_max_requests() -> u64 { 30 }
fn default_window_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSettings {
    #[serde(default = "default_max_priorities")]
    pub max_priorities: usize,
    #[serde(default = "default_top_matches")]
    pub top_matches: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            max_priorities: default_max_priorities(),
            top_matches: default_top_matches(),
        }
    }
}

fn default_max_priorities() -> usize { 3 }
fn default_top_matches() -> usize { 3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_age_weight")]
    pub age: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_skill_weight")]
    pub skill: f64,
    #[serde(default = "default_family_weight")]
    pub family: f64,
    #[serde(default = "default_priority_bonus")]
    pub priority_bonus: f64,
    #[serde(default = "default_adjacent_budget_credit")]
    pub adjacent_budget_credit: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            age: default_age_weight(),
            budget: default_budget_weight(),
            skill: default_skill_weight(),
            family: default_family_weight(),
            priority_bonus: default_priority_bonus(),
            adjacent_budget_credit: default_adjacent_budget_credit(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            age: config.age,
            budget: config.budget,
            skill: config.skill,
            family: config.family,
            priority_bonus: config.priority_bonus,
            adjacent_budget_credit: config.adjacent_budget_credit,
        }
    }
}

impl WeightsConfig {
    /// Weights must be finite and non-negative; the adjacent credit is a share of 1
    fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("age", self.age),
            ("budget", self.budget),
            ("skill", self.skill),
            ("family", self.family),
            ("priority_bonus", self.priority_bonus),
            ("adjacent_budget_credit", self.adjacent_budget_credit),
        ];

        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "scoring.weights.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.adjacent_budget_credit > 1.0 {
            return Err(ConfigError::Message(format!(
                "scoring.weights.adjacent_budget_credit must be at most 1, got {}",
                self.adjacent_budget_credit
            )));
        }

        Ok(())
    }
}

fn default_age_weight() -> f64 { 0.30 }
fn default_budget_weight() -> f64 { 0.20 }
fn default_skill_weight() -> f64 { 0.20 }
fn default_family_weight() -> f64 { 0.15 }
fn default_priority_bonus() -> f64 { 0.05 }
fn default_adjacent_budget_credit() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with SNOWMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., SNOWMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SNOWMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        Self::checked(settings.try_deserialize()?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SNOWMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(settings.try_deserialize()?)
    }

    fn checked(settings: Self) -> Result<Self, ConfigError> {
        settings.scoring.weights.validate()?;
        Ok(settings)
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

/// Apply the conventional Supabase variables when set
///
/// `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` are what the rest of the
/// site already exports, so they override the file values.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let supabase_url = env::var("SUPABASE_URL").ok();
    let supabase_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
        .or_else(|_| env::var("SUPABASE_ANON_KEY"))
        .ok();
    let redis_url = env::var("REDIS_URL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = supabase_url {
        builder = builder.set_override("content_store.supabase_url", url)?;
    }
    if let Some(key) = supabase_key {
        builder = builder.set_override("content_store.supabase_key", key)?;
    }
    if let Some(url) = redis_url {
        builder = builder.set_override("cache.redis_url", url)?;
    }

    builder.build()
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;
use crate::models::domain::{
    MatchingConfiguration, DEFAULT_AGE_RANGE, DEFAULT_TIME_WEIGHT, DEFAULT_URGENCY_WEIGHT,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub users: String,
    pub requests: String,
}

/// Default matching rules applied when a caller sends none
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_true")]
    pub blood_type_compatibility: bool,
    #[serde(default = "default_age_range")]
    pub age_range: u32,
    #[serde(default = "default_true")]
    pub geographic_preference: bool,
    #[serde(default = "default_urgency_weight")]
    pub urgency_weight: u8,
    #[serde(default = "default_time_weight")]
    pub time_weight: u8,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            blood_type_compatibility: default_true(),
            age_range: default_age_range(),
            geographic_preference: default_true(),
            urgency_weight: default_urgency_weight(),
            time_weight: default_time_weight(),
        }
    }
}

impl MatchingSettings {
    /// Convert to a validated [`MatchingConfiguration`]
    pub fn configuration(&self) -> Result<MatchingConfiguration, ConfigError> {
        let configuration = MatchingConfiguration {
            blood_type_compatibility: self.blood_type_compatibility,
            age_range: self.age_range,
            geographic_preference: self.geographic_preference,
            urgency_weight: self.urgency_weight,
            time_weight: self.time_weight,
        };

        configuration
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid [matching] settings: {}", e)))?;

        Ok(configuration)
    }
}

fn default_true() -> bool { true }
fn default_age_range() -> u32 { DEFAULT_AGE_RANGE }
fn default_urgency_weight() -> u8 { DEFAULT_URGENCY_WEIGHT }
fn default_time_weight() -> u8 { DEFAULT_TIME_WEIGHT }

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
    /// 1. Built-in server and collection defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ORGAN)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ORGAN__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("collection.users", "users")?
        .set_default("collection.requests", "requests")
}

fn environment() -> Environment {
    Environment::with_prefix("ORGAN")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional unprefixed variables used by deployment tooling
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("STORE_ENDPOINT", "store.endpoint"),
        ("STORE_API_KEY", "store.api_key"),
        ("STORE_PROJECT_ID", "store.project_id"),
        ("STORE_DATABASE_ID", "store.database_id"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

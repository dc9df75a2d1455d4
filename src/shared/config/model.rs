use serde::Deserialize;

use crate::engine::schema::FieldDescriptor;

pub const DEFAULT_BUCKET_COUNT: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub aggregator: AggregatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Fixed number of hash-table buckets; the table never rehashes.
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,
    /// Key and aggregate fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

fn default_bucket_count() -> usize {
    DEFAULT_BUCKET_COUNT
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("FLOW_AGGR_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

/// Loads settings from `path` (extension optional). A missing file is not an
/// error; every key has a built-in default.
pub fn load_settings_from(path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .set_default("aggregator.bucket_count", DEFAULT_BUCKET_COUNT as i64)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .add_source(config::File::with_name(path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}

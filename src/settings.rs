use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "wp_extractor";
const ENV_PREFIX: &str = "WPX";

pub const DEFAULT_DB_PATH: &str = "data/wp_extractor.sqlite";
pub const DEFAULT_VERSION_LABEL: &str = "unversioned";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings: optional `wp_extractor.toml`, then `WPX_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub version_label: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: DEFAULT_DB_PATH.to_string(),
            version_label: DEFAULT_VERSION_LABEL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("version_label", DEFAULT_VERSION_LABEL)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

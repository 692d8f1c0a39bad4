use std::fs::read_to_string;

use anyhow::Result;

use serde_derive::{Deserialize, Serialize};

use toml::from_str;

use crate::core::common::{BufferOptions, LoggingOptions, LookupOptions, PerformanceOptions};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub buffer_options: BufferOptions,
    pub lookup_options: LookupOptions,
    pub logging_options: LoggingOptions,
    pub performance_options: PerformanceOptions,
}

impl Config {
    pub fn load(filename: &str) -> Result<Config> {
        let config = read_to_string(filename)?;
        let config: Config = from_str(&config)?;
        Ok(config)
    }

    /// Print the default configuration as TOML.
    pub fn generate() -> Result<()> {
        let config = Config::default();
        let toml_config = toml::to_string(&config)?;
        println!("{toml_config}");
        Ok(())
    }
}

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use strata_runtime::RuntimeConfig;
use strata_stream::StreamConfig;
use strata_world::{TerrainConfig, WorldConfig};

/// Contents of `strata.toml`; every section may be omitted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

pub fn load_app_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    parse_app_config(&s)
}

fn parse_app_config(s: &str) -> Result<AppConfig, Box<dyn Error>> {
    let cfg: AppConfig = toml::from_str(s)?;
    cfg.world.validate()?;
    Ok(cfg)
}

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Terrain shaping parameters; every field has a default so partial TOML works.
#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_mode")]
    pub mode: TerrainMode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub base: Base,
    #[serde(default)]
    pub mountains: Mountains,
    #[serde(default)]
    pub rivers: Rivers,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Normal,
            flat: Flat::default(),
            base: Base::default(),
            mountains: Mountains::default(),
            rivers: Rivers::default(),
        }
    }
}

impl TerrainConfig {
    /// Flat world whose surface sits at `height`.
    pub fn flat(height: i32) -> Self {
        Self {
            mode: TerrainMode::Flat,
            flat: Flat { height },
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    Normal,
    Flat,
}

fn default_mode() -> TerrainMode {
    TerrainMode::Normal
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_height")]
    pub height: i32,
}
fn default_flat_height() -> i32 {
    10
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            height: default_flat_height(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Base {
    #[serde(default = "default_baseline")]
    pub baseline: f64,
    #[serde(default = "default_bias")]
    pub bias: f64,
    #[serde(default = "default_broad_freq")]
    pub broad_frequency: f64,
    #[serde(default = "default_broad_weight")]
    pub broad_weight: f64,
    #[serde(default = "default_fine_freq")]
    pub fine_frequency: f64,
    #[serde(default = "default_fine_offset")]
    pub fine_offset: f64,
    #[serde(default = "default_fine_weight")]
    pub fine_weight: f64,
}
fn default_baseline() -> f64 {
    20.0
}
fn default_bias() -> f64 {
    1.5
}
fn default_broad_freq() -> f64 {
    0.012
}
fn default_broad_weight() -> f64 {
    7.0
}
fn default_fine_freq() -> f64 {
    0.045
}
fn default_fine_offset() -> f64 {
    37.0
}
fn default_fine_weight() -> f64 {
    2.5
}
impl Default for Base {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            bias: default_bias(),
            broad_frequency: default_broad_freq(),
            broad_weight: default_broad_weight(),
            fine_frequency: default_fine_freq(),
            fine_offset: default_fine_offset(),
            fine_weight: default_fine_weight(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Mountains {
    #[serde(default = "default_mountain_freq")]
    pub frequency: f64,
    #[serde(default = "default_mountain_offset")]
    pub offset: f64,
    #[serde(default = "default_mountain_threshold")]
    pub threshold: f64,
    #[serde(default = "default_mountain_exponent")]
    pub exponent: f64,
    #[serde(default = "default_mountain_height")]
    pub height: f64,
    #[serde(default = "default_detail_freq")]
    pub detail_frequency: f64,
    #[serde(default = "default_detail_weight")]
    pub detail_weight: f64,
}
fn default_mountain_freq() -> f64 {
    0.004
}
fn default_mountain_offset() -> f64 {
    711.0
}
fn default_mountain_threshold() -> f64 {
    0.52
}
fn default_mountain_exponent() -> f64 {
    2.6
}
fn default_mountain_height() -> f64 {
    30.0
}
fn default_detail_freq() -> f64 {
    0.06
}
fn default_detail_weight() -> f64 {
    4.0
}
impl Default for Mountains {
    fn default() -> Self {
        Self {
            frequency: default_mountain_freq(),
            offset: default_mountain_offset(),
            threshold: default_mountain_threshold(),
            exponent: default_mountain_exponent(),
            height: default_mountain_height(),
            detail_frequency: default_detail_freq(),
            detail_weight: default_detail_weight(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rivers {
    #[serde(default = "default_river_freq")]
    pub frequency: f64,
    #[serde(default = "default_river_offset")]
    pub offset: f64,
    #[serde(default = "default_river_band")]
    pub band: f64,
    #[serde(default = "default_river_exponent")]
    pub exponent: f64,
    #[serde(default = "default_river_depth")]
    pub depth: f64,
    #[serde(default = "default_jitter_freq")]
    pub jitter_frequency: f64,
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}
fn default_river_freq() -> f64 {
    0.0035
}
fn default_river_offset() -> f64 {
    -413.0
}
fn default_river_band() -> f64 {
    0.15
}
fn default_river_exponent() -> f64 {
    1.7
}
fn default_river_depth() -> f64 {
    7.0
}
fn default_jitter_freq() -> f64 {
    0.08
}
fn default_jitter() -> f64 {
    1.0
}
impl Default for Rivers {
    fn default() -> Self {
        Self {
            frequency: default_river_freq(),
            offset: default_river_offset(),
            band: default_river_band(),
            exponent: default_river_exponent(),
            depth: default_river_depth(),
            jitter_frequency: default_jitter_freq(),
            jitter: default_jitter(),
        }
    }
}

pub fn load_terrain_config(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [mountains]
            height = 12.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mode, TerrainMode::Normal);
        assert_eq!(cfg.mountains.height, 12.0);
        assert_eq!(cfg.mountains.threshold, 0.52);
        assert_eq!(cfg.rivers.band, 0.15);
        assert_eq!(cfg.base.baseline, 20.0);
    }

    #[test]
    fn flat_mode_parses() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            mode = "flat"
            [flat]
            height = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mode, TerrainMode::Flat);
        assert_eq!(cfg.flat.height, 3);
    }
}

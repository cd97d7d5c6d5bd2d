//! World sizing, seeded noise, terrain heights and block-existence sampling.
#![forbid(unsafe_code)]

mod chunk_coord;
pub mod height;
mod height_cache;
pub mod noise;
mod sampler;
mod world;
pub mod worldgen;

pub use chunk_coord::ChunkCoord;
pub use height::HeightModel;
pub use height_cache::{HeightCache, HeightCacheStats};
pub use noise::SimplexNoise;
pub use sampler::{EditLookup, NoEdits, TerrainSampler};
pub use world::{WorldConfig, WorldConfigError};
pub use worldgen::{TerrainConfig, TerrainMode, load_terrain_config};

use std::error::Error;
use std::fmt;

use serde::Deserialize;

use crate::ChunkCoord;

/// World dimensions and seed, shared by the coordinating thread and every worker.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct WorldConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_chunk_side")]
    pub chunk_side: i32,
    #[serde(default = "default_world_height")]
    pub world_height: i32,
}

fn default_seed() -> i32 {
    1337
}
fn default_chunk_side() -> i32 {
    16
}
fn default_world_height() -> i32 {
    64
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            chunk_side: default_chunk_side(),
            world_height: default_world_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldConfigError {
    ChunkSide(i32),
    WorldHeight(i32),
}

impl fmt::Display for WorldConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldConfigError::ChunkSide(v) => {
                write!(f, "world.chunk_side must be at least 1 (got {v})")
            }
            WorldConfigError::WorldHeight(v) => {
                write!(f, "world.world_height must be at least 1 (got {v})")
            }
        }
    }
}

impl Error for WorldConfigError {}

impl WorldConfig {
    /// Rejects sizes that would leave no chunk or no vertical range.
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        if self.chunk_side < 1 {
            return Err(WorldConfigError::ChunkSide(self.chunk_side));
        }
        if self.world_height < 1 {
            return Err(WorldConfigError::WorldHeight(self.world_height));
        }
        Ok(())
    }

    #[inline]
    pub fn chunk_of(&self, wx: i32, wz: i32) -> ChunkCoord {
        ChunkCoord::containing(wx, wz, self.chunk_side)
    }

    /// World-space `(x, z)` of the chunk's minimum corner.
    #[inline]
    pub fn chunk_origin(&self, coord: ChunkCoord) -> (i32, i32) {
        (coord.cx * self.chunk_side, coord.cz * self.chunk_side)
    }

    #[inline]
    pub fn in_vertical_bounds(&self, wy: i32) -> bool {
        wy >= 0 && wy < self.world_height
    }

    /// Chunk containing a world-space position given in blocks.
    #[inline]
    pub fn chunk_at_position(&self, x: f32, z: f32) -> ChunkCoord {
        self.chunk_of(x.floor() as i32, z.floor() as i32)
    }
}

use std::sync::Arc;

use strata_edit::{EditSnapshot, EditStore, EditStoreStats};
use strata_geom::{Aabb, Vec3};
use strata_world::{ChunkCoord, HeightCacheStats, TerrainConfig, TerrainSampler, WorldConfig};

use crate::error::EditError;

/// Live block state owned by the coordinating thread.
///
/// Reads answer collision and spawn queries; the only write is `set_block`,
/// reached through `ChunkManager` so every edit also schedules rebuilds.
pub struct WorldState {
    sampler: TerrainSampler,
    edits: EditStore,
}

impl WorldState {
    pub fn new(world: WorldConfig, params: Arc<TerrainConfig>, cache_chunks: usize) -> Self {
        Self {
            sampler: TerrainSampler::new(world, params, cache_chunks),
            edits: EditStore::new(world.chunk_side),
        }
    }

    #[inline]
    pub fn world(&self) -> &WorldConfig {
        self.sampler.world()
    }

    pub fn has_block(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.sampler.has_block(&self.edits, x, y, z)
    }

    pub fn is_natural_solid(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.sampler.is_natural_solid(&self.edits, x, y, z)
    }

    /// Procedural height, ignoring edits.
    pub fn height(&mut self, x: i32, z: i32) -> i32 {
        self.sampler.height(x, z)
    }

    /// Topmost occupied y + 1 including edits, or 0 for an empty column.
    pub fn ground_height(&mut self, x: i32, z: i32) -> i32 {
        self.sampler.ground_height(&self.edits, x, z)
    }

    /// Feet position centred on column `(x, z)`, standing on its ground.
    pub fn spawn_point(&mut self, x: i32, z: i32) -> Vec3 {
        let y = self.ground_height(x, z);
        Vec3::new(x as f32 + 0.5, y as f32, z as f32 + 0.5)
    }

    /// Placed blocks overlapping `aabb`, sorted.
    pub fn edited_blocks_in_aabb(&self, aabb: &Aabb) -> Vec<(i32, i32, i32)> {
        self.edits.grid().query_aabb(aabb)
    }

    /// True if any block cell, terrain or placed, overlaps `aabb`.
    pub fn aabb_hits_solid(&mut self, aabb: &Aabb) -> bool {
        if aabb.is_empty() {
            return false;
        }
        if self.edits.grid().any_in_aabb(aabb) {
            return true;
        }
        let (lo, hi) = aabb.cell_range();
        for y in lo.1..=hi.1 {
            for z in lo.2..=hi.2 {
                for x in lo.0..=hi.0 {
                    if self.has_block(x, y, z) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn edit_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        self.edits.get(x, y, z)
    }

    pub fn edit_stats(&self) -> EditStoreStats {
        self.edits.stats()
    }

    /// Drops cached heights for a chunk that left the streamed area.
    pub(crate) fn forget_chunk(&mut self, coord: ChunkCoord) {
        self.sampler.forget_chunk(coord);
    }

    pub fn height_cache_stats(&self) -> HeightCacheStats {
        self.sampler.cache_stats()
    }

    /// Edits a job for `coord` needs: the chunk and its face neighbours.
    pub fn snapshot_for_job(&self, coord: ChunkCoord) -> EditSnapshot {
        self.edits.snapshot_neighborhood(coord)
    }

    /// Records an edit and returns the chunks whose faces may have changed.
    pub(crate) fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        present: bool,
    ) -> Result<Vec<ChunkCoord>, EditError> {
        if !self.world().in_vertical_bounds(y) {
            return Err(EditError::OutOfBounds { y });
        }
        self.edits.set(x, y, z, present);
        Ok(self.edits.get_affected_chunks(x, z))
    }
}

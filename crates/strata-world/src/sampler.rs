use std::sync::Arc;

use crate::height::HeightModel;
use crate::height_cache::{HeightCache, HeightCacheStats};
use crate::worldgen::TerrainConfig;
use crate::WorldConfig;

/// Read access to recorded player edits: `Some(true)` placed, `Some(false)` removed.
pub trait EditLookup {
    fn edit_at(&self, x: i32, y: i32, z: i32) -> Option<bool>;

    #[inline]
    fn is_edited(&self, x: i32, y: i32, z: i32) -> bool {
        self.edit_at(x, y, z).is_some()
    }
}

/// An edit source with no edits; terrain is purely procedural.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEdits;

impl EditLookup for NoEdits {
    #[inline]
    fn edit_at(&self, _x: i32, _y: i32, _z: i32) -> Option<bool> {
        None
    }
}

/// Memoized height sampling plus the block-existence rules layered over it.
///
/// One sampler lives on the coordinating thread and one inside each meshing
/// worker. All of them are built from the same `WorldConfig` and terrain
/// parameters, so every context agrees on which blocks exist.
pub struct TerrainSampler {
    world: WorldConfig,
    model: HeightModel,
    cache: HeightCache,
}

impl TerrainSampler {
    pub fn new(world: WorldConfig, params: Arc<TerrainConfig>, cache_chunks: usize) -> Self {
        Self {
            model: HeightModel::new(&world, params),
            cache: HeightCache::new(world.chunk_side, cache_chunks),
            world,
        }
    }

    #[inline]
    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// Cached terrain height of column `(x, z)`.
    #[inline]
    pub fn height(&mut self, x: i32, z: i32) -> i32 {
        let model = &self.model;
        self.cache.get_or_compute(x, z, || model.compute_height(x, z))
    }

    pub fn has_block<E: EditLookup + ?Sized>(&mut self, edits: &E, x: i32, y: i32, z: i32) -> bool {
        if !self.world.in_vertical_bounds(y) {
            return false;
        }
        match edits.edit_at(x, y, z) {
            Some(present) => present,
            None => y <= self.height(x, z),
        }
    }

    /// Solid and untouched by any edit; two such neighbours never show a face.
    pub fn is_natural_solid<E: EditLookup + ?Sized>(
        &mut self,
        edits: &E,
        x: i32,
        y: i32,
        z: i32,
    ) -> bool {
        if !self.world.in_vertical_bounds(y) || edits.is_edited(x, y, z) {
            return false;
        }
        y <= self.height(x, z)
    }

    /// One above the topmost occupied cell of the column, or 0 if it is empty.
    pub fn ground_height<E: EditLookup + ?Sized>(&mut self, edits: &E, x: i32, z: i32) -> i32 {
        self.topmost(edits, x, z).map_or(0, |y| y + 1)
    }

    /// Topmost occupied cell of a column, scanning down from the world ceiling.
    pub fn topmost<E: EditLookup + ?Sized>(&mut self, edits: &E, x: i32, z: i32) -> Option<i32> {
        (0..self.world.world_height)
            .rev()
            .find(|&y| self.has_block(edits, x, y, z))
    }

    pub fn cache_stats(&self) -> HeightCacheStats {
        self.cache.stats()
    }

    /// Drops the cached heights of one chunk; they are recomputed on demand.
    pub fn forget_chunk(&mut self, coord: crate::ChunkCoord) {
        self.cache.forget(coord);
    }
}

impl<S: std::hash::BuildHasher> EditLookup for std::collections::HashMap<(i32, i32, i32), bool, S> {
    #[inline]
    fn edit_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        self.get(&(x, y, z)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn flat(height: i32) -> TerrainSampler {
        TerrainSampler::new(
            WorldConfig::default(),
            Arc::new(TerrainConfig::flat(height)),
            16,
        )
    }

    #[test]
    fn procedural_fill_below_height() {
        let mut s = flat(10);
        assert!(s.has_block(&NoEdits, 3, 10, 3));
        assert!(s.has_block(&NoEdits, 3, 0, 3));
        assert!(!s.has_block(&NoEdits, 3, 11, 3));
    }

    #[test]
    fn out_of_range_is_air() {
        let mut s = flat(10);
        let mut edits = HashMap::new();
        edits.insert((0, -1, 0), true);
        edits.insert((0, 64, 0), true);
        assert!(!s.has_block(&edits, 0, -1, 0));
        assert!(!s.has_block(&edits, 0, 64, 0));
        assert!(!s.is_natural_solid(&edits, 0, -1, 0));
    }

    #[test]
    fn edits_override_terrain() {
        let mut s = flat(10);
        let mut edits = HashMap::new();
        edits.insert((5, 10, 5), false);
        edits.insert((5, 11, 5), true);
        assert!(!s.has_block(&edits, 5, 10, 5));
        assert!(s.has_block(&edits, 5, 11, 5));
        // A placed block is solid but not natural.
        assert!(!s.is_natural_solid(&edits, 5, 11, 5));
        assert!(s.is_natural_solid(&edits, 5, 9, 5));
    }

    #[test]
    fn ground_height_tracks_edits() {
        let mut s = flat(10);
        let mut edits = HashMap::new();
        assert_eq!(s.ground_height(&edits, 1, 1), 11);
        edits.insert((1, 20, 1), true);
        assert_eq!(s.ground_height(&edits, 1, 1), 21);
        for y in 0..=20 {
            edits.insert((1, y, 1), false);
        }
        assert_eq!(s.ground_height(&edits, 1, 1), 0);
    }

    #[test]
    fn forgotten_chunk_recomputes_identically() {
        let mut s = TerrainSampler::new(WorldConfig::default(), Arc::new(TerrainConfig::default()), 16);
        let before: Vec<i32> = (0..16).map(|i| s.height(i, 15 - i)).collect();
        assert_eq!(s.cache_stats().entries, 1);
        s.forget_chunk(crate::ChunkCoord::new(0, 0));
        assert_eq!(s.cache_stats().entries, 0);
        let after: Vec<i32> = (0..16).map(|i| s.height(i, 15 - i)).collect();
        assert_eq!(before, after);
        assert_eq!(s.cache_stats().evictions, 1);
    }
}

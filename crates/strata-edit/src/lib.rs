//! Player edits layered over procedural terrain.
#![forbid(unsafe_code)]

mod grid;
mod snapshot;

pub use grid::{EditGrid, GRID_CELL};
pub use snapshot::EditSnapshot;

use std::collections::HashMap;

use strata_world::{ChunkCoord, EditLookup};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
    pub grid_cells: usize,
}

/// Authoritative record of placed (`true`) and removed (`false`) blocks.
///
/// Edits are kept three ways: a flat map answers point queries, a per-chunk
/// index lets job construction copy out one chunk's edits without a scan,
/// and `EditGrid` holds placed blocks for collision. All three are updated
/// together in `set`.
pub struct EditStore {
    side: i32,
    blocks: HashMap<(i32, i32, i32), bool>,
    // key=chunk -> edits whose column falls inside it
    by_chunk: HashMap<ChunkCoord, HashMap<(i32, i32, i32), bool>>,
    grid: EditGrid,
}

impl EditStore {
    pub fn new(side: i32) -> Self {
        Self {
            side,
            blocks: HashMap::new(),
            by_chunk: HashMap::new(),
            grid: EditGrid::new(),
        }
    }

    pub fn stats(&self) -> EditStoreStats {
        EditStoreStats {
            chunk_entries: self.by_chunk.len(),
            block_edits: self.blocks.len(),
            grid_cells: self.grid.cell_count(),
        }
    }

    /// Placed blocks only, bucketed for AABB queries.
    #[inline]
    pub fn grid(&self) -> &EditGrid {
        &self.grid
    }

    #[inline]
    fn chunk_key(&self, wx: i32, wz: i32) -> ChunkCoord {
        ChunkCoord::containing(wx, wz, self.side)
    }

    pub fn get(&self, wx: i32, wy: i32, wz: i32) -> Option<bool> {
        self.blocks.get(&(wx, wy, wz)).copied()
    }

    /// Records an edit, replacing any earlier edit at the same position.
    pub fn set(&mut self, wx: i32, wy: i32, wz: i32, present: bool) {
        let k = self.chunk_key(wx, wz);
        self.blocks.insert((wx, wy, wz), present);
        self.by_chunk
            .entry(k)
            .or_default()
            .insert((wx, wy, wz), present);
        if present {
            self.grid.insert(wx, wy, wz);
        } else {
            self.grid.remove(wx, wy, wz);
        }
        log::trace!(target: "edit", "set ({}, {}, {}) = {} in ({}, {})", wx, wy, wz, present, k.cx, k.cz);
    }

    /// Edits in a chunk and its four face neighbours, enough to cull the
    /// chunk's boundary faces correctly.
    pub fn snapshot_neighborhood(&self, coord: ChunkCoord) -> EditSnapshot {
        let mut out = EditSnapshot::default();
        let neighbors = coord.face_neighbors();
        for key in std::iter::once(coord).chain(neighbors) {
            if let Some(m) = self.by_chunk.get(&key) {
                out.extend(m.iter().map(|(k, v)| (*k, *v)));
            }
        }
        out
    }

    /// Chunks whose geometry can change when column `(wx, wz)` is edited: the
    /// owner, plus the face neighbour across any boundary the column touches.
    pub fn get_affected_chunks(&self, wx: i32, wz: i32) -> Vec<ChunkCoord> {
        let owner = self.chunk_key(wx, wz);
        let lx = wx.rem_euclid(self.side);
        let lz = wz.rem_euclid(self.side);

        let mut affected = vec![owner];
        if lx == 0 {
            affected.push(owner.offset(-1, 0));
        }
        if lx == self.side - 1 {
            affected.push(owner.offset(1, 0));
        }
        if lz == 0 {
            affected.push(owner.offset(0, -1));
        }
        if lz == self.side - 1 {
            affected.push(owner.offset(0, 1));
        }
        affected
    }
}

impl EditLookup for EditStore {
    #[inline]
    fn edit_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        self.get(x, y, z)
    }
}

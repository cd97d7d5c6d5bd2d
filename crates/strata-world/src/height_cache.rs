use std::collections::{HashMap, VecDeque};

use crate::ChunkCoord;

/// Marks a cell whose height has not been computed yet.
const UNSET: i32 = i32::MIN;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeightCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// Per-chunk memo of column heights.
///
/// Values are written once and never change. When more than `capacity`
/// chunks are cached, the least recently used chunk is dropped; its heights
/// are simply recomputed if needed again.
pub struct HeightCache {
    side: i32,
    entries: HashMap<ChunkCoord, Box<[i32]>>,
    order: VecDeque<ChunkCoord>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl HeightCache {
    pub fn new(side: i32, capacity: usize) -> Self {
        Self {
            side,
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Returns the cached height of `(wx, wz)`, filling it with `compute` on first access.
    pub fn get_or_compute(&mut self, wx: i32, wz: i32, compute: impl FnOnce() -> i32) -> i32 {
        let coord = ChunkCoord::containing(wx, wz, self.side);
        let idx = (wz.rem_euclid(self.side) * self.side + wx.rem_euclid(self.side)) as usize;
        if self.entries.contains_key(&coord) {
            self.touch(coord);
        } else {
            self.insert_chunk(coord);
        }
        let Some(cells) = self.entries.get_mut(&coord) else {
            return compute();
        };
        let cached = cells[idx];
        if cached != UNSET {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;
        let h = compute();
        cells[idx] = h;
        h
    }

    /// Drops a chunk's heights, e.g. when it leaves the streamed area.
    pub fn forget(&mut self, coord: ChunkCoord) {
        if self.entries.remove(&coord).is_some() {
            self.evictions += 1;
            if let Some(pos) = self.order.iter().position(|c| *c == coord) {
                self.order.remove(pos);
            }
        }
    }

    pub fn stats(&self) -> HeightCacheStats {
        HeightCacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
        }
    }

    // Runs of lookups in one chunk leave it at the back, so most hits skip the scan.
    fn touch(&mut self, coord: ChunkCoord) {
        if self.order.back() == Some(&coord) {
            return;
        }
        if let Some(pos) = self.order.iter().position(|c| *c == coord) {
            if let Some(c) = self.order.remove(pos) {
                self.order.push_back(c);
            }
        }
    }

    fn insert_chunk(&mut self, coord: ChunkCoord) {
        let cells = (self.side * self.side) as usize;
        self.entries.insert(coord, vec![UNSET; cells].into_boxed_slice());
        self.order.push_back(coord);
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                if self.entries.remove(&old).is_some() {
                    self.evictions += 1;
                    log::trace!(target: "world", "height cache evicted ({}, {})", old.cx, old.cz);
                }
            }
        }
    }
}

use std::collections::{HashMap, HashSet};

use strata_geom::Aabb;

/// Side length, in blocks, of one grid cell.
pub const GRID_CELL: i32 = 8;

/// Coarse uniform grid over placed blocks, used for collision queries.
///
/// Only blocks placed by the player live here; procedural terrain and
/// removals are never indexed.
#[derive(Default)]
pub struct EditGrid {
    cells: HashMap<(i32, i32, i32), HashSet<(i32, i32, i32)>>,
    count: usize,
}

impl EditGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn cell_of(x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        (
            x.div_euclid(GRID_CELL),
            y.div_euclid(GRID_CELL),
            z.div_euclid(GRID_CELL),
        )
    }

    pub fn insert(&mut self, x: i32, y: i32, z: i32) {
        if self
            .cells
            .entry(Self::cell_of(x, y, z))
            .or_default()
            .insert((x, y, z))
        {
            self.count += 1;
        }
    }

    pub fn remove(&mut self, x: i32, y: i32, z: i32) {
        let key = Self::cell_of(x, y, z);
        if let Some(set) = self.cells.get_mut(&key) {
            if set.remove(&(x, y, z)) {
                self.count -= 1;
            }
            if set.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.cells
            .get(&Self::cell_of(x, y, z))
            .is_some_and(|s| s.contains(&(x, y, z)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Placed blocks whose unit cube overlaps `aabb`, sorted by position.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<(i32, i32, i32)> {
        let mut out = Vec::new();
        self.visit_aabb(aabb, |p| {
            out.push(p);
            false
        });
        out.sort_unstable();
        out
    }

    /// True if any placed block overlaps `aabb`.
    pub fn any_in_aabb(&self, aabb: &Aabb) -> bool {
        let mut hit = false;
        self.visit_aabb(aabb, |_| {
            hit = true;
            true
        });
        hit
    }

    // Calls `f` for each overlapping block until it returns true.
    fn visit_aabb(&self, aabb: &Aabb, mut f: impl FnMut((i32, i32, i32)) -> bool) {
        if aabb.is_empty() || self.cells.is_empty() {
            return;
        }
        let (lo, hi) = aabb.cell_range();
        let clo = Self::cell_of(lo.0, lo.1, lo.2);
        let chi = Self::cell_of(hi.0, hi.1, hi.2);
        for cy in clo.1..=chi.1 {
            for cz in clo.2..=chi.2 {
                for cx in clo.0..=chi.0 {
                    let Some(set) = self.cells.get(&(cx, cy, cz)) else {
                        continue;
                    };
                    for &(x, y, z) in set {
                        if Aabb::from_block(x, y, z).intersects(aabb) && f((x, y, z)) {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_geom::Vec3;

    #[test]
    fn insert_remove_keeps_count_and_drops_empty_cells() {
        let mut g = EditGrid::new();
        g.insert(1, 2, 3);
        g.insert(1, 2, 3);
        g.insert(-9, 0, 0);
        assert_eq!(g.len(), 2);
        assert_eq!(g.cell_count(), 2);
        g.remove(-9, 0, 0);
        g.remove(-9, 0, 0);
        assert_eq!(g.len(), 1);
        assert_eq!(g.cell_count(), 1);
        assert!(g.contains(1, 2, 3));
        assert!(!g.contains(-9, 0, 0));
    }

    #[test]
    fn query_crosses_cell_boundaries() {
        let mut g = EditGrid::new();
        g.insert(7, 10, 7);
        g.insert(8, 10, 8);
        g.insert(30, 10, 30);
        let q = Aabb::new(Vec3::new(6.5, 10.0, 6.5), Vec3::new(8.5, 11.0, 8.5));
        assert_eq!(g.query_aabb(&q), vec![(7, 10, 7), (8, 10, 8)]);
        assert!(g.any_in_aabb(&q));
        let miss = Aabb::new(Vec3::new(20.0, 0.0, 20.0), Vec3::new(21.0, 40.0, 21.0));
        assert!(g.query_aabb(&miss).is_empty());
        assert!(!g.any_in_aabb(&miss));
    }

    #[test]
    fn touching_box_does_not_hit() {
        let mut g = EditGrid::new();
        g.insert(0, 0, 0);
        let above = Aabb::new(Vec3::new(0.2, 1.0, 0.2), Vec3::new(0.8, 2.8, 0.8));
        assert!(!g.any_in_aabb(&above));
    }
}

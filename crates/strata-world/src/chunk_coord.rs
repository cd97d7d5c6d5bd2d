use serde::{Deserialize, Serialize};

/// Horizontal chunk key; a chunk spans the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    /// The four chunks sharing a face with this one, in -X, +X, -Z, +Z order.
    pub const FACE_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk owning world column `(wx, wz)` for chunks `side` blocks wide.
    #[inline]
    pub fn containing(wx: i32, wz: i32, side: i32) -> Self {
        Self {
            cx: wx.div_euclid(side),
            cz: wz.div_euclid(side),
        }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    #[inline]
    pub fn face_neighbors(self) -> [ChunkCoord; 4] {
        Self::FACE_OFFSETS.map(|(dx, dz)| self.offset(dx, dz))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

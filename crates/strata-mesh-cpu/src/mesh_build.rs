use strata_geom::Vec3;

use crate::face::Face;

/// Flat vertex/index buffers for one material of one chunk.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
}

impl MeshBuild {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        // 4 vertices per quad
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad with explicit per-vertex UVs.
    ///
    /// Corners are reordered when needed so both triangles wind
    /// counter-clockwise around `n`.
    pub fn add_quad_uv(&mut self, corners: [Vec3; 4], n: Vec3, mut uvs: [(f32, f32); 4], rgba: [u8; 4]) {
        let base = self.vertex_count() as u32;
        let [a, b, c, d] = corners;
        let mut vs = [a, d, c, b];
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        let cross = Vec3 {
            x: e1.y * e2.z - e1.z * e2.y,
            y: e1.z * e2.x - e1.x * e2.z,
            z: e1.x * e2.y - e1.y * e2.x,
        };
        if (cross.x * n.x + cross.y * n.y + cross.z * n.z) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        for i in 0..4 {
            self.pos.extend_from_slice(&[vs[i].x, vs[i].y, vs[i].z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Emits the unit face `face` of the block at `(x, y, z)`.
    pub fn add_face(&mut self, face: Face, x: i32, y: i32, z: i32, rgba: [u8; 4]) {
        let corners = face.corners(x, y, z);
        // UVs follow world space along the face plane
        let uv_from = |p: Vec3| match face {
            Face::PosY | Face::NegY => (p.x, p.z),
            Face::PosX | Face::NegX => (p.z, -p.y),
            Face::PosZ | Face::NegZ => (p.x, -p.y),
        };
        let uvs = [
            uv_from(corners[0]),
            uv_from(corners[3]),
            uv_from(corners[2]),
            uv_from(corners[1]),
        ];
        self.add_quad_uv(corners, face.normal(), uvs, rgba);
    }
}

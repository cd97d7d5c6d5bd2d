use std::collections::BTreeMap;

use strata_geom::{Aabb, Vec3};
use strata_world::{ChunkCoord, WorldConfig};

use crate::build::FaceQuad;
use crate::material::MaterialTag;
use crate::mesh_build::MeshBuild;

/// Render-ready geometry of one chunk, grouped by material.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub parts: BTreeMap<MaterialTag, MeshBuild>,
    pub face_count: usize,
}

impl ChunkMesh {
    /// Assembles buffers from a face list, asking `tag` for each face's part.
    ///
    /// The bounding box spans the chunk footprint horizontally and the
    /// emitted faces vertically; an empty chunk gets a flat box at y=0.
    pub fn from_faces(
        coord: ChunkCoord,
        world: &WorldConfig,
        faces: &[FaceQuad],
        mut tag: impl FnMut(&FaceQuad) -> MaterialTag,
    ) -> Self {
        let mut parts: BTreeMap<MaterialTag, MeshBuild> = BTreeMap::new();
        let mut y_lo = i32::MAX;
        let mut y_hi = i32::MIN;
        for f in faces {
            let t = tag(f);
            parts
                .entry(t)
                .or_default()
                .add_face(f.face, f.x, f.y, f.z, t.rgba());
            y_lo = y_lo.min(f.y);
            y_hi = y_hi.max(f.y + 1);
        }
        if faces.is_empty() {
            y_lo = 0;
            y_hi = 0;
        }
        let (ox, oz) = world.chunk_origin(coord);
        let side = world.chunk_side as f32;
        let min = Vec3::new(ox as f32, y_lo as f32, oz as f32);
        let max = Vec3::new(ox as f32 + side, y_hi as f32, oz as f32 + side);
        Self {
            coord,
            bbox: Aabb::new(min, max),
            parts,
            face_count: faces.len(),
        }
    }

    /// Single-part mesh for faces that carry no material information.
    pub fn untagged(coord: ChunkCoord, world: &WorldConfig, faces: &[FaceQuad]) -> Self {
        Self::from_faces(coord, world, faces, |_| MaterialTag::Untagged)
    }

    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.values().map(MeshBuild::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.values().map(MeshBuild::triangle_count).sum()
    }
}

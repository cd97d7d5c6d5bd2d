use strata_edit::EditSnapshot;
use strata_geom::Vec3;
use strata_world::{ChunkCoord, EditLookup, TerrainSampler};

use crate::face::Face;

/// One visible unit square: the block it belongs to and the side it faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceQuad {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub face: Face,
}

impl FaceQuad {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32, face: Face) -> Self {
        Self { x, y, z, face }
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.face.normal()
    }
}

/// Extracts every visible face of chunk `coord`.
///
/// A face is emitted when the neighbour across it is not a natural solid
/// block, or when the block itself carries an edit; faces between two
/// untouched terrain blocks are culled. `edits` must hold the edits of the
/// chunk and its four face neighbours so boundary faces resolve correctly.
///
/// The result depends only on the sampler's world/terrain parameters, the
/// coordinate and the snapshot, so any thread produces the same list in the
/// same order.
pub fn build_chunk_faces(
    sampler: &mut TerrainSampler,
    coord: ChunkCoord,
    edits: &EditSnapshot,
) -> Vec<FaceQuad> {
    let world = *sampler.world();
    let side = world.chunk_side;
    let (ox, oz) = world.chunk_origin(coord);
    let mut faces = Vec::new();

    for lz in 0..side {
        for lx in 0..side {
            let wx = ox + lx;
            let wz = oz + lz;
            let Some(top) = sampler.topmost(edits, wx, wz) else {
                continue;
            };
            for y in 0..=top {
                if !sampler.has_block(edits, wx, y, wz) {
                    continue;
                }
                let edited = edits.is_edited(wx, y, wz);
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (nx, ny, nz) = (wx + dx, y + dy, wz + dz);
                    if edited || !sampler.is_natural_solid(edits, nx, ny, nz) {
                        faces.push(FaceQuad::new(wx, y, wz, face));
                    }
                }
            }
        }
    }
    log::trace!(
        target: "mesh",
        "built ({}, {}) faces={} edits={}",
        coord.cx,
        coord.cz,
        faces.len(),
        edits.len()
    );
    faces
}

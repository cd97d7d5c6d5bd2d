use strata_world::{EditLookup, TerrainSampler};

use crate::build::FaceQuad;

/// Coarse surface category used to group faces into mesh parts.
///
/// Pooled builds only carry geometry, so their meshes use `Untagged`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialTag {
    Untagged,
    Grass,
    Dirt,
    Stone,
    Placed,
}

/// Blocks below the surface that still count as dirt.
const DIRT_DEPTH: i32 = 3;

impl MaterialTag {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            MaterialTag::Untagged => [200, 200, 200, 255],
            MaterialTag::Grass => [96, 160, 64, 255],
            MaterialTag::Dirt => [134, 96, 67, 255],
            MaterialTag::Stone => [125, 125, 125, 255],
            MaterialTag::Placed => [186, 140, 90, 255],
        }
    }
}

/// Tags a face by the block it belongs to: edited blocks are `Placed`,
/// terrain is graded by depth below its column's surface.
pub fn classify_face<E: EditLookup + ?Sized>(
    sampler: &mut TerrainSampler,
    edits: &E,
    quad: &FaceQuad,
) -> MaterialTag {
    if edits.edit_at(quad.x, quad.y, quad.z) == Some(true) {
        return MaterialTag::Placed;
    }
    match sampler.height(quad.x, quad.z) - quad.y {
        0 => MaterialTag::Grass,
        d if d <= DIRT_DEPTH => MaterialTag::Dirt,
        _ => MaterialTag::Stone,
    }
}

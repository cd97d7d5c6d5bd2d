//! CPU chunk meshing: face-culled quad extraction and vertex buffer assembly.
#![forbid(unsafe_code)]

mod build;
mod chunk;
mod face;
mod material;
mod mesh_build;

pub use build::{FaceQuad, build_chunk_faces};
pub use chunk::ChunkMesh;
pub use face::Face;
pub use material::{MaterialTag, classify_face};
pub use mesh_build::MeshBuild;

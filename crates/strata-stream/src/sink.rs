use strata_mesh_cpu::ChunkMesh;

/// Presentation side of the stream: receives finished meshes and gives back
/// handles it later expects to be released.
pub trait RenderSink {
    type Handle;

    fn upload(&mut self, mesh: ChunkMesh, visible: bool) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);

    fn set_visible(&mut self, _handle: &Self::Handle, _visible: bool) {}
}

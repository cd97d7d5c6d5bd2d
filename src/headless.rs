use hashbrown::HashMap;
use strata_mesh_cpu::ChunkMesh;
use strata_stream::RenderSink;

#[derive(Debug, Clone, Copy)]
struct Uploaded {
    triangles: usize,
    visible: bool,
}

/// Stands in for a GPU: tracks which meshes are resident and how big they are.
#[derive(Default)]
pub struct HeadlessSink {
    next: u64,
    live: HashMap<u64, Uploaded>,
    pub uploads: u64,
    pub releases: u64,
}

impl HeadlessSink {
    pub fn live_meshes(&self) -> usize {
        self.live.len()
    }

    pub fn live_triangles(&self) -> usize {
        self.live.values().map(|u| u.triangles).sum()
    }

    pub fn visible_meshes(&self) -> usize {
        self.live.values().filter(|u| u.visible).count()
    }
}

impl RenderSink for HeadlessSink {
    type Handle = u64;

    fn upload(&mut self, mesh: ChunkMesh, visible: bool) -> u64 {
        self.next += 1;
        self.uploads += 1;
        self.live.insert(
            self.next,
            Uploaded {
                triangles: mesh.triangle_count(),
                visible,
            },
        );
        self.next
    }

    fn release(&mut self, handle: u64) {
        if self.live.remove(&handle).is_some() {
            self.releases += 1;
        } else {
            log::warn!("release of unknown mesh handle {handle}");
        }
    }

    fn set_visible(&mut self, handle: &u64, visible: bool) {
        if let Some(u) = self.live.get_mut(handle) {
            u.visible = visible;
        }
    }
}

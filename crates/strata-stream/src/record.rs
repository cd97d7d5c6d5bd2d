use strata_geom::Aabb;
use strata_world::ChunkCoord;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Waiting for a build; may still show older geometry.
    Pending,
    Ready,
}

#[derive(Debug)]
pub struct Renderable<H> {
    pub handle: H,
    pub bbox: Aabb,
    pub face_count: usize,
}

/// Per-chunk bookkeeping for a tracked coordinate.
#[derive(Debug)]
pub struct ChunkRecord<H> {
    pub(crate) coord: ChunkCoord,
    pub(crate) state: ChunkState,
    pub(crate) pending_version: u64,
    pub(crate) built_version: Option<u64>,
    pub(crate) visible: bool,
    pub(crate) render: Option<Renderable<H>>,
}

impl<H> ChunkRecord<H> {
    pub(crate) fn pending(coord: ChunkCoord, version: u64) -> Self {
        Self {
            coord,
            state: ChunkState::Pending,
            pending_version: version,
            built_version: None,
            visible: true,
            render: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Version of the newest job issued for this chunk.
    pub fn pending_version(&self) -> u64 {
        self.pending_version
    }

    /// Version whose geometry is currently shown, if any.
    pub fn built_version(&self) -> Option<u64> {
        self.built_version
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn bbox(&self) -> Option<Aabb> {
        self.render.as_ref().map(|r| r.bbox)
    }

    pub fn face_count(&self) -> usize {
        self.render.as_ref().map_or(0, |r| r.face_count)
    }

    pub fn handle(&self) -> Option<&H> {
        self.render.as_ref().map(|r| &r.handle)
    }
}

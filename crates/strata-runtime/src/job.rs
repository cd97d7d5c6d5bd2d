use std::fmt;

use strata_edit::EditSnapshot;
use strata_mesh_cpu::{ChunkMesh, FaceQuad, MaterialTag};
use strata_world::{ChunkCoord, WorldConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// First build of a newly streamed-in chunk.
    Load,
    /// Rebuild of a tracked chunk after an edit.
    Rebuild,
}

/// Everything a worker needs to build one chunk; owns its edit snapshot.
#[derive(Clone, Debug)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub version: u64,
    pub job_id: u64,
    pub kind: JobKind,
    pub edits: EditSnapshot,
}

impl MeshJob {
    /// `job_id` is assigned by the runtime on submit.
    pub fn new(coord: ChunkCoord, version: u64, kind: JobKind, edits: EditSnapshot) -> Self {
        Self {
            coord,
            version,
            job_id: 0,
            kind,
            edits,
        }
    }
}

/// Returned by `Runtime::submit`; matches the eventual `JobOut`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobTicket {
    pub job_id: u64,
    pub coord: ChunkCoord,
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobError {
    Panicked(String),
    Failed(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Panicked(msg) => write!(f, "mesh job panicked: {msg}"),
            JobError::Failed(msg) => write!(f, "mesh job failed: {msg}"),
        }
    }
}

impl std::error::Error for JobError {}

/// Face list of a finished job; `tags` is present only for inline builds.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltFaces {
    pub faces: Vec<FaceQuad>,
    pub tags: Option<Vec<MaterialTag>>,
}

impl BuiltFaces {
    pub fn into_mesh(self, coord: ChunkCoord, world: &WorldConfig) -> ChunkMesh {
        match self.tags {
            Some(tags) => {
                let mut it = tags.into_iter();
                ChunkMesh::from_faces(coord, world, &self.faces, |_| {
                    it.next().unwrap_or(MaterialTag::Untagged)
                })
            }
            None => ChunkMesh::untagged(coord, world, &self.faces),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobOutcome {
    Built(BuiltFaces),
    Failed(JobError),
    /// Dropped before dispatch because a newer job for the same chunk was queued.
    Skipped,
}

#[derive(Clone, Debug)]
pub struct JobOut {
    pub coord: ChunkCoord,
    pub version: u64,
    pub job_id: u64,
    pub kind: JobKind,
    pub outcome: JobOutcome,
    pub t_total_ms: u32,
}

impl JobOut {
    pub(crate) fn skipped(job: &MeshJob) -> Self {
        Self {
            coord: job.coord,
            version: job.version,
            job_id: job.job_id,
            kind: job.kind,
            outcome: JobOutcome::Skipped,
            t_total_ms: 0,
        }
    }
}

use std::collections::VecDeque;

use hashbrown::HashMap;
use strata_world::ChunkCoord;

use crate::job::{JobOut, MeshJob};

/// FIFO of undispatched jobs where a newer job for a chunk retires older ones.
#[derive(Default)]
pub(crate) struct JobQueue {
    jobs: VecDeque<MeshJob>,
    // key=chunk -> job_id of the newest queued job for it
    newest: HashMap<ChunkCoord, u64>,
    // results produced without running a job, delivered on the next poll
    notices: Vec<JobOut>,
}

impl JobQueue {
    pub fn push(&mut self, job: MeshJob) {
        self.newest.insert(job.coord, job.job_id);
        self.jobs.push_back(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    pub fn notify(&mut self, out: JobOut) {
        self.notices.push(out);
    }

    pub fn take_notices(&mut self) -> Vec<JobOut> {
        std::mem::take(&mut self.notices)
    }

    /// Next job still worth running; superseded ones become skip notices.
    pub fn pop_live(&mut self) -> Option<MeshJob> {
        while let Some(job) = self.jobs.pop_front() {
            if self.newest.get(&job.coord) == Some(&job.job_id) {
                self.newest.remove(&job.coord);
                return Some(job);
            }
            log::trace!(
                target: "runtime",
                "skip job {} for ({}, {}) v{}",
                job.job_id,
                job.coord.cx,
                job.coord.cz,
                job.version
            );
            self.notices.push(JobOut::skipped(&job));
        }
        None
    }
}

//! Meshing worker pool: job queue, adaptive throttle and result delivery.
#![forbid(unsafe_code)]

mod config;
mod governor;
mod job;
mod queue;

pub use config::RuntimeConfig;
pub use governor::{Adjustment, ConcurrencyGovernor, LIMIT_FLOOR};
pub use job::{BuiltFaces, JobError, JobKind, JobOut, JobOutcome, JobTicket, MeshJob};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, SendError, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use strata_mesh_cpu::{FaceQuad, build_chunk_faces, classify_face};
use strata_world::{TerrainConfig, TerrainSampler, WorldConfig};

use crate::queue::JobQueue;

/// Geometry step run for every job. Swappable so callers can inject
/// deterministic or failing builds.
pub type BuildFn =
    Arc<dyn Fn(&mut TerrainSampler, &MeshJob) -> Result<Vec<FaceQuad>, JobError> + Send + Sync>;

pub fn default_build_fn() -> BuildFn {
    Arc::new(
        |sampler: &mut TerrainSampler, job: &MeshJob| -> Result<Vec<FaceQuad>, JobError> {
            Ok(build_chunk_faces(sampler, job.coord, &job.edits))
        },
    )
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Worker threads; 0 when building inline.
    pub workers: usize,
    pub limit: usize,
    pub queued: usize,
    pub outstanding: usize,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub avg_ms: f32,
}

// Everything needed to make a fresh sampler identical to every other one.
#[derive(Clone)]
struct SamplerRecipe {
    world: WorldConfig,
    params: Arc<TerrainConfig>,
    cache_chunks: usize,
}

impl SamplerRecipe {
    fn sampler(&self) -> TerrainSampler {
        TerrainSampler::new(self.world, self.params.clone(), self.cache_chunks)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_job(
    build: &BuildFn,
    sampler: &mut TerrainSampler,
    recipe: &SamplerRecipe,
    job: MeshJob,
    tag: bool,
) -> JobOut {
    let t_job_start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| build(sampler, &job)));
    let outcome = match result {
        Ok(Ok(faces)) => {
            let tags = tag.then(|| {
                faces
                    .iter()
                    .map(|f| classify_face(sampler, &job.edits, f))
                    .collect()
            });
            JobOutcome::Built(BuiltFaces { faces, tags })
        }
        Ok(Err(e)) => JobOutcome::Failed(e),
        Err(payload) => {
            // the cache may be half-written
            *sampler = recipe.sampler();
            JobOutcome::Failed(JobError::Panicked(panic_message(payload.as_ref())))
        }
    };
    let t_total_ms = t_job_start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    JobOut {
        coord: job.coord,
        version: job.version,
        job_id: job.job_id,
        kind: job.kind,
        outcome,
        t_total_ms,
    }
}

struct WorkerPool {
    job_tx: Sender<MeshJob>,
    res_rx: Receiver<JobOut>,
    workers: usize,
    _pool: Arc<ThreadPool>,
}

impl WorkerPool {
    fn spawn(workers: usize, recipe: &SamplerRecipe, build: &BuildFn) -> Self {
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("strata-mesh-{i}"))
                .build()
                .expect("mesh pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let recipe = recipe.clone();
            let build = build.clone();
            pool.spawn(move || {
                let mut sampler = recipe.sampler();
                while let Ok(job) = rx.recv() {
                    let out = run_job(&build, &mut sampler, &recipe, job, false);
                    if tx.send(out).is_err() {
                        break;
                    }
                }
            });
        }
        Self {
            job_tx,
            res_rx,
            workers,
            _pool: pool,
        }
    }
}

struct InlineBuilder {
    sampler: TerrainSampler,
}

enum Backend {
    Pool(WorkerPool),
    Inline(InlineBuilder),
}

/// Owner of the meshing backend, living on the coordinating thread.
///
/// `submit` only queues (and, for the pool, hands jobs to idle workers while
/// `outstanding < limit`). Completed work comes back through `poll`, which
/// also re-examines the queue afterwards, so completions never dispatch
/// from inside another completion.
pub struct Runtime {
    backend: Backend,
    build: BuildFn,
    recipe: SamplerRecipe,
    queue: JobQueue,
    governor: ConcurrencyGovernor,
    outstanding: usize,
    next_job_id: u64,
    completed: u64,
    failed: u64,
    skipped: u64,
    total_ms: u64,
}

impl Runtime {
    pub fn new(world: WorldConfig, params: Arc<TerrainConfig>, cfg: &RuntimeConfig) -> Self {
        Self::with_build_fn(world, params, cfg, default_build_fn())
    }

    pub fn with_build_fn(
        world: WorldConfig,
        params: Arc<TerrainConfig>,
        cfg: &RuntimeConfig,
        build: BuildFn,
    ) -> Self {
        let recipe = SamplerRecipe {
            world,
            params,
            cache_chunks: cfg.height_cache_chunks,
        };
        let size = cfg.pool_size();
        let backend = if cfg.inline {
            Backend::Inline(InlineBuilder {
                sampler: recipe.sampler(),
            })
        } else {
            Backend::Pool(WorkerPool::spawn(size, &recipe, &build))
        };
        log::info!(
            target: "runtime",
            "meshing backend: {} (limit {})",
            if cfg.inline { "inline".to_string() } else { format!("{size} workers") },
            size
        );
        Self {
            backend,
            build,
            recipe,
            queue: JobQueue::default(),
            governor: ConcurrencyGovernor::new(size, cfg.window, cfg.slow_ms, cfg.fast_ms),
            outstanding: 0,
            next_job_id: 0,
            completed: 0,
            failed: 0,
            skipped: 0,
            total_ms: 0,
        }
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.backend, Backend::Inline(_))
    }

    pub fn world(&self) -> &WorldConfig {
        &self.recipe.world
    }

    pub fn governor(&self) -> &ConcurrencyGovernor {
        &self.governor
    }

    /// Nothing queued, running or waiting to be reported.
    pub fn is_idle(&self) -> bool {
        self.queue.len() == 0 && self.outstanding == 0 && !self.queue.has_notices()
    }

    pub fn submit(&mut self, mut job: MeshJob) -> JobTicket {
        self.next_job_id += 1;
        job.job_id = self.next_job_id;
        let ticket = JobTicket {
            job_id: job.job_id,
            coord: job.coord,
            version: job.version,
        };
        log::trace!(
            target: "runtime",
            "submit job {} {:?} ({}, {}) v{} edits={}",
            job.job_id,
            job.kind,
            job.coord.cx,
            job.coord.cz,
            job.version,
            job.edits.len()
        );
        self.queue.push(job);
        self.dispatch();
        ticket
    }

    /// Collects finished, failed and skipped jobs, then refills idle workers.
    pub fn poll(&mut self) -> Vec<JobOut> {
        let mut out = self.queue.take_notices();
        match &mut self.backend {
            Backend::Pool(pool) => {
                for res in pool.res_rx.try_iter() {
                    self.outstanding = self.outstanding.saturating_sub(1);
                    out.push(res);
                }
            }
            Backend::Inline(inline) => {
                for _ in 0..self.governor.limit() {
                    let Some(job) = self.queue.pop_live() else {
                        break;
                    };
                    out.push(run_job(
                        &self.build,
                        &mut inline.sampler,
                        &self.recipe,
                        job,
                        true,
                    ));
                }
                out.extend(self.queue.take_notices());
            }
        }
        for res in &out {
            self.observe(res);
        }
        self.dispatch();
        out
    }

    pub fn stats(&self) -> PoolStats {
        let workers = match &self.backend {
            Backend::Pool(pool) => pool.workers,
            Backend::Inline(_) => 0,
        };
        PoolStats {
            workers,
            limit: self.governor.limit(),
            queued: self.queue.len(),
            outstanding: self.outstanding,
            completed: self.completed,
            failed: self.failed,
            skipped: self.skipped,
            avg_ms: if self.completed + self.failed == 0 {
                0.0
            } else {
                self.total_ms as f32 / (self.completed + self.failed) as f32
            },
        }
    }

    fn dispatch(&mut self) {
        let Backend::Pool(pool) = &self.backend else {
            return;
        };
        while self.outstanding < self.governor.limit() {
            let Some(job) = self.queue.pop_live() else {
                break;
            };
            match pool.job_tx.send(job) {
                Ok(()) => self.outstanding += 1,
                Err(SendError(job)) => {
                    log::warn!(target: "runtime", "worker pool gone; job {} dropped", job.job_id);
                    self.queue.notify(JobOut {
                        coord: job.coord,
                        version: job.version,
                        job_id: job.job_id,
                        kind: job.kind,
                        outcome: JobOutcome::Failed(JobError::Failed(
                            "worker pool disconnected".to_string(),
                        )),
                        t_total_ms: 0,
                    });
                }
            }
        }
    }

    fn observe(&mut self, res: &JobOut) {
        match &res.outcome {
            JobOutcome::Skipped => {
                self.skipped += 1;
                return;
            }
            JobOutcome::Built(_) => self.completed += 1,
            JobOutcome::Failed(_) => self.failed += 1,
        }
        self.total_ms += u64::from(res.t_total_ms);
        if let Some(adj) = self.governor.record(res.t_total_ms) {
            log::info!(target: "runtime", "concurrency limit {:?}", adj);
        }
    }
}

use std::collections::{BTreeSet, VecDeque};

use hashbrown::{HashMap, HashSet};
use strata_geom::{Aabb, Vec3};
use strata_runtime::{JobKind, JobOut, JobOutcome, MeshJob, PoolStats, Runtime};
use strata_world::ChunkCoord;

use crate::config::StreamConfig;
use crate::error::EditError;
use crate::record::{ChunkRecord, ChunkState, Renderable};
use crate::sink::RenderSink;
use crate::state::WorldState;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub active: usize,
    pub ready: usize,
    pub pending: usize,
    pub queued_loads: usize,
    pub loads_started: u64,
    pub rebuilds_issued: u64,
    pub results_applied: u64,
    pub stale_discarded: u64,
    pub failures: u64,
    pub evictions: u64,
}

/// Chunk coordinates within `radius` (Euclidean, chunk units) of `center`,
/// nearest first with ties broken by coordinate.
pub fn desired_chunks(center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    let r2 = i64::from(radius) * i64::from(radius);
    let mut out = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            let c = center.offset(dx, dz);
            if c.distance_sq(center) <= r2 {
                out.push(c);
            }
        }
    }
    out.sort_by_key(|c| (c.distance_sq(center), *c));
    out
}

/// Streams chunks around the viewer and keeps their geometry current.
///
/// Every chunk moves `absent -> pending -> ready`, back to `pending` on a
/// rebuild request, and to `absent` on eviction. Each issued job carries a
/// version from one global counter; a result is applied only if it still
/// matches its record's `pending_version`, so late results never overwrite
/// newer geometry.
///
/// New chunks load one at a time through a single pump slot. Rebuilds
/// bypass the pump and run alongside loads, limited only by the runtime's
/// concurrency limit.
pub struct ChunkManager<S: RenderSink> {
    state: WorldState,
    runtime: Runtime,
    sink: S,
    cfg: StreamConfig,
    visible_radius: i32,
    viewer: Vec3,
    center: Option<ChunkCoord>,
    records: HashMap<ChunkCoord, ChunkRecord<S::Handle>>,
    load_queue: VecDeque<ChunkCoord>,
    // job_id of the load occupying the pump slot
    loading: Option<u64>,
    rebuild_requests: BTreeSet<ChunkCoord>,
    build_counter: u64,
    stats: StreamStats,
}

impl<S: RenderSink> ChunkManager<S> {
    pub fn new(state: WorldState, runtime: Runtime, sink: S, cfg: &StreamConfig) -> Self {
        Self {
            visible_radius: cfg.clamp_radius(cfg.visible_radius),
            cfg: cfg.clone(),
            state,
            runtime,
            sink,
            viewer: Vec3::ZERO,
            center: None,
            records: HashMap::new(),
            load_queue: VecDeque::new(),
            loading: None,
            rebuild_requests: BTreeSet::new(),
            build_counter: 0,
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Read access for queries that warm the height cache.
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn viewer(&self) -> Vec3 {
        self.viewer
    }

    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn visible_radius(&self) -> i32 {
        self.visible_radius
    }

    pub fn record(&self, coord: ChunkCoord) -> Option<&ChunkRecord<S::Handle>> {
        self.records.get(&coord)
    }

    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord<S::Handle>> {
        self.records.values()
    }

    pub fn has_block(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.state.has_block(x, y, z)
    }

    /// Feeds the viewer position; streaming reacts only when it enters a new chunk.
    pub fn update_viewer(&mut self, pos: Vec3) {
        self.viewer = pos;
        let c = self.state.world().chunk_at_position(pos.x, pos.z);
        if self.center != Some(c) {
            log::debug!(target: "stream", "viewer entered ({}, {})", c.cx, c.cz);
            self.center = Some(c);
            self.update_chunks();
        }
    }

    /// Clamps to the configured range and re-evaluates the desired set if it changed.
    pub fn set_visible_radius(&mut self, r: i32) -> i32 {
        let r = self.cfg.clamp_radius(r);
        if r != self.visible_radius {
            self.visible_radius = r;
            self.update_chunks();
        }
        r
    }

    /// Evicts chunks outside the desired set and replaces the load queue
    /// with the missing ones, nearest first.
    pub fn update_chunks(&mut self) {
        let Some(center) = self.center else {
            return;
        };
        let desired = desired_chunks(center, self.visible_radius);
        let keep: HashSet<ChunkCoord> = desired.iter().copied().collect();

        let mut evict: Vec<ChunkCoord> = self
            .records
            .keys()
            .filter(|c| !keep.contains(*c))
            .copied()
            .collect();
        evict.sort_unstable();
        for coord in evict {
            self.evict(coord);
        }

        self.load_queue = desired
            .into_iter()
            .filter(|c| !self.records.contains_key(c))
            .collect();
    }

    /// Queues a rebuild of a tracked chunk; repeats before the next tick coalesce.
    /// Returns false for coordinates that are not tracked.
    pub fn request_chunk_rebuild(&mut self, coord: ChunkCoord) -> bool {
        if !self.records.contains_key(&coord) {
            return false;
        }
        self.rebuild_requests.insert(coord);
        true
    }

    /// The single write path for block state.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        present: bool,
    ) -> Result<Vec<ChunkCoord>, EditError> {
        let affected = self.state.set_block(x, y, z, present)?;
        log::debug!(
            target: "edit",
            "{} ({x}, {y}, {z}) affects {} chunk(s)",
            if present { "place" } else { "remove" },
            affected.len()
        );
        for coord in &affected {
            self.request_chunk_rebuild(*coord);
        }
        Ok(affected)
    }

    /// Places a block unless its cell strictly overlaps `viewer`.
    pub fn place_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        viewer: &Aabb,
    ) -> Result<Vec<ChunkCoord>, EditError> {
        if Aabb::from_block(x, y, z).intersects(viewer) {
            return Err(EditError::ObstructedByViewer);
        }
        self.set_block(x, y, z, true)
    }

    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) -> Result<Vec<ChunkCoord>, EditError> {
        self.set_block(x, y, z, false)
    }

    pub fn set_visible(&mut self, coord: ChunkCoord, visible: bool) -> bool {
        let Some(rec) = self.records.get_mut(&coord) else {
            return false;
        };
        rec.visible = visible;
        if let Some(r) = &rec.render {
            self.sink.set_visible(&r.handle, visible);
        }
        true
    }

    /// One coordinating-thread step: apply finished jobs, issue pending
    /// rebuilds, then let the load pump start the next chunk.
    pub fn tick(&mut self) {
        for out in self.runtime.poll() {
            self.apply(out);
        }
        self.flush_rebuilds();
        self.pump_loads();
    }

    /// No loads queued or running and no rebuilds outstanding.
    pub fn is_settled(&self) -> bool {
        self.load_queue.is_empty()
            && self.loading.is_none()
            && self.rebuild_requests.is_empty()
            && self.runtime.is_idle()
    }

    pub fn stats(&self) -> StreamStats {
        let ready = self
            .records
            .values()
            .filter(|r| r.state == ChunkState::Ready)
            .count();
        StreamStats {
            active: self.records.len(),
            ready,
            pending: self.records.len() - ready,
            queued_loads: self.load_queue.len(),
            ..self.stats
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.runtime.stats()
    }

    /// Drops every tracked chunk, releasing its geometry.
    pub fn evict_all(&mut self) {
        let mut all: Vec<ChunkCoord> = self.records.keys().copied().collect();
        all.sort_unstable();
        for coord in all {
            self.evict(coord);
        }
        self.load_queue.clear();
        self.rebuild_requests.clear();
        self.center = None;
    }

    fn evict(&mut self, coord: ChunkCoord) {
        if let Some(rec) = self.records.remove(&coord) {
            if let Some(r) = rec.render {
                self.sink.release(r.handle);
            }
            self.rebuild_requests.remove(&coord);
            self.state.forget_chunk(coord);
            self.stats.evictions += 1;
            log::debug!(target: "stream", "evict ({}, {})", coord.cx, coord.cz);
        }
    }

    fn next_version(&mut self) -> u64 {
        self.build_counter += 1;
        self.build_counter
    }

    fn flush_rebuilds(&mut self) {
        for coord in std::mem::take(&mut self.rebuild_requests) {
            if !self.records.contains_key(&coord) {
                continue;
            }
            let version = self.next_version();
            let edits = self.state.snapshot_for_job(coord);
            if let Some(rec) = self.records.get_mut(&coord) {
                rec.pending_version = version;
                rec.state = ChunkState::Pending;
            }
            self.runtime
                .submit(MeshJob::new(coord, version, JobKind::Rebuild, edits));
            self.stats.rebuilds_issued += 1;
        }
    }

    fn pump_loads(&mut self) {
        if self.loading.is_some() {
            return;
        }
        while let Some(coord) = self.load_queue.pop_front() {
            if self.records.contains_key(&coord) {
                continue;
            }
            let version = self.next_version();
            let edits = self.state.snapshot_for_job(coord);
            let ticket = self
                .runtime
                .submit(MeshJob::new(coord, version, JobKind::Load, edits));
            self.records.insert(coord, ChunkRecord::pending(coord, version));
            self.loading = Some(ticket.job_id);
            self.stats.loads_started += 1;
            log::debug!(
                target: "stream",
                "load ({}, {}) v{} ({} queued)",
                coord.cx,
                coord.cz,
                version,
                self.load_queue.len()
            );
            break;
        }
    }

    fn apply(&mut self, out: JobOut) {
        if self.loading == Some(out.job_id) {
            self.loading = None;
        }
        let Some(rec) = self.records.get_mut(&out.coord) else {
            log::trace!(
                target: "stream",
                "drop result for untracked ({}, {})",
                out.coord.cx,
                out.coord.cz
            );
            return;
        };
        if out.version != rec.pending_version {
            self.stats.stale_discarded += 1;
            log::trace!(
                target: "stream",
                "stale ({}, {}) v{} < v{}",
                out.coord.cx,
                out.coord.cz,
                out.version,
                rec.pending_version
            );
            return;
        }
        match out.outcome {
            JobOutcome::Built(built) => {
                let mesh = built.into_mesh(out.coord, self.state.world());
                let bbox = mesh.bbox;
                let face_count = mesh.face_count;
                let handle = self.sink.upload(mesh, rec.visible);
                let fresh = Renderable {
                    handle,
                    bbox,
                    face_count,
                };
                if let Some(old) = rec.render.replace(fresh) {
                    self.sink.release(old.handle);
                }
                rec.state = ChunkState::Ready;
                rec.built_version = Some(out.version);
                self.stats.results_applied += 1;
            }
            JobOutcome::Failed(err) => {
                self.stats.failures += 1;
                if rec.render.is_some() {
                    rec.state = ChunkState::Ready;
                }
                log::warn!(
                    target: "stream",
                    "{:?} of ({}, {}) v{} failed: {err}",
                    out.kind,
                    out.coord.cx,
                    out.coord.cz,
                    out.version
                );
            }
            // A skip always has a newer job behind it, so this is only
            // reached if versions were reused.
            JobOutcome::Skipped => {
                self.stats.stale_discarded += 1;
            }
        }
    }
}

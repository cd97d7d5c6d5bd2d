use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_geom::{Aabb, Vec3};
use strata_runtime::Runtime;
use strata_stream::{ChunkManager, StreamStats, WorldState};
use strata_world::ChunkCoord;

use crate::config::AppConfig;
use crate::event::{Event, EventEnvelope, EventQueue};
use crate::headless::HeadlessSink;

const VIEWER_WIDTH: f32 = 0.6;
const VIEWER_HEIGHT: f32 = 1.8;
/// Ticks between scripted edits.
const EDIT_EVERY: u64 = 45;
const STATS_EVERY: u64 = 120;
const CULL_EVERY: u64 = 10;
/// Upper bound on ticks spent waiting for the stream to settle after the walk.
const SETTLE_TICKS: u64 = 20_000;

/// Scripted headless session: walks the viewer across the terrain, digs and
/// builds along the way, and keeps the stream running.
pub struct App {
    manager: ChunkManager<HeadlessSink>,
    queue: EventQueue,
    viewer: Vec3,
    speed: f32,
    edits_ok: u64,
    edits_refused: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub ticks: u64,
    pub settled: bool,
    pub stream: StreamStats,
    pub live_meshes: usize,
    pub live_triangles: usize,
    pub edits_ok: u64,
    pub edits_refused: u64,
}

impl App {
    pub fn new(cfg: &AppConfig, speed: f32) -> Self {
        let params = Arc::new(cfg.terrain.clone());
        let mut state = WorldState::new(cfg.world, params.clone(), cfg.runtime.height_cache_chunks);
        let viewer = state.spawn_point(0, 0);
        let runtime = Runtime::new(cfg.world, params, &cfg.runtime);
        let manager = ChunkManager::new(state, runtime, HeadlessSink::default(), &cfg.stream);
        log::info!(
            "spawn at ({:.1}, {:.1}, {:.1}), radius {}",
            viewer.x,
            viewer.y,
            viewer.z,
            manager.visible_radius()
        );
        let mut queue = EventQueue::new();
        queue.push(Event::ViewerMoved { pos: viewer });
        Self {
            manager,
            queue,
            viewer,
            speed,
            edits_ok: 0,
            edits_refused: 0,
        }
    }

    fn viewer_box(&self) -> Aabb {
        Aabb::from_feet(self.viewer, VIEWER_WIDTH, VIEWER_HEIGHT)
    }

    /// Hides ready chunks lying wholly behind the viewer along the walk
    /// direction and shows them again once they are not.
    fn cull_behind(&mut self) {
        let reach = self.manager.state().world().chunk_side as f32;
        let cutoff = self.viewer.x - reach;
        let mut changes = Vec::new();
        for rec in self.manager.records() {
            let Some(bbox) = rec.bbox() else {
                continue;
            };
            let visible = bbox.max.x >= cutoff;
            if visible != rec.visible() {
                let c = rec.coord();
                changes.push((c.cx, c.cz, visible));
            }
        }
        changes.sort_unstable();
        for (cx, cz, visible) in changes {
            self.queue.push(Event::VisibilityChanged { cx, cz, visible });
        }
    }

    /// Queues this tick's scripted intents.
    fn script(&mut self) {
        let tick = self.queue.now();
        self.queue.push(Event::Tick);
        if self.speed != 0.0 && tick % CULL_EVERY == 0 {
            self.cull_behind();
        }
        if self.speed != 0.0 {
            let x = self.viewer.x + self.speed;
            let z = self.viewer.z + self.speed * 0.25;
            let (bx, bz) = (x.floor() as i32, z.floor() as i32);
            let y = self.manager.state_mut().ground_height(bx, bz) as f32;
            self.queue.push(Event::ViewerMoved {
                pos: Vec3::new(x, y, z),
            });
        }
        if tick > 0 && tick % EDIT_EVERY == 0 {
            let (x, _, z) = self.viewer.cell();
            let ahead = x + 3;
            let ground = self.manager.state_mut().ground_height(ahead, z);
            self.queue.push(Event::RemoveRequested {
                x: ahead,
                y: ground - 1,
                z,
            });
            let side = z + 2;
            let top = self.manager.state_mut().ground_height(x, side);
            self.queue.push_after(
                1,
                Event::PlaceRequested {
                    x,
                    y: top,
                    z: side,
                },
            );
        }
    }

    fn handle(&mut self, env: EventEnvelope) {
        let tick = env.tick;
        match env.kind {
            Event::Tick => {
                log::trace!(target: "events", "[tick {}] Tick #{}", tick, env.seq);
            }
            Event::ViewerMoved { pos } => {
                log::trace!(target: "events", "[tick {}] ViewerMoved ({:.2}, {:.2}, {:.2})", tick, pos.x, pos.y, pos.z);
                self.viewer = pos;
                self.manager.update_viewer(pos);
            }
            Event::RadiusChanged { radius } => {
                let r = self.manager.set_visible_radius(radius);
                log::info!(target: "events", "[tick {}] RadiusChanged {} -> {}", tick, radius, r);
            }
            Event::PlaceRequested { x, y, z } => {
                let body = self.viewer_box();
                let res = self.manager.place_block(x, y, z, &body);
                self.record_edit(tick, "place", (x, y, z), res);
            }
            Event::RemoveRequested { x, y, z } => {
                let res = self.manager.remove_block(x, y, z);
                self.record_edit(tick, "remove", (x, y, z), res);
            }
            Event::VisibilityChanged { cx, cz, visible } => {
                let known = self.manager.set_visible(ChunkCoord::new(cx, cz), visible);
                log::debug!(target: "events", "[tick {}] VisibilityChanged ({}, {}) {} known={}", tick, cx, cz, visible, known);
            }
        }
    }

    fn record_edit(
        &mut self,
        tick: u64,
        what: &str,
        at: (i32, i32, i32),
        res: Result<Vec<ChunkCoord>, strata_stream::EditError>,
    ) {
        match res {
            Ok(affected) => {
                self.edits_ok += 1;
                log::info!(target: "events", "[tick {}] {} {:?} rebuilds={}", tick, what, at, affected.len());
            }
            Err(e) => {
                self.edits_refused += 1;
                log::info!(target: "events", "[tick {}] {} {:?} refused: {}", tick, what, at, e);
            }
        }
    }

    pub fn step(&mut self) {
        self.script();
        while let Some(env) = self.queue.pop_ready() {
            self.handle(env);
        }
        self.manager.tick();
        let tick = self.queue.now();
        if tick > 0 && tick % STATS_EVERY == 0 {
            self.log_stats();
        }
        self.queue.end_tick();
    }

    fn log_stats(&self) {
        let s = self.manager.stats();
        let p = self.manager.pool_stats();
        let sink = self.manager.sink();
        log::info!(
            "[tick {}] chunks {}/{} ready, {} queued | applied {} stale {} failed {} evicted {} | pool limit {} out {} avg {:.1}ms | meshes {} ({} visible) tris {} up/rel {}/{} | events {}",
            self.queue.now(),
            s.ready,
            s.active,
            s.queued_loads,
            s.results_applied,
            s.stale_discarded,
            s.failures,
            s.evictions,
            p.limit,
            p.outstanding,
            p.avg_ms,
            sink.live_meshes(),
            sink.visible_meshes(),
            sink.live_triangles(),
            sink.uploads,
            sink.releases,
            self.queue.pending()
        );
    }

    /// Runs `frames` scripted ticks, then keeps ticking until the stream settles.
    pub fn run(&mut self, frames: u64) -> Summary {
        let t0 = Instant::now();
        for _ in 0..frames {
            self.step();
        }
        self.speed = 0.0;
        let mut extra = 0;
        while !self.manager.is_settled() && extra < SETTLE_TICKS {
            self.step();
            extra += 1;
            if self.manager.pool_stats().workers > 0 {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        self.log_stats();
        let summary = self.summary();
        log::info!(
            "done in {:.2}s: {} ticks, settled={}, {}/{} chunks ready, {} meshes / {} tris, edits ok={} refused={}",
            t0.elapsed().as_secs_f32(),
            summary.ticks,
            summary.settled,
            summary.stream.ready,
            summary.stream.active,
            summary.live_meshes,
            summary.live_triangles,
            summary.edits_ok,
            summary.edits_refused
        );
        summary
    }

    pub fn summary(&self) -> Summary {
        let sink = self.manager.sink();
        Summary {
            ticks: self.queue.now(),
            settled: self.manager.is_settled(),
            stream: self.manager.stats(),
            live_meshes: sink.live_meshes(),
            live_triangles: sink.live_triangles(),
            edits_ok: self.edits_ok,
            edits_refused: self.edits_refused,
        }
    }

    /// Asks for a new visible radius, applied on the next tick.
    pub fn request_radius(&mut self, radius: i32) {
        self.queue.push_after(1, Event::RadiusChanged { radius });
    }

    #[cfg(test)]
    fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    pub fn manager(&self) -> &ChunkManager<HeadlessSink> {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::TerrainConfig;

    fn inline_cfg() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.terrain = TerrainConfig::flat(10);
        cfg.stream.visible_radius = 2;
        cfg.runtime.inline = true;
        cfg
    }

    #[test]
    fn scripted_walk_settles_with_one_mesh_per_chunk() {
        let mut app = App::new(&inline_cfg(), 0.5);
        let s = app.run(200);
        assert!(s.settled);
        assert_eq!(s.stream.active, 13);
        assert_eq!(s.stream.ready, 13);
        assert_eq!(s.live_meshes, 13);
        assert!(s.edits_ok > 0);
        assert!(s.stream.evictions > 0);
        let sink = app.manager().sink();
        assert_eq!(sink.uploads - sink.releases, 13);
    }

    #[test]
    fn queued_radius_and_visibility_events_apply() {
        let mut app = App::new(&inline_cfg(), 0.0);
        app.run(1);
        app.queue_mut().push(Event::RadiusChanged { radius: 3 });
        app.queue_mut().push(Event::VisibilityChanged {
            cx: 0,
            cz: 0,
            visible: false,
        });
        let s = app.run(1);
        assert_eq!(app.manager().visible_radius(), 3);
        assert_eq!(s.live_meshes, 29);
        assert_eq!(app.manager().sink().visible_meshes(), 28);
    }
}

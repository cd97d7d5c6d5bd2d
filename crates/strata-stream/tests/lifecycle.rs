use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_edit::EditSnapshot;
use strata_geom::{Aabb, Vec3};
use strata_mesh_cpu::{ChunkMesh, Face, FaceQuad, MaterialTag, build_chunk_faces};
use strata_runtime::{BuildFn, JobError, MeshJob, Runtime, RuntimeConfig};
use strata_stream::{
    ChunkManager, ChunkState, EditError, RenderSink, StreamConfig, WorldState, desired_chunks,
};
use strata_world::{ChunkCoord, TerrainConfig, TerrainSampler, WorldConfig};

#[derive(Default)]
struct Recording {
    next: u64,
    uploads: Vec<(u64, ChunkMesh)>,
    released: Vec<u64>,
}

impl Recording {
    fn live(&self) -> usize {
        self.uploads.len() - self.released.len()
    }

    fn latest(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        self.uploads
            .iter()
            .rev()
            .find(|(_, m)| m.coord == coord)
            .map(|(_, m)| m)
    }
}

impl RenderSink for Recording {
    type Handle = u64;

    fn upload(&mut self, mesh: ChunkMesh, _visible: bool) -> u64 {
        self.next += 1;
        self.uploads.push((self.next, mesh));
        self.next
    }

    fn release(&mut self, handle: u64) {
        assert!(!self.released.contains(&handle), "double release of {handle}");
        self.released.push(handle);
    }
}

fn manager_with(params: TerrainConfig, radius: i32, inline: bool) -> ChunkManager<Recording> {
    let world = WorldConfig::default();
    let params = Arc::new(params);
    let rt = RuntimeConfig {
        inline,
        ..RuntimeConfig::default()
    };
    let stream = StreamConfig {
        visible_radius: radius,
        ..StreamConfig::default()
    };
    ChunkManager::new(
        WorldState::new(world, params.clone(), 64),
        Runtime::new(world, params, &rt),
        Recording::default(),
        &stream,
    )
}

fn settle(m: &mut ChunkManager<Recording>) {
    let deadline = Instant::now() + Duration::from_secs(30);
    m.tick();
    while !m.is_settled() {
        assert!(Instant::now() < deadline, "stream did not settle");
        m.tick();
        if m.pool_stats().workers > 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

fn chunk_center(c: ChunkCoord) -> Vec3 {
    Vec3::new(c.cx as f32 * 16.0 + 8.0, 30.0, c.cz as f32 * 16.0 + 8.0)
}

#[test]
fn streams_in_nearest_first() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    let stats = m.stats();
    assert_eq!(stats.active, 13);
    assert_eq!(stats.ready, 13);
    assert_eq!(stats.loads_started, 13);
    assert_eq!(m.sink().live(), 13);
    let order: Vec<ChunkCoord> = m.sink().uploads.iter().map(|(_, mesh)| mesh.coord).collect();
    assert_eq!(order, desired_chunks(ChunkCoord::new(0, 0), 2));
}

#[test]
fn update_chunks_twice_is_idempotent() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    let before = m.stats();
    m.update_chunks();
    m.update_chunks();
    // moving inside the same chunk is not a change
    m.update_viewer(Vec3::new(9.0, 20.0, 3.0));
    settle(&mut m);
    assert_eq!(m.stats(), before);
}

#[test]
fn moving_away_evicts_and_releases() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(chunk_center(ChunkCoord::new(0, 0)));
    settle(&mut m);
    m.state_mut().height(3, 3);
    let cached = m.state().height_cache_stats();
    m.update_viewer(chunk_center(ChunkCoord::new(20, 0)));
    settle(&mut m);
    // evicted chunks take their cached heights with them
    let after = m.state().height_cache_stats();
    assert!(after.evictions > cached.evictions);
    m.state_mut().height(3, 3);
    assert_eq!(m.state().height_cache_stats().misses, after.misses + 1);
    let stats = m.stats();
    assert_eq!(stats.evictions, 13);
    assert_eq!(stats.active, 13);
    assert_eq!(m.sink().released.len(), 13);
    assert_eq!(m.sink().live(), 13);
    assert!(m.record(ChunkCoord::new(0, 0)).is_none());
    assert!(m.record(ChunkCoord::new(20, 0)).is_some());
}

#[test]
fn boundary_edit_rebuilds_both_sides() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(chunk_center(ChunkCoord::new(2, 3)));
    settle(&mut m);
    let issued = m.stats().rebuilds_issued;
    // local x = 0 of chunk (2, 3)
    let mut affected = m.remove_block(32, 10, 3 * 16 + 5).unwrap();
    affected.sort();
    assert_eq!(affected, vec![ChunkCoord::new(1, 3), ChunkCoord::new(2, 3)]);
    settle(&mut m);
    assert_eq!(m.stats().rebuilds_issued, issued + 2);
    // the neighbour now shows the wall of the hole
    let left = m.sink().latest(ChunkCoord::new(1, 3)).unwrap();
    let before = 16 * 16 * 2;
    assert_eq!(left.face_count, before + 1);
}

#[test]
fn flat_column_edit_adds_top_and_bottom_faces() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    assert_eq!(m.state_mut().height(5, 5), 10);
    assert!(!m.has_block(5, 11, 5));
    let origin = ChunkCoord::new(0, 0);
    let before = m.record(origin).unwrap().built_version();

    m.set_block(5, 11, 5, true).unwrap();
    assert!(m.has_block(5, 11, 5));
    settle(&mut m);

    let rec = m.record(origin).unwrap();
    assert_eq!(rec.state(), ChunkState::Ready);
    assert!(rec.built_version() > before);
    let mesh = m.sink().latest(origin).unwrap();
    let placed = &mesh.parts[&MaterialTag::Placed];
    assert_eq!(placed.triangle_count(), 12);
    let ys: Vec<f32> = placed.pos.chunks(3).map(|p| p[1]).collect();
    assert!(ys.iter().any(|y| *y == 12.0));
    assert!(ys.iter().any(|y| *y == 11.0));

    let world = WorldConfig::default();
    let mut sampler = TerrainSampler::new(world, Arc::new(TerrainConfig::flat(10)), 4);
    let edits: EditSnapshot = [((5, 11, 5), true)].into_iter().collect();
    let faces = build_chunk_faces(&mut sampler, origin, &edits);
    assert!(faces.contains(&FaceQuad::new(5, 11, 5, Face::PosY)));
    assert!(faces.contains(&FaceQuad::new(5, 11, 5, Face::NegY)));
    let bare = build_chunk_faces(&mut sampler, origin, &EditSnapshot::new());
    assert!(!bare.iter().any(|f| f.y == 11));
}

#[test]
fn placement_policy() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    let body = Aabb::from_feet(Vec3::new(5.5, 11.0, 5.5), 0.6, 1.8);
    assert_eq!(
        m.place_block(5, 11, 5, &body),
        Err(EditError::ObstructedByViewer)
    );
    assert_eq!(
        m.place_block(5, 99, 5, &body),
        Err(EditError::OutOfBounds { y: 99 })
    );
    // touching the viewer's feet is fine
    assert!(m.place_block(5, 10, 6, &body).is_ok());
    assert!(m.remove_block(5, 10, 5).is_ok());
    assert_eq!(m.state().edit_stats().block_edits, 2);
    assert!(m.state().edited_blocks_in_aabb(&Aabb::from_block(5, 10, 6)).len() == 1);
}

#[test]
fn rebuild_of_untracked_chunk_is_a_noop() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    assert!(!m.request_chunk_rebuild(ChunkCoord::new(0, 0)));
    // edits far away are recorded but schedule nothing
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    let issued = m.stats().rebuilds_issued;
    m.set_block(1000, 10, 1000, false).unwrap();
    settle(&mut m);
    assert_eq!(m.stats().rebuilds_issued, issued);
    assert!(!m.has_block(1000, 10, 1000));
}

#[test]
fn radius_changes_are_clamped_and_applied() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    settle(&mut m);
    assert_eq!(m.set_visible_radius(1), 2);
    assert_eq!(m.set_visible_radius(3), 3);
    settle(&mut m);
    assert_eq!(m.stats().active, desired_chunks(ChunkCoord::new(0, 0), 3).len());
    assert_eq!(m.set_visible_radius(2), 2);
    assert_eq!(m.stats().active, 13);
}

#[test]
fn edit_during_load_is_picked_up() {
    let mut m = manager_with(TerrainConfig::flat(10), 2, true);
    m.update_viewer(Vec3::new(8.0, 20.0, 8.0));
    // first tick starts the (0,0) load; its result arrives on the next poll
    m.tick();
    let origin = ChunkCoord::new(0, 0);
    let load_version = m.record(origin).unwrap().pending_version();
    m.set_block(3, 11, 3, true).unwrap();
    settle(&mut m);
    let rec = m.record(origin).unwrap();
    assert!(rec.built_version().unwrap() > load_version);
    assert!(m.sink().latest(origin).unwrap().parts.contains_key(&MaterialTag::Placed));
    assert_eq!(m.stats().ready, 13);
}

#[test]
fn failed_load_stays_pending_without_retry() {
    let world = WorldConfig::default();
    let params = Arc::new(TerrainConfig::flat(10));
    let broken = ChunkCoord::new(0, 0);
    let build: BuildFn = Arc::new(
        move |s: &mut TerrainSampler, job: &MeshJob| -> Result<Vec<FaceQuad>, JobError> {
            if job.coord == broken {
                Err(JobError::Failed("generator offline".to_string()))
            } else {
                Ok(build_chunk_faces(s, job.coord, &job.edits))
            }
        },
    );
    let rt = RuntimeConfig {
        inline: true,
        ..RuntimeConfig::default()
    };
    let stream = StreamConfig {
        visible_radius: 2,
        ..StreamConfig::default()
    };
    let mut m = ChunkManager::new(
        WorldState::new(world, params.clone(), 64),
        Runtime::with_build_fn(world, params, &rt, build),
        Recording::default(),
        &stream,
    );
    m.update_viewer(chunk_center(broken));
    settle(&mut m);

    let rec = m.record(broken).unwrap();
    assert_eq!(rec.state(), ChunkState::Pending);
    assert!(rec.handle().is_none());
    assert!(rec.bbox().is_none());
    let stats = m.stats();
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.ready, 12);
    assert_eq!(stats.loads_started, 13);

    m.update_chunks();
    settle(&mut m);
    assert_eq!(m.stats().loads_started, 13);
    assert_eq!(m.stats().failures, 1);
    assert!(m.sink().latest(broken).is_none());
}

#[test]
fn real_pool_streams_normal_terrain() {
    let mut m = manager_with(TerrainConfig::default(), 2, false);
    assert!(m.pool_stats().workers >= 2);
    m.update_viewer(Vec3::new(8.0, 40.0, 8.0));
    settle(&mut m);
    assert_eq!(m.stats().ready, 13);
    let ground = m.state_mut().ground_height(8, 8);
    m.set_block(8, ground.min(63), 8, true).unwrap();
    settle(&mut m);
    assert!(m.stats().rebuilds_issued >= 1);
    for rec in m.records() {
        assert_eq!(rec.state(), ChunkState::Ready);
        assert!(rec.bbox().is_some());
    }
    let untagged = m
        .sink()
        .latest(ChunkCoord::new(0, 0))
        .unwrap()
        .parts
        .keys()
        .all(|t| *t == MaterialTag::Untagged);
    assert!(untagged);
}

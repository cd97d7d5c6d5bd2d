//! Procedural terrain height: base hills, gated mountains and carved rivers.

use std::sync::Arc;

use crate::noise::SimplexNoise;
use crate::worldgen::{TerrainConfig, TerrainMode};
use crate::WorldConfig;

#[derive(Clone, Debug)]
pub struct HeightModel {
    noise: SimplexNoise,
    params: Arc<TerrainConfig>,
    world_height: i32,
}

impl HeightModel {
    pub fn new(world: &WorldConfig, params: Arc<TerrainConfig>) -> Self {
        Self {
            noise: SimplexNoise::new(world.seed),
            params,
            world_height: world.world_height,
        }
    }

    /// Height of the topmost natural block in column `(x, z)`, in `[0, world_height - 1]`.
    pub fn compute_height(&self, x: i32, z: i32) -> i32 {
        let top = (self.world_height - 1).max(0);
        if self.params.mode == TerrainMode::Flat {
            return self.params.flat.height.clamp(0, top);
        }
        let h = self.raw_height(f64::from(x), f64::from(z));
        (h.floor() as i64).clamp(0, i64::from(top)) as i32
    }

    fn raw_height(&self, x: f64, z: f64) -> f64 {
        let n = &self.noise;
        let base = &self.params.base;
        let mut h = base.baseline + base.bias;
        h += n.noise2d(x * base.broad_frequency, z * base.broad_frequency) * base.broad_weight;
        h += n.noise2d(
            x * base.fine_frequency + base.fine_offset,
            z * base.fine_frequency + base.fine_offset,
        ) * base.fine_weight;

        let m = &self.params.mountains;
        let gate = n.noise2d(x * m.frequency + m.offset, z * m.frequency + m.offset);
        if gate > m.threshold {
            let t = ((gate - m.threshold) / (1.0 - m.threshold)).clamp(0.0, 1.0);
            let cliff = t.powf(m.exponent);
            h += cliff * m.height;
            h += n.noise2d(x * m.detail_frequency, z * m.detail_frequency) * m.detail_weight * t;
        }

        let r = &self.params.rivers;
        let band = n
            .noise2d(x * r.frequency + r.offset, z * r.frequency + r.offset)
            .abs();
        if band < r.band {
            let t = 1.0 - band / r.band;
            let jitter = n.noise2d(x * r.jitter_frequency, z * r.jitter_frequency) * r.jitter;
            h -= t.powf(r.exponent) * r.depth + jitter;
        }
        h
    }
}

use serde::Deserialize;

/// `[runtime]` section: worker pool sizing and throttle thresholds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default = "default_min_workers")]
    pub min_workers: usize,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_slow_ms")]
    pub slow_ms: u32,
    #[serde(default = "default_fast_ms")]
    pub fast_ms: u32,
    /// Build on the coordinating thread instead of the pool.
    #[serde(default)]
    pub inline: bool,
    #[serde(default = "default_height_cache_chunks")]
    pub height_cache_chunks: usize,
}

fn default_min_workers() -> usize {
    2
}
fn default_max_workers() -> usize {
    6
}
fn default_window() -> usize {
    23
}
fn default_slow_ms() -> u32 {
    70
}
fn default_fast_ms() -> u32 {
    30
}
fn default_height_cache_chunks() -> usize {
    256
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            min_workers: default_min_workers(),
            max_workers: default_max_workers(),
            window: default_window(),
            slow_ms: default_slow_ms(),
            fast_ms: default_fast_ms(),
            inline: false,
            height_cache_chunks: default_height_cache_chunks(),
        }
    }
}

impl RuntimeConfig {
    /// Hardware concurrency clamped to `[min_workers, max_workers]`.
    pub fn pool_size(&self) -> usize {
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(self.min_workers);
        self.clamp_workers(hw)
    }

    pub fn clamp_workers(&self, n: usize) -> usize {
        let lo = self.min_workers.max(1);
        let hi = self.max_workers.max(lo);
        n.clamp(lo, hi)
    }
}

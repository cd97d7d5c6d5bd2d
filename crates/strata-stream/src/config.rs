use serde::Deserialize;

/// `[stream]` section: how far around the viewer chunks are kept.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StreamConfig {
    #[serde(default = "default_visible_radius")]
    pub visible_radius: i32,
    #[serde(default = "default_min_radius")]
    pub min_radius: i32,
    #[serde(default = "default_max_radius")]
    pub max_radius: i32,
}

fn default_visible_radius() -> i32 {
    6
}
fn default_min_radius() -> i32 {
    2
}
fn default_max_radius() -> i32 {
    16
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            visible_radius: default_visible_radius(),
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
        }
    }
}

impl StreamConfig {
    pub fn clamp_radius(&self, r: i32) -> i32 {
        let lo = self.min_radius.max(0);
        r.clamp(lo, self.max_radius.max(lo))
    }
}

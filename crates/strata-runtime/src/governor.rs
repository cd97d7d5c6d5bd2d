use std::collections::VecDeque;

/// Lowest concurrency limit the governor will step down to.
pub const LIMIT_FLOOR: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Decreased { from: usize, to: usize },
    Increased { from: usize, to: usize },
}

/// Threshold-hysteresis control over how many jobs may be outstanding.
///
/// Keeps the last `window` job durations. Once the window is full its mean
/// is compared against `slow_ms` and `fast_ms`; the limit moves one step and
/// the window starts over. Means between the thresholds hold the limit.
#[derive(Clone, Debug)]
pub struct ConcurrencyGovernor {
    samples: VecDeque<u32>,
    window: usize,
    slow_ms: u32,
    fast_ms: u32,
    floor: usize,
    ceiling: usize,
    limit: usize,
}

impl ConcurrencyGovernor {
    /// Starts at `ceiling`, the pool size.
    pub fn new(ceiling: usize, window: usize, slow_ms: u32, fast_ms: u32) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            samples: VecDeque::with_capacity(window.max(1)),
            window: window.max(1),
            slow_ms,
            fast_ms,
            floor: LIMIT_FLOOR.min(ceiling),
            ceiling,
            limit: ceiling,
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn bounds(&self) -> (usize, usize) {
        (self.floor, self.ceiling)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn average_ms(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().map(|&s| u64::from(s)).sum();
        Some(sum as f32 / self.samples.len() as f32)
    }

    /// Feeds one completed job's duration.
    pub fn record(&mut self, duration_ms: u32) -> Option<Adjustment> {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(duration_ms);
        if self.samples.len() < self.window {
            return None;
        }
        let avg = self.average_ms()?;
        let from = self.limit;
        let adj = if avg > self.slow_ms as f32 && self.limit > self.floor {
            self.limit -= 1;
            Adjustment::Decreased { from, to: self.limit }
        } else if avg < self.fast_ms as f32 && self.limit < self.ceiling {
            self.limit += 1;
            Adjustment::Increased { from, to: self.limit }
        } else {
            return None;
        };
        self.samples.clear();
        Some(adj)
    }
}

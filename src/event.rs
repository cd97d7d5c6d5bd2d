use std::collections::{BTreeMap, VecDeque};

use strata_geom::Vec3;

pub enum Event {
    Tick,

    // Viewer
    ViewerMoved { pos: Vec3 },
    RadiusChanged { radius: i32 },

    // Edit intents
    PlaceRequested { x: i32, y: i32, z: i32 },
    RemoveRequested { x: i32, y: i32, z: i32 },

    // Presentation
    VisibilityChanged { cx: i32, cz: i32, visible: bool },
}

pub struct EventEnvelope {
    /// Order of submission across all ticks.
    pub seq: u64,
    pub tick: u64,
    pub kind: Event,
}

/// Driver intents bucketed by the tick they are due on, FIFO within a tick.
#[derive(Default)]
pub struct EventQueue {
    due: BTreeMap<u64, VecDeque<EventEnvelope>>,
    now: u64,
    submitted: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queues `kind` for the current tick.
    pub fn push(&mut self, kind: Event) {
        self.push_after(0, kind);
    }

    pub fn push_after(&mut self, delay: u64, kind: Event) {
        let tick = self.now + delay;
        self.submitted += 1;
        let env = EventEnvelope {
            seq: self.submitted,
            tick,
            kind,
        };
        self.due.entry(tick).or_default().push_back(env);
    }

    /// Next event due this tick; the tick's bucket goes once it is drained.
    pub fn pop_ready(&mut self) -> Option<EventEnvelope> {
        let bucket = self.due.get_mut(&self.now)?;
        let env = bucket.pop_front();
        if bucket.is_empty() {
            self.due.remove(&self.now);
        }
        env
    }

    pub fn pending(&self) -> usize {
        self.due.values().map(VecDeque::len).sum()
    }

    pub fn end_tick(&mut self) {
        self.now += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(env: &EventEnvelope) -> i32 {
        match env.kind {
            Event::RadiusChanged { radius } => radius,
            _ => -1,
        }
    }

    #[test]
    fn events_wait_for_their_tick_in_fifo_order() {
        let mut q = EventQueue::new();
        q.push_after(1, Event::RadiusChanged { radius: 3 });
        q.push(Event::RadiusChanged { radius: 1 });
        q.push(Event::RadiusChanged { radius: 2 });
        assert_eq!(q.pending(), 3);
        assert_eq!(q.pop_ready().map(|e| tag(&e)), Some(1));
        assert_eq!(q.pop_ready().map(|e| tag(&e)), Some(2));
        assert!(q.pop_ready().is_none());
        q.end_tick();
        let env = q.pop_ready().unwrap();
        assert_eq!((tag(&env), env.tick, env.seq), (3, 1, 1));
        q.end_tick();
        assert_eq!(q.pending(), 0);
        assert_eq!(q.now(), 2);
    }
}

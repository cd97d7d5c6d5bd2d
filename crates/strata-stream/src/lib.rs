//! Chunk streaming: world state, the edit write path and per-chunk lifecycle.
#![forbid(unsafe_code)]

mod config;
mod error;
mod manager;
mod record;
mod sink;
mod state;

pub use config::StreamConfig;
pub use error::EditError;
pub use manager::{ChunkManager, StreamStats, desired_chunks};
pub use record::{ChunkRecord, ChunkState, Renderable};
pub use sink::RenderSink;
pub use state::WorldState;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

mod app;
mod config;
mod event;
mod headless;

use crate::app::App;
use crate::config::{AppConfig, load_app_config};

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Headless voxel chunk streaming driver")]
struct Args {
    /// Path to strata.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Terrain-only TOML, replacing the [terrain] section
    #[arg(long)]
    terrain: Option<PathBuf>,

    #[arg(long)]
    seed: Option<i32>,

    /// Visible radius in chunks (clamped to the configured range)
    #[arg(long)]
    radius: Option<i32>,

    /// Scripted ticks to run before waiting for the stream to settle
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Viewer speed in blocks per tick
    #[arg(long, default_value_t = 0.25)]
    speed: f32,

    /// Mesh on the coordinating thread instead of the worker pool
    #[arg(long)]
    inline: bool,
}

fn resolve_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => load_app_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(path) = &args.terrain {
        cfg.terrain = strata_world::load_terrain_config(path)?;
    }
    if let Some(seed) = args.seed {
        cfg.world.seed = seed;
    }
    if args.inline {
        cfg.runtime.inline = true;
    }
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = resolve_config(&args)?;
    log::info!(
        "seed {} chunk {}x{} mode {:?}",
        cfg.world.seed,
        cfg.world.chunk_side,
        cfg.world.world_height,
        cfg.terrain.mode
    );
    let mut app = App::new(&cfg, args.speed);
    if let Some(r) = args.radius {
        app.request_radius(r);
    }
    let summary = app.run(args.frames);
    if !summary.settled {
        log::warn!("stream still busy after {} ticks", summary.ticks);
    }
    let pool = app.manager().pool_stats();
    log::info!(
        "pool: {} workers, limit {}, completed {} failed {} skipped {}",
        pool.workers,
        pool.limit,
        pool.completed,
        pool.failed,
        pool.skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_file_values() {
        let args = Args::parse_from([
            "strata", "--seed", "9", "--radius", "40", "--inline", "--frames", "5",
        ]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.world.seed, 9);
        assert!(cfg.runtime.inline);
        assert_eq!(args.frames, 5);
        assert_eq!(args.radius, Some(40));

        let mut app = App::new(&cfg, 0.0);
        app.request_radius(40);
        app.step();
        app.step();
        assert_eq!(app.manager().visible_radius(), 16);
    }
}

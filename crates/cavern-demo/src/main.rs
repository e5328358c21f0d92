//! Demo binary: generate one cave from `config.ron` and report what was built.
//!
//! Run with `cargo run -p cavern-demo`.
//! Run with `cargo run -p cavern-demo -- --seed 42 --tunnels 5` to pin the shape.

use cavern_config::{CliArgs, Config, default_config_dir};
use cavern_mesh::CaveMesh;
use cavern_terrain::{DecorKind, VoxelCaveGenerator, cave_rng};
use clap::Parser;
use tracing::{info, warn};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    cavern_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(config_dir = %config_dir.display(), "cavern demo starting");

    let mut mesh = CaveMesh::new();
    let outcome = config.bootstrap().run(&chrono::Utc::now(), &mut mesh);
    let stats = outcome.result.stats;
    info!(
        seed = outcome.params.seed,
        rings = stats.rings,
        segments = stats.segments,
        vertices = stats.vertices,
        triangles = stats.triangles,
        tunnels = stats.tunnels,
        cut_sectors = stats.cut_sectors,
        "cave ready"
    );

    let vertex_bytes = mesh.vertex_bytes().len();
    let index_bytes = mesh.index_bytes().len();
    info!(
        vertex_bytes,
        index_bytes,
        u32_indices = stats.u32_indices,
        "gpu buffers"
    );

    let count = |kind: DecorKind| outcome.result.decor.iter().filter(|d| d.kind == kind).count();
    info!(
        waterfalls = count(DecorKind::Waterfall),
        vines = count(DecorKind::Vine),
        roots = count(DecorKind::Root),
        "decor placed"
    );

    match outcome.spawn_point {
        Some(p) => info!(x = p.x, y = p.y, z = p.z, "spawn point"),
        None => warn!("no spawn point"),
    }

    if config.voxel.enabled {
        let generator = VoxelCaveGenerator::new(config.voxel.params.clone());
        let voxel = generator.generate(&mut cave_rng(outcome.params.seed));
        let [sx, sy, sz] = voxel.grid.dims();
        let solid = voxel.grid.solid_count();
        let fill = solid as f64 / (sx * sy * sz) as f64;
        info!(solid, fill, "voxel cave ready");
    }
}

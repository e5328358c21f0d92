//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Cave generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cavern", about = "Procedural cave generator")]
pub struct CliArgs {
    /// Fixed seed. Turns time seeding off.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Derive the seed from the current time.
    #[arg(long)]
    pub time_seed: Option<bool>,

    /// Number of branch tunnels. Disables the reference shape and time-band modulation.
    #[arg(long)]
    pub tunnels: Option<u32>,

    /// Shaft depth in meters. Disables the reference shape.
    #[arg(long)]
    pub depth: Option<f32>,

    /// Angular segments per shaft ring. Disables the reference shape.
    #[arg(long)]
    pub segments: Option<u32>,

    /// Also run the cellular-automata voxel generator.
    #[arg(long)]
    pub voxel: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.seed = seed;
            self.bootstrap.use_time_seed = false;
        }
        if let Some(time_seed) = args.time_seed {
            self.bootstrap.use_time_seed = time_seed;
        }
        if let Some(count) = args.tunnels {
            self.tunnels.count = count;
            self.bootstrap.apply_reference_shape = false;
            self.bootstrap.modulate_params = false;
        }
        if let Some(depth) = args.depth {
            self.shaft.depth = depth;
            self.bootstrap.apply_reference_shape = false;
        }
        if let Some(segments) = args.segments {
            self.shaft.segments_around = segments;
            self.bootstrap.apply_reference_shape = false;
        }
        if let Some(voxel) = args.voxel {
            self.voxel.enabled = voxel;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

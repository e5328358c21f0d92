//! Procedural cave generation: cellular-automata voxel caves and ring-swept
//! vertical shafts with branch tunnels.

pub mod automata;
pub mod bootstrap;
pub mod cave;
pub mod decor;
pub mod density;
pub mod fbm;
pub mod seed;
pub mod shaft;
pub mod tunnel;
pub mod voxel_cave;

pub use automata::{
    AutomataRule, BoundaryMode, OutsideCells, SmoothRegion, SmoothingPolicy, VoxelGrid,
};
pub use bootstrap::{BootstrapOutcome, BootstrapParams, CaveBootstrap, spawn_at_top};
pub use cave::{CaveParams, CaveResult, CaveStats, VerticalCaveGenerator};
pub use decor::{DecorKind, DecorKinds, DecorParams, DecorPlacement};
pub use density::{DensityField, DensitySampler, DensitySource};
pub use fbm::Fbm;
pub use seed::{TimeSeed, cave_rng, time_seed};
pub use shaft::{CutMask, ShaftLayout, ShaftParams};
pub use tunnel::{Tunnel, TunnelParams};
pub use voxel_cave::{Entrance, VoxelCave, VoxelCaveGenerator, VoxelCaveParams};

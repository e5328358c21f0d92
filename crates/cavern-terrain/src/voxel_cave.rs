//! Voxel cave generator: random fill, optional tunnel walk, cellular-automata
//! smoothing, then conversion to a density field.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::automata::{
    AutomataRule, BoundaryMode, OutsideCells, SmoothRegion, SmoothingPolicy, VoxelGrid,
};
use crate::density::DensityField;

/// Spherical opening cut after smoothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub center: [i64; 3],
    pub radius: i64,
}

/// Parameters for [`VoxelCaveGenerator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelCaveParams {
    /// Grid dimensions along x, y, z. Clamped to at least 1.
    pub size: [usize; 3],
    /// Probability that a cell starts solid.
    pub fill_probability: f32,
    /// Fixed number of smoothing steps.
    pub iterations: u32,
    pub boundary: BoundaryMode,
    pub smoothing: SmoothingPolicy,
    /// Length of the random walk dug before smoothing. 0 disables it.
    pub random_walk_steps: u32,
    /// Swap solid and empty after smoothing.
    pub invert: bool,
    pub entrance: Option<Entrance>,
}

impl Default for VoxelCaveParams {
    fn default() -> Self {
        Self {
            size: [50, 50, 50],
            fill_probability: 0.45,
            iterations: 5,
            boundary: BoundaryMode::Open,
            smoothing: SmoothingPolicy::default(),
            random_walk_steps: 0,
            invert: false,
            entrance: None,
        }
    }
}

impl VoxelCaveParams {
    /// Walled-in grid with a dug walk, 13-of-26 smoothing of the interior
    /// with the border emptied, inversion (which turns the border into a
    /// solid outer wall) and an entrance near the top.
    pub fn majority_walk() -> Self {
        let size = [30, 15, 30];
        Self {
            size,
            fill_probability: 0.45,
            iterations: 3,
            boundary: BoundaryMode::SolidShell,
            smoothing: SmoothingPolicy {
                rule: AutomataRule::MAJORITY,
                region: SmoothRegion::InteriorClearBorder,
                outside: OutsideCells::Wall,
            },
            random_walk_steps: 1000,
            invert: true,
            entrance: Some(Entrance {
                center: [size[0] as i64 / 2, size[1] as i64 - 3, size[2] as i64 / 2],
                radius: 5,
            }),
        }
    }
}

/// Output of a voxel generation pass.
#[derive(Clone, Debug)]
pub struct VoxelCave {
    pub grid: VoxelGrid,
    pub density: DensityField,
}

/// Generates voxel caves from [`VoxelCaveParams`].
pub struct VoxelCaveGenerator {
    params: VoxelCaveParams,
}

impl VoxelCaveGenerator {
    pub fn new(params: VoxelCaveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &VoxelCaveParams {
        &self.params
    }

    /// Run one full generation pass.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> VoxelCave {
        let p = &self.params;
        let mut grid = VoxelGrid::random_fill(p.size, p.fill_probability, p.boundary, rng);
        debug!(solid = grid.solid_count(), "voxel grid filled");

        if p.random_walk_steps > 0 {
            grid.random_walk(p.random_walk_steps, rng);
        }

        grid.smooth(&p.smoothing, p.iterations);

        if p.invert {
            grid.invert();
        }
        if let Some(entrance) = p.entrance {
            grid.carve_sphere(entrance.center, entrance.radius);
        }

        let density = DensityField::from_grid(&grid);
        let [sx, sy, sz] = grid.dims();
        info!(
            size_x = sx,
            size_y = sy,
            size_z = sz,
            solid = grid.solid_count(),
            iterations = p.iterations,
            "voxel cave generated"
        );
        VoxelCave { grid, density }
    }
}

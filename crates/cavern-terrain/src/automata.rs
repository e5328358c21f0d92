//! 3D cellular-automata cave smoothing over a boolean voxel grid.
//!
//! A grid is seeded with random walls, then repeatedly rebuilt from each
//! cell's 26-neighborhood wall count. Each iteration writes a fresh grid and
//! swaps it in, so every cell sees the previous generation only.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rule deciding a cell's next state from its wall count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomataRule {
    /// Solid cells stay solid with at least `survive` walls around them;
    /// empty cells turn solid with at least `birth` walls.
    BirthSurvival { survive: u8, birth: u8 },
    /// More than `threshold` walls makes a cell solid, fewer makes it empty,
    /// exactly `threshold` keeps its state.
    Majority { threshold: u8 },
}

impl AutomataRule {
    /// The 4/5 rule.
    pub const BIRTH_SURVIVAL: Self = Self::BirthSurvival {
        survive: 4,
        birth: 5,
    };
    /// The 13-of-26 rule.
    pub const MAJORITY: Self = Self::Majority { threshold: 13 };

    /// Next state for a cell.
    pub fn next(self, solid: bool, walls: u8) -> bool {
        match self {
            Self::BirthSurvival { survive, birth } => {
                if solid {
                    walls >= survive
                } else {
                    walls >= birth
                }
            }
            Self::Majority { threshold } => {
                if walls > threshold {
                    true
                } else if walls < threshold {
                    false
                } else {
                    solid
                }
            }
        }
    }
}

impl Default for AutomataRule {
    fn default() -> Self {
        Self::BIRTH_SURVIVAL
    }
}

/// How the outer layer of cells is seeded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Every cell is random.
    #[default]
    Open,
    /// Cells on the grid faces are forced solid.
    SolidShell,
}

/// Which cells a smoothing step recomputes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothRegion {
    #[default]
    All,
    /// Only cells whose whole neighborhood lies inside the grid; border
    /// cells keep their state.
    Interior,
    /// Like `Interior`, but border cells are emptied every step.
    InteriorClearBorder,
}

/// What a neighbor outside the grid counts as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutsideCells {
    #[default]
    Wall,
    Empty,
}

/// Everything that shapes one smoothing step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingPolicy {
    pub rule: AutomataRule,
    pub region: SmoothRegion,
    pub outside: OutsideCells,
}

/// Dense 3D boolean grid, `true` = solid. Indexed x-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    dims: [usize; 3],
    cells: Vec<bool>,
}

impl VoxelGrid {
    /// All-empty grid. Each dimension is clamped to at least 1.
    pub fn empty(dims: [usize; 3]) -> Self {
        let dims = dims.map(|d| d.max(1));
        Self {
            dims,
            cells: vec![false; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Fill every cell independently with probability `fill_probability`.
    pub fn random_fill<R: Rng + ?Sized>(
        dims: [usize; 3],
        fill_probability: f32,
        boundary: BoundaryMode,
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::empty(dims);
        let p = fill_probability.clamp(0.0, 1.0);
        let [sx, sy, sz] = grid.dims;
        for x in 0..sx {
            for y in 0..sy {
                for z in 0..sz {
                    let solid = if boundary == BoundaryMode::SolidShell && grid.is_border(x, y, z)
                    {
                        true
                    } else {
                        rng.random::<f32>() < p
                    };
                    grid.set(x, y, z, solid);
                }
            }
        }
        grid
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Cells in x-major order.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    /// Cell state. Panics if out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[self.index(x, y, z)]
    }

    /// Cell state for signed coordinates, `None` outside the grid.
    pub fn get_signed(&self, x: i64, y: i64, z: i64) -> Option<bool> {
        let [sx, sy, sz] = self.dims;
        if x < 0 || y < 0 || z < 0 || x as usize >= sx || y as usize >= sy || z as usize >= sz {
            return None;
        }
        Some(self.get(x as usize, y as usize, z as usize))
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, solid: bool) {
        let i = self.index(x, y, z);
        self.cells[i] = solid;
    }

    /// Whether the cell lies on a face of the grid.
    pub fn is_border(&self, x: usize, y: usize, z: usize) -> bool {
        let [sx, sy, sz] = self.dims;
        x == 0 || y == 0 || z == 0 || x + 1 == sx || y + 1 == sy || z + 1 == sz
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Walls among the 26 neighbors of a cell.
    pub fn wall_count(&self, x: usize, y: usize, z: usize, outside: OutsideCells) -> u8 {
        let mut walls = 0;
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let solid = self
                        .get_signed(x as i64 + dx, y as i64 + dy, z as i64 + dz)
                        .unwrap_or(outside == OutsideCells::Wall);
                    if solid {
                        walls += 1;
                    }
                }
            }
        }
        walls
    }

    /// Compute the next generation without modifying `self`.
    pub fn next_generation(&self, policy: &SmoothingPolicy) -> VoxelGrid {
        let mut next = VoxelGrid {
            dims: self.dims,
            cells: vec![false; self.cells.len()],
        };
        let [sx, sy, sz] = self.dims;
        for x in 0..sx {
            for y in 0..sy {
                for z in 0..sz {
                    let current = self.get(x, y, z);
                    let state = match policy.region {
                        SmoothRegion::Interior if self.is_border(x, y, z) => current,
                        SmoothRegion::InteriorClearBorder if self.is_border(x, y, z) => false,
                        _ => policy
                            .rule
                            .next(current, self.wall_count(x, y, z, policy.outside)),
                    };
                    next.set(x, y, z, state);
                }
            }
        }
        next
    }

    /// Replace the grid with its next generation.
    pub fn step(&mut self, policy: &SmoothingPolicy) {
        *self = self.next_generation(policy);
    }

    /// Run a fixed number of steps. No convergence check.
    pub fn smooth(&mut self, policy: &SmoothingPolicy, iterations: u32) {
        for _ in 0..iterations {
            self.step(policy);
        }
    }

    /// Dig a 6-connected random walk from the grid center.
    ///
    /// Each visited cell becomes empty. Moves that would enter the outer
    /// layer are skipped, so a solid shell stays intact.
    pub fn random_walk<R: Rng + ?Sized>(&mut self, steps: u32, rng: &mut R) {
        let [sx, sy, sz] = self.dims;
        let (mut x, mut y, mut z) = (sx / 2, sy / 2, sz / 2);
        for _ in 0..steps {
            self.set(x, y, z, false);
            match rng.random_range(0..6) {
                0 if x + 2 < sx => x += 1,
                1 if x > 1 => x -= 1,
                2 if y + 2 < sy => y += 1,
                3 if y > 1 => y -= 1,
                4 if z + 2 < sz => z += 1,
                5 if z > 1 => z -= 1,
                _ => {}
            }
        }
    }

    /// Empty every cell within `radius` of `center` (Euclidean, inclusive).
    pub fn carve_sphere(&mut self, center: [i64; 3], radius: i64) {
        let r = radius.max(0);
        for x in center[0] - r..=center[0] + r {
            for y in center[1] - r..=center[1] + r {
                for z in center[2] - r..=center[2] + r {
                    if self.get_signed(x, y, z).is_none() {
                        continue;
                    }
                    let (dx, dy, dz) = (x - center[0], y - center[1], z - center[2]);
                    if dx * dx + dy * dy + dz * dz <= r * r {
                        self.set(x as usize, y as usize, z as usize, false);
                    }
                }
            }
        }
    }

    /// Swap solid and empty everywhere.
    pub fn invert(&mut self) {
        for c in &mut self.cells {
            *c = !*c;
        }
    }
}

//! Wall decor placement along the shaft: waterfalls on steep walls, hanging
//! vines and protruding roots.
//!
//! Placement only produces descriptors; spawning the actual props is up to the
//! caller.

use cavern_mesh::CaveMesh;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::shaft::{ShaftLayout, finite_or};

/// Minimum angle from vertical, in radians, for a wall to hold a waterfall.
pub const STEEP_ANGLE: f32 = 20.0 * std::f32::consts::PI / 180.0;

/// Which decor kinds are available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorKinds {
    pub waterfalls: bool,
    pub vines: bool,
    pub roots: bool,
}

impl Default for DecorKinds {
    fn default() -> Self {
        Self {
            waterfalls: true,
            vines: true,
            roots: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorParams {
    /// Chance per ring of a decor attempt. 0 disables decor.
    pub density: f32,
    pub kinds: DecorKinds,
}

impl Default for DecorParams {
    fn default() -> Self {
        Self {
            density: 0.2,
            kinds: DecorKinds::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorKind {
    Waterfall,
    Vine,
    Root,
}

/// One decor item to spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorPlacement {
    pub kind: DecorKind,
    pub position: Vec3,
    /// Direction the item faces (waterfall, root) or hangs (vine).
    pub direction: Vec3,
    pub scale: f32,
}

fn is_steep(mesh: &CaveMesh, layout: &ShaftLayout, ring: usize, sector: usize, p: Vec3) -> bool {
    if ring + 2 >= layout.rings {
        return false;
    }
    let Some(&below) = mesh.positions.get(layout.vertex_index(ring + 2, sector)) else {
        return false;
    };
    let dir = (below - p).normalize_or_zero();
    dir != Vec3::ZERO && dir.angle_between(Vec3::Y) > STEEP_ANGLE
}

/// Roll decor for every ring of a swept shaft.
pub fn place_decor<R: Rng + ?Sized>(
    mesh: &CaveMesh,
    layout: &ShaftLayout,
    params: &DecorParams,
    rng: &mut R,
) -> Vec<DecorPlacement> {
    let density = finite_or(params.density, 0.0);
    if density <= 0.0 {
        return Vec::new();
    }
    let kinds = params.kinds;
    let mut placements = Vec::new();

    for ring in 0..layout.rings {
        if rng.random::<f32>() > density {
            continue;
        }
        let sector = rng.random_range(0..layout.segments);
        let Some(&p) = mesh.positions.get(layout.vertex_index(ring, sector)) else {
            continue;
        };
        let steep = is_steep(mesh, layout, ring, sector, p);

        let roll = rng.random::<f32>();
        let placement = if kinds.waterfalls && steep && roll < 0.25 {
            DecorPlacement {
                kind: DecorKind::Waterfall,
                position: p + Vec3::Y * 0.5,
                direction: (-p).normalize_or_zero(),
                scale: 1.0 + rng.random::<f32>(),
            }
        } else if kinds.vines && roll < 0.6 {
            DecorPlacement {
                kind: DecorKind::Vine,
                position: p + Vec3::NEG_Y * 0.2,
                direction: Vec3::NEG_Y,
                scale: 0.7 + rng.random::<f32>() * 1.2,
            }
        } else if kinds.roots {
            DecorPlacement {
                kind: DecorKind::Root,
                position: p,
                direction: p.with_y(0.0).normalize_or_zero(),
                scale: 0.8 + rng.random::<f32>() * 1.4,
            }
        } else {
            continue;
        };
        placements.push(placement);
    }

    tracing::debug!(count = placements.len(), "decor placed");
    placements
}

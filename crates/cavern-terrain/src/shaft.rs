//! Vertical shaft sweep: circular cross-sections ("rings") stacked along a
//! meandering, descending centerline and stitched into an inward-facing tube.
//!
//! Ring `r` sits at depth fraction `t = r / (rings - 1)`. Each ring holds
//! `segments + 1` vertices; the last one repeats the first angle so the UV
//! seam can wrap from `u = 1` back to `u = 0`.

use std::f32::consts::{FRAC_PI_2, TAU};

use cavern_mesh::CaveMesh;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fbm::Fbm;
use crate::seed::{det_cos, det_sin};

/// Fewest angular segments a shaft ring may have.
pub const MIN_SEGMENTS: u32 = 8;
/// Smallest vertical distance between rings, in meters.
pub const MIN_RING_SPACING: f32 = 0.2;
/// Smallest wall radius after noise.
pub const MIN_RADIUS: f32 = 0.5;
/// Smallest wall radius at a ledge.
pub const MIN_LEDGE_RADIUS: f32 = 0.4;
/// Deepest shaft, in meters. Also caps the ring spacing.
pub const MAX_DEPTH: f32 = 10_000.0;

/// Parameters of the main shaft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaftParams {
    /// Vertical extent in meters (downwards from y = 0).
    pub depth: f32,
    /// Vertical step between rings.
    pub meters_per_ring: f32,
    /// Angular samples per ring.
    pub segments_around: u32,
    pub radius_top: f32,
    pub radius_bottom: f32,
    /// How far the centerline wanders in XZ.
    pub path_amplitude: f32,
    pub path_freq: f32,
    /// Amplitude of the angular radius noise.
    pub radius_noise_amp: f32,
    pub radius_noise_freq: f32,
    /// Amplitude of the per-depth step noise.
    pub vertical_ruggedness: f32,
    /// Blend of the vertex normal from radial (0) towards vertical (1).
    pub normal_smoothing: f32,
    /// Chance per ring of a ledge.
    pub ledge_chance: f32,
    /// How far a ledge protrudes into the shaft.
    pub ledge_size: f32,
    /// Chance per ring of an alcove.
    pub alcove_chance: f32,
    /// Half-width of an alcove, in segments.
    pub alcove_width_segs: u32,
    /// Opening cut into the top ring around angle 0, in degrees.
    pub top_mouth_arc_deg: Option<f32>,
}

impl Default for ShaftParams {
    fn default() -> Self {
        Self {
            depth: 160.0,
            meters_per_ring: 1.0,
            segments_around: 64,
            radius_top: 6.0,
            radius_bottom: 10.0,
            path_amplitude: 6.0,
            path_freq: 0.08,
            radius_noise_amp: 1.4,
            radius_noise_freq: 0.35,
            vertical_ruggedness: 0.6,
            normal_smoothing: 0.35,
            ledge_chance: 0.18,
            ledge_size: 1.0,
            alcove_chance: 0.12,
            alcove_width_segs: 3,
            top_mouth_arc_deg: None,
        }
    }
}

impl ShaftParams {
    /// Copy with every value clamped into its usable range.
    pub fn sanitized(&self) -> Self {
        let meters_per_ring =
            finite_or(self.meters_per_ring, 1.0).clamp(MIN_RING_SPACING, MAX_DEPTH);
        Self {
            depth: finite_or(self.depth, 0.0).clamp(meters_per_ring, MAX_DEPTH),
            meters_per_ring,
            segments_around: self.segments_around.max(MIN_SEGMENTS),
            radius_top: finite_or(self.radius_top, MIN_RADIUS).max(MIN_RADIUS),
            radius_bottom: finite_or(self.radius_bottom, MIN_RADIUS).max(MIN_RADIUS),
            path_amplitude: finite_or(self.path_amplitude, 0.0).max(0.0),
            path_freq: finite_or(self.path_freq, 0.0).max(0.0),
            radius_noise_amp: finite_or(self.radius_noise_amp, 0.0).max(0.0),
            radius_noise_freq: finite_or(self.radius_noise_freq, 0.0).max(0.0),
            vertical_ruggedness: finite_or(self.vertical_ruggedness, 0.0).max(0.0),
            normal_smoothing: finite_or(self.normal_smoothing, 0.0).clamp(0.0, 1.0),
            ledge_chance: finite_or(self.ledge_chance, 0.0).clamp(0.0, 1.0),
            ledge_size: finite_or(self.ledge_size, 0.0).max(0.0),
            alcove_chance: finite_or(self.alcove_chance, 0.0).clamp(0.0, 1.0),
            alcove_width_segs: self.alcove_width_segs.max(1),
            top_mouth_arc_deg: self
                .top_mouth_arc_deg
                .filter(|a| a.is_finite() && *a > 0.0)
                .map(|a| a.min(360.0)),
        }
    }
}

pub(crate) fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

/// Ring/segment counts derived from sanitized parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaftLayout {
    pub rings: usize,
    pub segments: usize,
    pub spacing: f32,
    pub total_height: f32,
}

impl ShaftLayout {
    pub fn new(params: &ShaftParams) -> Self {
        let spacing = params.meters_per_ring.max(MIN_RING_SPACING);
        let rings = ((params.depth / spacing).ceil() as usize).saturating_add(1).max(2);
        let segments = params.segments_around.max(MIN_SEGMENTS) as usize;
        Self {
            rings,
            segments,
            spacing,
            total_height: (rings - 1) as f32 * spacing,
        }
    }

    /// Vertices per ring, including the duplicated seam vertex.
    pub fn verts_per_ring(&self) -> usize {
        self.segments + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.rings * self.verts_per_ring()
    }

    /// Index of sample `i` (0..=segments) on ring `ring`.
    pub fn vertex_index(&self, ring: usize, i: usize) -> usize {
        ring * self.verts_per_ring() + i
    }

    /// Depth fraction of a ring, 0 at the top and 1 at the bottom.
    pub fn ring_t(&self, ring: usize) -> f32 {
        ring as f32 / (self.rings - 1) as f32
    }

    pub fn ring_y(&self, ring: usize) -> f32 {
        -self.ring_t(ring) * self.total_height
    }

    /// Angle of a sample; the seam sample maps back to angle 0.
    pub fn angle(&self, i: usize) -> f32 {
        (i % self.segments) as f32 / self.segments as f32 * TAU
    }
}

/// Random phase offsets decorrelating the noise inputs of one cave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoisePhases {
    pub radius: f32,
    pub x: f32,
    pub z: f32,
}

impl NoisePhases {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            radius: rng.random::<f32>() * 1000.0,
            x: rng.random::<f32>() * 1000.0,
            z: rng.random::<f32>() * 1000.0,
        }
    }
}

/// Local widening of the wall around `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alcove {
    pub start: usize,
    pub strength: f32,
}

/// Per-ring wall features, planned before the sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RingFeatures {
    /// Sector whose radius is pulled inwards.
    pub ledge: Option<usize>,
    pub alcove: Option<Alcove>,
}

/// Roll ledges and alcoves for every ring.
pub fn plan_ring_features<R: Rng + ?Sized>(
    params: &ShaftParams,
    layout: &ShaftLayout,
    rng: &mut R,
) -> Vec<RingFeatures> {
    (0..layout.rings)
        .map(|_| {
            let ledge = (rng.random::<f32>() < params.ledge_chance)
                .then(|| rng.random_range(0..layout.segments));
            let alcove = (rng.random::<f32>() < params.alcove_chance).then(|| Alcove {
                start: rng.random_range(0..layout.segments),
                strength: 1.2 + 0.8 * rng.random::<f32>(),
            });
            RingFeatures { ledge, alcove }
        })
        .collect()
}

/// Shortest signed distance from sector `j` to sector `i` around a ring.
pub fn delta_sector(i: usize, j: usize, segments: usize) -> i64 {
    let n = segments as i64;
    let mut d = (i as i64 - j as i64).rem_euclid(n);
    if d > n / 2 {
        d -= n;
    }
    d
}

/// XZ offset of the centerline at height `y`.
pub fn meander_center(noise: &Fbm, phases: &NoisePhases, params: &ShaftParams, y: f32) -> Vec2 {
    let f = params.path_freq * 0.15;
    let mx = (noise.fbm1((y + phases.x) * f) - 0.5) * 2.0 * params.path_amplitude;
    let mz = (noise.fbm1((y + phases.z) * f) - 0.5) * 2.0 * params.path_amplitude;
    Vec2::new(mx, mz)
}

/// Ring-by-sector mask of wall sectors that emit no triangles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutMask {
    rings: usize,
    segments: usize,
    cells: Vec<bool>,
}

impl CutMask {
    pub fn new(layout: &ShaftLayout) -> Self {
        Self {
            rings: layout.rings,
            segments: layout.segments,
            cells: vec![false; layout.rings * layout.segments],
        }
    }

    /// Cut `center - half_width ..= center + half_width` (wrapping) on `ring`.
    /// Rings outside the mask are ignored.
    pub fn mark_span(&mut self, ring: usize, center: usize, half_width: usize) {
        if ring >= self.rings {
            return;
        }
        let n = self.segments as i64;
        let hw = half_width as i64;
        for k in -hw..=hw {
            let s = (center as i64 + k).rem_euclid(n) as usize;
            self.cells[ring * self.segments + s] = true;
        }
    }

    /// Cut the sectors of the top ring within `arc_deg / 2` of angle 0.
    pub fn mark_top_mouth(&mut self, arc_deg: f32) {
        let half = arc_deg * 0.5;
        for s in 0..self.segments {
            let deg = s as f32 / self.segments as f32 * 360.0;
            if deg.min(360.0 - deg) <= half {
                self.cells[s] = true;
            }
        }
    }

    pub fn is_cut(&self, ring: usize, sector: usize) -> bool {
        ring < self.rings && sector < self.segments && self.cells[ring * self.segments + sector]
    }

    /// Whether the quad between `ring` and `ring + 1` at `sector` is suppressed.
    pub fn suppresses_quad(&self, ring: usize, sector: usize) -> bool {
        self.is_cut(ring, sector) || self.is_cut(ring + 1, sector)
    }

    pub fn cut_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Wall radius of every sector of one ring.
fn ring_radii(
    params: &ShaftParams,
    layout: &ShaftLayout,
    noise: &Fbm,
    phases: &NoisePhases,
    features: &RingFeatures,
    ring: usize,
) -> Vec<f32> {
    let t = layout.ring_t(ring);
    let y = layout.ring_y(ring);
    let base = params.radius_top + (params.radius_bottom - params.radius_top) * t;
    let freq = params.radius_noise_freq;
    let width = params.alcove_width_segs as i64;

    (0..layout.segments)
        .map(|s| {
            let ang = layout.angle(s);
            let jitter = noise.fbm3(
                det_cos(ang) * freq + phases.radius,
                det_sin(ang) * freq + phases.radius,
                y * 0.1 * freq,
            ) * params.radius_noise_amp;
            let step = (noise.noise2(y * 0.1, ang * 0.5) - 0.5) * params.vertical_ruggedness;
            let mut radius = (base + jitter + step).max(MIN_RADIUS);

            if let Some(alcove) = features.alcove {
                let di = delta_sector(s, alcove.start, layout.segments).abs();
                if di <= width {
                    let falloff = 1.0 - di as f32 / (width as f32 + 0.001);
                    radius += falloff * alcove.strength;
                }
            }
            if features.ledge == Some(s) {
                radius = (radius - params.ledge_size).max(MIN_LEDGE_RADIUS);
            }
            radius
        })
        .collect()
}

/// Sweep the shaft tube. `params` must be sanitized and `features` must hold
/// one entry per ring.
pub fn sweep_shaft(
    params: &ShaftParams,
    layout: &ShaftLayout,
    noise: &Fbm,
    phases: &NoisePhases,
    features: &[RingFeatures],
    cut: &CutMask,
) -> CaveMesh {
    let segs = layout.segments;
    let mut mesh = CaveMesh::with_capacity(layout.vertex_count(), layout.rings * segs * 6);
    let tilt = params.normal_smoothing * FRAC_PI_2;
    let (tilt_sin, tilt_cos) = (det_sin(tilt), det_cos(tilt));

    for ring in 0..layout.rings {
        let t = layout.ring_t(ring);
        let y = layout.ring_y(ring);
        let center = meander_center(noise, phases, params, y);
        let ring_features = features.get(ring).copied().unwrap_or_default();
        let radii = ring_radii(params, layout, noise, phases, &ring_features, ring);

        for i in 0..=segs {
            let s = i % segs;
            let ang = layout.angle(s);
            let dir = Vec2::new(det_cos(ang), det_sin(ang));
            let radius = radii[s];
            let position = Vec3::new(center.x + dir.x * radius, y, center.y + dir.y * radius);

            // Outward and up are orthogonal unit vectors, so the slerp is a rotation by `tilt`.
            let outward = Vec3::new(dir.x, 0.0, dir.y);
            let normal = -(outward * tilt_cos + Vec3::Y * tilt_sin).normalize();
            let uv = Vec2::new(i as f32 / segs as f32, t);
            mesh.push_vertex(position, normal, uv);
        }
    }

    for ring in 0..layout.rings - 1 {
        let r0 = layout.vertex_index(ring, 0) as u32;
        let r1 = layout.vertex_index(ring + 1, 0) as u32;
        for i in 0..segs {
            if cut.suppresses_quad(ring, i) {
                continue;
            }
            let i = i as u32;
            mesh.push_inward_quad(r0 + i, r0 + i + 1, r1 + i, r1 + i + 1);
        }
    }

    mesh
}

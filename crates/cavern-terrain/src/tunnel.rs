//! Branch tunnels: planned on the shaft wall, cut into it, and swept as their
//! own tubes from the mouth outwards.
//!
//! Tunnels are placed independently; two tunnels may overlap.

use std::f32::consts::TAU;

use cavern_mesh::CaveMesh;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fbm::Fbm;
use crate::seed::{det_cos, det_sin};
use crate::shaft::{CutMask, ShaftLayout, finite_or};

/// Fewest angular segments a tunnel ring may have.
pub const MIN_TUNNEL_SEGMENTS: u32 = 6;
/// Smallest tunnel radius.
pub const MIN_TUNNEL_RADIUS: f32 = 0.1;
/// Widest mouth, in sectors either side of the center sector.
pub const MAX_MOUTH_HALF_WIDTH: u32 = 6;
/// Longest tunnel, in meters.
pub const MAX_TUNNEL_LENGTH: f32 = 1_000.0;

/// Parameters shared by all branch tunnels of a cave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelParams {
    /// Number of tunnels to plan.
    pub count: u32,
    /// Length range in meters.
    pub length_range: (f32, f32),
    pub radius_range: (f32, f32),
    pub segments_around: u32,
    /// How far the tunnel bends sideways.
    pub curve_amp: f32,
    pub curve_freq: f32,
    /// Mouth half-width in shaft sectors.
    pub mouth_half_width_segs: u32,
}

impl Default for TunnelParams {
    fn default() -> Self {
        Self {
            count: 8,
            length_range: (18.0, 45.0),
            radius_range: (2.0, 3.3),
            segments_around: 24,
            curve_amp: 5.0,
            curve_freq: 0.12,
            mouth_half_width_segs: 2,
        }
    }
}

fn sorted_range((a, b): (f32, f32), min: f32, max: f32) -> (f32, f32) {
    let a = finite_or(a, min).clamp(min, max);
    let b = finite_or(b, min).clamp(min, max);
    (a.min(b), a.max(b))
}

impl TunnelParams {
    /// Copy with every value clamped into its usable range.
    pub fn sanitized(&self) -> Self {
        Self {
            count: self.count,
            length_range: sorted_range(self.length_range, 0.0, MAX_TUNNEL_LENGTH),
            radius_range: sorted_range(self.radius_range, MIN_TUNNEL_RADIUS, f32::MAX),
            segments_around: self.segments_around.max(MIN_TUNNEL_SEGMENTS),
            curve_amp: finite_or(self.curve_amp, 0.0).max(0.0),
            curve_freq: finite_or(self.curve_freq, 0.0).max(0.0),
            mouth_half_width_segs: self.mouth_half_width_segs.clamp(1, MAX_MOUTH_HALF_WIDTH),
        }
    }
}

/// One planned branch tunnel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tunnel {
    /// Shaft ring holding the mouth.
    pub ring: usize,
    /// Center sector of the mouth.
    pub sector: usize,
    /// Half-width of the wall opening, in sectors.
    pub width_segs: usize,
    pub length: f32,
    pub radius: f32,
    /// Noise phase giving each tunnel its own curvature.
    pub curve_phase: f32,
    /// Wall vertex the tube starts from.
    pub mouth_pos: Vec3,
    /// Wall normal pointing away from the shaft, into the rock.
    pub mouth_normal: Vec3,
    /// Direction along the ring at the mouth.
    pub mouth_tangent: Vec3,
}

impl Tunnel {
    /// Mark the wall opening on the tunnel's ring.
    pub fn cut_into(&self, mask: &mut CutMask) {
        mask.mark_span(self.ring, self.sector, self.width_segs);
    }
}

/// Plan `params.count` tunnels on the shaft wall. Mouth geometry is filled
/// in later by [`resolve_mouths`].
pub fn plan_tunnels<R: Rng + ?Sized>(
    params: &TunnelParams,
    layout: &ShaftLayout,
    rng: &mut R,
) -> Vec<Tunnel> {
    let last = layout.rings - 1;
    let lo = 4.min(last);
    let hi = layout.rings.saturating_sub(6).max(lo + 1);
    let width_segs = params.mouth_half_width_segs.clamp(1, MAX_MOUTH_HALF_WIDTH) as usize;

    (0..params.count)
        .map(|_| {
            let ring = rng.random_range(lo..hi).min(last);
            let sector = rng.random_range(0..layout.segments);
            let (len_lo, len_hi) = params.length_range;
            let (rad_lo, rad_hi) = params.radius_range;
            let length = len_lo + (len_hi - len_lo) * rng.random::<f32>();
            let radius = rad_lo + (rad_hi - rad_lo) * rng.random::<f32>();
            Tunnel {
                ring,
                sector,
                width_segs,
                length,
                radius,
                curve_phase: rng.random::<f32>() * 1000.0,
                mouth_pos: Vec3::ZERO,
                mouth_normal: Vec3::ZERO,
                mouth_tangent: Vec3::ZERO,
            }
        })
        .collect()
}

/// Fill in mouth position, normal and tangent from the swept shaft.
pub fn resolve_mouths(tunnels: &mut [Tunnel], layout: &ShaftLayout, shaft: &CaveMesh) {
    for tunnel in tunnels.iter_mut() {
        let vi = layout.vertex_index(tunnel.ring, tunnel.sector);
        let next = layout.vertex_index(tunnel.ring, (tunnel.sector + 1) % layout.segments);
        let (Some(&p), Some(&q), Some(&n)) = (
            shaft.positions.get(vi),
            shaft.positions.get(next),
            shaft.normals.get(vi),
        ) else {
            tracing::warn!(
                ring = tunnel.ring,
                sector = tunnel.sector,
                "tunnel mouth outside shaft"
            );
            continue;
        };
        tunnel.mouth_pos = p;
        tunnel.mouth_normal = -n;
        tunnel.mouth_tangent = (q - p).normalize_or_zero();
    }
}

/// Orthonormal frame a tunnel is swept along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TunnelFrame {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl TunnelFrame {
    /// Frame at the mouth: `forward` is horizontal and leads away from the shaft.
    pub fn at_mouth(tunnel: &Tunnel) -> Self {
        let away = tunnel.mouth_normal.with_y(0.0);
        let mut forward = Vec3::Y.cross(tunnel.mouth_tangent).with_y(0.0);
        if forward.length_squared() < 1e-4 {
            forward = away;
        }
        if forward.length_squared() < 1e-4 {
            forward = Vec3::X;
        }
        forward = forward.normalize();
        if forward.dot(away) < 0.0 {
            forward = -forward;
        }
        let right = Vec3::Y.cross(forward).normalize();
        let up = forward.cross(right).normalize();
        Self { forward, right, up }
    }
}

/// Ring and segment counts of one tunnel tube.
pub fn tunnel_layout(tunnel: &Tunnel, params: &TunnelParams, spacing: f32) -> (usize, usize) {
    let rings = ((tunnel.length / spacing).ceil() as usize).saturating_add(1).max(2);
    let segments = params.segments_around.max(MIN_TUNNEL_SEGMENTS) as usize;
    (rings, segments)
}

/// Sweep one tunnel tube and append it to `mesh`. Returns the number of
/// vertices added.
pub fn sweep_tunnel(
    tunnel: &Tunnel,
    params: &TunnelParams,
    spacing: f32,
    noise: &Fbm,
    mesh: &mut CaveMesh,
) -> usize {
    let (rings, segs) = tunnel_layout(tunnel, params, spacing);
    let vpr = segs + 1;
    let frame = TunnelFrame::at_mouth(tunnel);
    let base = mesh.vertex_count() as u32;
    let phase = tunnel.curve_phase;

    for r in 0..rings {
        let t = r as f32 / (rings - 1) as f32;
        let dist = t * tunnel.length;

        let side = (noise.fbm1((dist + phase) * params.curve_freq) - 0.5) * 2.0 * params.curve_amp;
        let rise = (noise.fbm1((dist + 999.0 + phase) * params.curve_freq) - 0.5) * 1.5;
        let center = tunnel.mouth_pos
            + frame.forward * dist
            + frame.right * side * 0.3
            + frame.up * rise;
        let radius = tunnel.radius * (0.85 + 0.3 * noise.fbm1((dist + 333.0 + phase) * 0.2));

        for i in 0..=segs {
            let ang = (i % segs) as f32 / segs as f32 * TAU;
            let dir = (frame.right * det_cos(ang) + frame.up * det_sin(ang)).normalize();
            mesh.push_vertex(
                center + dir * radius,
                -dir,
                Vec2::new(i as f32 / segs as f32, t),
            );
        }
    }

    for r in 0..rings - 1 {
        let r0 = base + (r * vpr) as u32;
        let r1 = base + ((r + 1) * vpr) as u32;
        for i in 0..segs as u32 {
            mesh.push_inward_quad(r0 + i, r0 + i + 1, r1 + i, r1 + i + 1);
        }
    }

    rings * vpr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::cave_rng;
    use crate::shaft::ShaftParams;

    fn layout() -> ShaftLayout {
        ShaftLayout::new(
            &ShaftParams {
                depth: 40.0,
                segments_around: 32,
                ..Default::default()
            }
            .sanitized(),
        )
    }

    fn mouth_tunnel(tangent: Vec3, normal: Vec3) -> Tunnel {
        Tunnel {
            ring: 5,
            sector: 0,
            width_segs: 2,
            length: 10.0,
            radius: 2.0,
            curve_phase: 12.5,
            mouth_pos: Vec3::new(6.0, -5.0, 0.0),
            mouth_normal: normal,
            mouth_tangent: tangent,
        }
    }

    #[test]
    fn test_plan_within_ranges() {
        let layout = layout();
        let params = TunnelParams::default().sanitized();
        let tunnels = plan_tunnels(&params, &layout, &mut cave_rng(8));
        assert_eq!(tunnels.len(), 8);
        for t in &tunnels {
            assert!((4..layout.rings - 6).contains(&t.ring), "ring {}", t.ring);
            assert!(t.sector < layout.segments);
            assert_eq!(t.width_segs, 2);
            assert!((18.0..=45.0).contains(&t.length), "length {}", t.length);
            assert!((2.0..=3.3).contains(&t.radius), "radius {}", t.radius);
        }
    }

    #[test]
    fn test_plan_tiny_shaft_keeps_rings_valid() {
        let tiny = ShaftLayout {
            rings: 3,
            ..layout()
        };
        let tunnels = plan_tunnels(&TunnelParams::default(), &tiny, &mut cave_rng(1));
        assert!(tunnels.iter().all(|t| t.ring < 3));
    }

    #[test]
    fn test_sanitize_sorts_ranges() {
        let p = TunnelParams {
            length_range: (40.0, 10.0),
            radius_range: (-1.0, 2.0),
            segments_around: 2,
            mouth_half_width_segs: 50,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.length_range, (10.0, 40.0));
        assert_eq!(p.radius_range, (MIN_TUNNEL_RADIUS, 2.0));
        assert_eq!(p.segments_around, MIN_TUNNEL_SEGMENTS);
        assert_eq!(p.mouth_half_width_segs, MAX_MOUTH_HALF_WIDTH);
    }

    #[test]
    fn test_sanitize_caps_huge_length() {
        let p = TunnelParams {
            length_range: (f32::MAX, f32::INFINITY),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.length_range, (0.0, MAX_TUNNEL_LENGTH));

        let p = TunnelParams {
            length_range: (f32::MAX, f32::MAX),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.length_range, (MAX_TUNNEL_LENGTH, MAX_TUNNEL_LENGTH));
    }

    #[test]
    fn test_frame_orthonormal_and_outward() {
        // Mouth on the +X wall of a shaft, tangent running along +Z.
        let t = mouth_tunnel(Vec3::Z, Vec3::X);
        let frame = TunnelFrame::at_mouth(&t);
        assert!((frame.forward - Vec3::X).length() < 1e-5, "{:?}", frame.forward);
        assert!(frame.forward.dot(frame.right).abs() < 1e-5);
        assert!(frame.forward.dot(frame.up).abs() < 1e-5);
        assert!(frame.right.dot(frame.up).abs() < 1e-5);
        assert!((frame.up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_frame_flips_to_face_away_from_shaft() {
        let t = mouth_tunnel(-Vec3::Z, Vec3::X);
        let frame = TunnelFrame::at_mouth(&t);
        assert!(frame.forward.dot(Vec3::X) > 0.99);
    }

    #[test]
    fn test_frame_degenerate_tangent_falls_back() {
        let t = mouth_tunnel(Vec3::ZERO, Vec3::new(0.0, 0.2, -1.0));
        let frame = TunnelFrame::at_mouth(&t);
        assert!(frame.forward.dot(-Vec3::Z) > 0.99);
    }

    #[test]
    fn test_sweep_counts_and_bounds() {
        let params = TunnelParams::default().sanitized();
        let t = mouth_tunnel(Vec3::Z, Vec3::X);
        let mut mesh = CaveMesh::new();
        let added = sweep_tunnel(&t, &params, 1.0, &Fbm::new(3), &mut mesh);
        let (rings, segs) = tunnel_layout(&t, &params, 1.0);
        assert_eq!(rings, 11);
        assert_eq!(added, rings * (segs + 1));
        assert_eq!(mesh.vertex_count(), added);
        assert_eq!(mesh.triangle_count(), (rings - 1) * segs * 2);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_layout_saturates_huge_length() {
        let t = Tunnel {
            length: f32::MAX,
            ..mouth_tunnel(Vec3::Z, Vec3::X)
        };
        let (rings, _) = tunnel_layout(&t, &TunnelParams::default(), 0.2);
        assert_eq!(rings, usize::MAX);
    }

    #[test]
    fn test_sweep_appends_after_existing_vertices() {
        let params = TunnelParams::default().sanitized();
        let t = mouth_tunnel(Vec3::Z, Vec3::X);
        let mut mesh = CaveMesh::new();
        sweep_tunnel(&t, &params, 1.0, &Fbm::new(3), &mut mesh);
        let first_len = mesh.vertex_count() as u32;
        sweep_tunnel(&t, &params, 1.0, &Fbm::new(3), &mut mesh);
        let second_min = mesh.indices[mesh.indices.len() / 2..].iter().min().copied();
        assert_eq!(second_min, Some(first_len));
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_tunnel_normals_face_centerline() {
        let params = TunnelParams {
            curve_amp: 0.0,
            ..Default::default()
        }
        .sanitized();
        let t = mouth_tunnel(Vec3::Z, Vec3::X);
        let mut mesh = CaveMesh::new();
        sweep_tunnel(&t, &params, 1.0, &Fbm::new(5), &mut mesh);
        let segs = params.segments_around as usize;
        let ring_center: Vec3 = mesh.positions[..segs].iter().copied().sum::<Vec3>() / segs as f32;
        for i in 0..segs {
            let to_center = ring_center - mesh.positions[i];
            assert!(mesh.normals[i].dot(to_center) > 0.0);
            assert!((mesh.normals[i].length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_curve_phase_makes_tunnels_independent() {
        let params = TunnelParams::default().sanitized();
        let noise = Fbm::new(4);
        let a = mouth_tunnel(Vec3::Z, Vec3::X);
        let b = Tunnel {
            curve_phase: 700.0,
            ..a
        };
        let mut mesh_a = CaveMesh::new();
        let mut mesh_b = CaveMesh::new();
        sweep_tunnel(&a, &params, 1.0, &noise, &mut mesh_a);
        sweep_tunnel(&b, &params, 1.0, &noise, &mut mesh_b);
        assert_ne!(mesh_a.positions, mesh_b.positions);
    }

    #[test]
    fn test_cut_into_marks_mouth_span() {
        let layout = layout();
        let mut mask = CutMask::new(&layout);
        let t = Tunnel {
            ring: 7,
            sector: 31,
            ..mouth_tunnel(Vec3::Z, Vec3::X)
        };
        t.cut_into(&mut mask);
        for s in [29, 30, 31, 0, 1] {
            assert!(mask.is_cut(7, s), "sector {s}");
        }
        assert_eq!(mask.cut_count(), 5);
    }
}

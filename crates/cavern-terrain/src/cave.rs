//! Vertical cave assembly: one meandering shaft with branch tunnels cut into
//! its wall, merged into a single mesh.

use cavern_mesh::{CaveMesh, MeshSink};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decor::{DecorParams, DecorPlacement, place_decor};
use crate::fbm::Fbm;
use crate::seed::cave_rng;
use crate::shaft::{
    CutMask, NoisePhases, ShaftLayout, ShaftParams, plan_ring_features, sweep_shaft,
};
use crate::tunnel::{Tunnel, TunnelParams, plan_tunnels, resolve_mouths, sweep_tunnel};

/// Everything needed to generate one vertical cave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveParams {
    /// Noise seed. The RNG passed to [`VerticalCaveGenerator::generate`] is
    /// independent; [`VerticalCaveGenerator::generate_seeded`] derives it from
    /// this seed.
    pub seed: u64,
    pub shaft: ShaftParams,
    pub tunnels: TunnelParams,
    pub decor: DecorParams,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            shaft: ShaftParams::default(),
            tunnels: TunnelParams::default(),
            decor: DecorParams::default(),
        }
    }
}

/// Summary numbers of a generated cave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaveStats {
    pub rings: usize,
    pub segments: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub tunnels: usize,
    pub cut_sectors: usize,
    /// Whether the merged mesh needs 32-bit indices.
    pub u32_indices: bool,
}

/// Output of [`VerticalCaveGenerator::generate`].
#[derive(Clone, Debug)]
pub struct CaveResult {
    /// Shaft followed by every tunnel tube.
    pub mesh: CaveMesh,
    pub layout: ShaftLayout,
    /// Vertices belonging to the shaft; tunnel vertices follow.
    pub shaft_vertex_count: usize,
    /// Indices belonging to the shaft; tunnel indices follow.
    pub shaft_index_count: usize,
    pub cut: CutMask,
    pub tunnels: Vec<Tunnel>,
    pub decor: Vec<DecorPlacement>,
    pub stats: CaveStats,
}

/// Generates shaft-and-tunnel caves.
#[derive(Clone, Debug, Default)]
pub struct VerticalCaveGenerator {
    params: CaveParams,
}

impl VerticalCaveGenerator {
    pub fn new(params: CaveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CaveParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut CaveParams {
        &mut self.params
    }

    /// Generate with an RNG seeded from `params.seed`.
    pub fn generate_seeded(&self) -> CaveResult {
        self.generate(&mut cave_rng(self.params.seed))
    }

    /// Generate one cave.
    ///
    /// RNG draws happen in a fixed order: noise phases, tunnel plans, ring
    /// features, decor.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> CaveResult {
        let shaft_params = self.params.shaft.sanitized();
        let tunnel_params = self.params.tunnels.sanitized();
        let layout = ShaftLayout::new(&shaft_params);
        let noise = Fbm::new(self.params.seed);

        let phases = NoisePhases::draw(rng);
        let mut tunnels = plan_tunnels(&tunnel_params, &layout, rng);
        let features = plan_ring_features(&shaft_params, &layout, rng);

        let mut cut = CutMask::new(&layout);
        for tunnel in &tunnels {
            tunnel.cut_into(&mut cut);
        }
        if let Some(arc) = shaft_params.top_mouth_arc_deg {
            cut.mark_top_mouth(arc);
        }
        debug!(cut_sectors = cut.cut_count(), "tunnel mouths cut");

        let shaft_mesh = sweep_shaft(&shaft_params, &layout, &noise, &phases, &features, &cut);
        let shaft_vertex_count = shaft_mesh.vertex_count();
        let shaft_index_count = shaft_mesh.indices.len();

        resolve_mouths(&mut tunnels, &layout, &shaft_mesh);
        let decor = place_decor(&shaft_mesh, &layout, &self.params.decor, rng);

        let mut tunnel_mesh = CaveMesh::new();
        for tunnel in &tunnels {
            sweep_tunnel(tunnel, &tunnel_params, layout.spacing, &noise, &mut tunnel_mesh);
        }
        let mesh = CaveMesh::merged([&shaft_mesh, &tunnel_mesh]);

        let stats = CaveStats {
            rings: layout.rings,
            segments: layout.segments,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            tunnels: tunnels.len(),
            cut_sectors: cut.cut_count(),
            u32_indices: mesh.requires_u32_indices(),
        };
        info!(
            rings = stats.rings,
            segments = stats.segments,
            vertices = stats.vertices,
            triangles = stats.triangles,
            tunnels = stats.tunnels,
            "vertical cave generated"
        );

        CaveResult {
            mesh,
            layout,
            shaft_vertex_count,
            shaft_index_count,
            cut,
            tunnels,
            decor,
            stats,
        }
    }

    /// Generate with the seeded RNG and hand the merged buffers to `sink`.
    pub fn generate_into(&self, sink: &mut dyn MeshSink) -> CaveResult {
        let result = self.generate_seeded();
        result.mesh.submit_to(sink);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CaveParams {
        CaveParams {
            seed: 7,
            shaft: ShaftParams {
                depth: 40.0,
                segments_around: 24,
                ..Default::default()
            },
            tunnels: TunnelParams {
                count: 3,
                length_range: (6.0, 10.0),
                segments_around: 8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_counts() {
        let result = VerticalCaveGenerator::new(small()).generate_seeded();
        let layout = result.layout;
        assert_eq!(result.shaft_vertex_count, layout.vertex_count());
        assert_eq!(result.tunnels.len(), 3);
        assert!(result.mesh.vertex_count() > result.shaft_vertex_count);
        assert!(result.mesh.indices_in_bounds());
        assert!(result.mesh.attributes_consistent());
        assert_eq!(result.stats.vertices, result.mesh.vertex_count());
        assert_eq!(result.stats.triangles, result.mesh.triangle_count());
        assert!(!result.stats.u32_indices);
    }

    #[test]
    fn test_tunnel_indices_follow_shaft() {
        let result = VerticalCaveGenerator::new(small()).generate_seeded();
        let first = result.shaft_vertex_count as u32;
        let shaft = &result.mesh.indices[..result.shaft_index_count];
        let tunnels = &result.mesh.indices[result.shaft_index_count..];
        assert!(!tunnels.is_empty());
        assert!(shaft.iter().all(|&i| i < first), "shaft index past vertex {first}");
        for &i in tunnels {
            assert!(i >= first, "tunnel index {i} points into the shaft (< {first})");
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let generator = VerticalCaveGenerator::new(small());
        let a = generator.generate_seeded();
        let b = generator.generate_seeded();
        assert_eq!(a.mesh, b.mesh);
        assert_eq!(a.tunnels, b.tunnels);
        assert_eq!(a.decor, b.decor);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = VerticalCaveGenerator::new(small()).generate_seeded();
        let b = VerticalCaveGenerator::new(CaveParams {
            seed: 8,
            ..small()
        })
        .generate_seeded();
        assert_ne!(a.mesh.positions, b.mesh.positions);
    }

    #[test]
    fn test_mouths_sit_on_shaft_vertices() {
        let result = VerticalCaveGenerator::new(small()).generate_seeded();
        for t in &result.tunnels {
            let vi = result.layout.vertex_index(t.ring, t.sector);
            assert_eq!(t.mouth_pos, result.mesh.positions[vi]);
            assert_eq!(t.mouth_normal, -result.mesh.normals[vi]);
        }
    }

    #[test]
    fn test_tunnel_tubes_start_at_mouth() {
        let result = VerticalCaveGenerator::new(small()).generate_seeded();
        let first = result.tunnels[0];
        // First tunnel ring is centered near the mouth.
        let segs = small().tunnels.segments_around as usize;
        let start = result.shaft_vertex_count;
        let ring0 = &result.mesh.positions[start..start + segs];
        let centroid = ring0.iter().copied().sum::<glam::Vec3>() / segs as f32;
        let offset = (centroid - first.mouth_pos).length();
        assert!(offset < 2.0, "tunnel starts {offset} m away from its mouth");
    }

    #[test]
    fn test_no_tunnels_gives_plain_shaft() {
        let params = CaveParams {
            tunnels: TunnelParams {
                count: 0,
                ..Default::default()
            },
            ..small()
        };
        let result = VerticalCaveGenerator::new(params).generate_seeded();
        assert_eq!(result.mesh.vertex_count(), result.shaft_vertex_count);
        assert_eq!(result.stats.cut_sectors, 0);
        let l = result.layout;
        assert_eq!(result.mesh.triangle_count(), (l.rings - 1) * l.segments * 2);
    }

    #[test]
    fn test_top_mouth_removes_top_row_triangles() {
        let mut params = small();
        params.tunnels.count = 0;
        params.shaft.top_mouth_arc_deg = Some(110.0);
        let result = VerticalCaveGenerator::new(params).generate_seeded();
        let l = result.layout;
        let full = (l.rings - 1) * l.segments * 2;
        assert_eq!(result.mesh.triangle_count(), full - result.cut.cut_count() * 2);
    }

    #[test]
    fn test_generate_into_sink() {
        let generator = VerticalCaveGenerator::new(small());
        let mut sink = CaveMesh::new();
        let result = generator.generate_into(&mut sink);
        assert_eq!(sink, result.mesh);
    }

    #[test]
    fn test_params_ron_partial() {
        let p: CaveParams = ron::from_str("(seed: 3, shaft: (depth: 12.0))").unwrap();
        assert_eq!(p.seed, 3);
        assert_eq!(p.shaft.depth, 12.0);
        assert_eq!(p.shaft.segments_around, 64);
        assert_eq!(p.tunnels, TunnelParams::default());
    }
}

//! One-shot cave bootstrap: pick the reference shape, optionally derive the
//! seed from the wall clock, generate once and compute a spawn point.
//!
//! The clock is always passed in; nothing here reads the system time.

use cavern_mesh::{CaveMesh, MeshSink};
use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cave::{CaveParams, CaveResult, VerticalCaveGenerator};
use crate::seed::{TimeSeed, time_seed};

/// Bootstrap options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapParams {
    /// Derive seed, tunnel count and curvature from the clock.
    pub use_time_seed: bool,
    /// Width of a time band in minutes, 1..=60.
    pub minute_modulo: u32,
    /// Let the time band also vary tunnel count and curvature.
    pub modulate_params: bool,
    /// Open the top ring so the shaft can be viewed from above.
    pub cut_top_mouth: bool,
    /// Width of the top opening in degrees, 30..=180.
    pub top_mouth_arc_deg: f32,
    /// Height of the spawn point above the top of the mesh.
    pub spawn_offset_y: f32,
    /// Overwrite the shaft and tunnel shape with the reference cave.
    pub apply_reference_shape: bool,
}

impl Default for BootstrapParams {
    fn default() -> Self {
        Self {
            use_time_seed: true,
            minute_modulo: 10,
            modulate_params: true,
            cut_top_mouth: true,
            top_mouth_arc_deg: 110.0,
            spawn_offset_y: 2.0,
            apply_reference_shape: true,
        }
    }
}

/// Set the reference shape: a 200 m shaft widening from 7 to 12 m with a
/// dozen long, gently curving tunnels.
pub fn apply_reference_shape(cave: &mut CaveParams) {
    let shaft = &mut cave.shaft;
    shaft.depth = 200.0;
    shaft.segments_around = 64;
    shaft.radius_top = 7.0;
    shaft.radius_bottom = 12.0;
    shaft.radius_noise_amp = 1.2;
    shaft.normal_smoothing = 0.28;

    let tunnels = &mut cave.tunnels;
    tunnels.count = 12;
    tunnels.length_range = (22.0, 45.0);
    tunnels.radius_range = (2.2, 3.2);
    tunnels.curve_amp = 6.0;
    tunnels.curve_freq = 0.11;
}

/// Apply a time seed: the seed itself plus a tunnel count and curvature
/// that drift with the minute band.
pub fn apply_time_seed(cave: &mut CaveParams, ts: TimeSeed) {
    cave.seed = ts.seed;
    cave.tunnels.count = 8 + ts.minute_band % 5;
    let k = ((ts.minute_band * 37) % 100) as f32 / 100.0;
    cave.tunnels.curve_amp = 4.0 + (7.0 - 4.0) * k;
}

/// Top-center of the mesh bounds raised by `offset_y`. `None` for an empty mesh.
pub fn spawn_at_top(mesh: &CaveMesh, offset_y: f32) -> Option<Vec3> {
    let Some(bounds) = mesh.bounds() else {
        warn!("cannot place spawn point: mesh is empty");
        return None;
    };
    Some(bounds.top_center() + Vec3::Y * offset_y)
}

/// Result of [`CaveBootstrap::run`].
#[derive(Clone, Debug)]
pub struct BootstrapOutcome {
    /// Parameters the cave was generated with.
    pub params: CaveParams,
    pub time_seed: Option<TimeSeed>,
    pub result: CaveResult,
    pub spawn_point: Option<Vec3>,
}

/// Configures a [`VerticalCaveGenerator`] and runs it once.
#[derive(Clone, Debug, Default)]
pub struct CaveBootstrap {
    params: BootstrapParams,
    cave: CaveParams,
}

impl CaveBootstrap {
    pub fn new(params: BootstrapParams, cave: CaveParams) -> Self {
        Self { params, cave }
    }

    pub fn params(&self) -> &BootstrapParams {
        &self.params
    }

    /// Cave parameters before bootstrap adjustments.
    pub fn cave_params(&self) -> &CaveParams {
        &self.cave
    }

    /// Effective cave parameters for a run at `now`.
    pub fn prepare(&self, now: &DateTime<Utc>) -> (CaveParams, Option<TimeSeed>) {
        let mut cave = self.cave.clone();
        if self.params.apply_reference_shape {
            apply_reference_shape(&mut cave);
        }
        let ts = self
            .params
            .use_time_seed
            .then(|| time_seed(now, self.params.minute_modulo.clamp(1, 60)));
        match ts {
            Some(ts) if self.params.modulate_params => apply_time_seed(&mut cave, ts),
            Some(ts) => cave.seed = ts.seed,
            None => {}
        }
        if self.params.cut_top_mouth {
            cave.shaft.top_mouth_arc_deg = Some(self.params.top_mouth_arc_deg.clamp(30.0, 180.0));
        }
        (cave, ts)
    }

    /// Generate once, push the mesh into `sink` and place the spawn point.
    pub fn run(&self, now: &DateTime<Utc>, sink: &mut dyn MeshSink) -> BootstrapOutcome {
        let (params, time_seed) = self.prepare(now);
        if let Some(ts) = time_seed {
            info!(seed = ts.seed, minute_band = ts.minute_band, "using time seed");
        }

        let generator = VerticalCaveGenerator::new(params.clone());
        let result = generator.generate_into(sink);
        let spawn_point = spawn_at_top(&result.mesh, self.params.spawn_offset_y);

        BootstrapOutcome {
            params,
            time_seed,
            result,
            spawn_point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn quick_cave() -> CaveParams {
        let mut cave = CaveParams::default();
        cave.shaft.depth = 20.0;
        cave.shaft.segments_around = 16;
        cave.tunnels.count = 2;
        cave.tunnels.length_range = (4.0, 6.0);
        cave.tunnels.segments_around = 8;
        cave
    }

    #[test]
    fn test_reference_shape() {
        let mut cave = CaveParams::default();
        apply_reference_shape(&mut cave);
        assert_eq!(cave.shaft.depth, 200.0);
        assert_eq!(cave.shaft.radius_bottom, 12.0);
        assert_eq!(cave.tunnels.count, 12);
        assert_eq!(cave.tunnels.length_range, (22.0, 45.0));
        assert_eq!(cave.tunnels.curve_freq, 0.11);
    }

    #[test]
    fn test_time_seed_modulates_tunnels() {
        // 12:00 with 10-minute bands: band 72.
        let (cave, ts) = CaveBootstrap::default().prepare(&noon());
        let ts = ts.unwrap();
        assert_eq!(ts.minute_band, 72);
        assert_eq!(cave.seed, 20261018 + 72);
        assert_eq!(cave.tunnels.count, 8 + 72 % 5);
        // (72 * 37) % 100 = 64
        let expected = 4.0 + 3.0 * 0.64;
        assert!((cave.tunnels.curve_amp - expected).abs() < 1e-5, "{}", cave.tunnels.curve_amp);
    }

    #[test]
    fn test_time_seed_without_modulation() {
        let bootstrap = CaveBootstrap::new(
            BootstrapParams {
                modulate_params: false,
                apply_reference_shape: false,
                ..Default::default()
            },
            quick_cave(),
        );
        let (cave, _) = bootstrap.prepare(&noon());
        assert_eq!(cave.seed, 20261018 + 72);
        assert_eq!(cave.tunnels, quick_cave().tunnels);
    }

    #[test]
    fn test_prepare_without_time_seed_keeps_seed() {
        let bootstrap = CaveBootstrap::new(
            BootstrapParams {
                use_time_seed: false,
                cut_top_mouth: false,
                apply_reference_shape: false,
                ..Default::default()
            },
            quick_cave(),
        );
        let (cave, ts) = bootstrap.prepare(&noon());
        assert!(ts.is_none());
        assert_eq!(cave, quick_cave());
    }

    #[test]
    fn test_top_mouth_arc_clamped() {
        let bootstrap = CaveBootstrap::new(
            BootstrapParams {
                top_mouth_arc_deg: 500.0,
                ..Default::default()
            },
            quick_cave(),
        );
        let (cave, _) = bootstrap.prepare(&noon());
        assert_eq!(cave.shaft.top_mouth_arc_deg, Some(180.0));
    }

    #[test]
    fn test_spawn_at_top_empty_mesh() {
        assert_eq!(spawn_at_top(&CaveMesh::new(), 2.0), None);
    }

    #[test]
    fn test_spawn_above_mesh() {
        let mut mesh = CaveMesh::new();
        mesh.push_vertex(Vec3::new(-2.0, -10.0, -4.0), Vec3::Y, glam::Vec2::ZERO);
        mesh.push_vertex(Vec3::new(4.0, 0.0, 2.0), Vec3::Y, glam::Vec2::ZERO);
        assert_eq!(spawn_at_top(&mesh, 2.0), Some(Vec3::new(1.0, 2.0, -1.0)));
    }

    #[test]
    fn test_run_fills_sink() {
        let bootstrap = CaveBootstrap::new(
            BootstrapParams {
                apply_reference_shape: false,
                ..Default::default()
            },
            quick_cave(),
        );
        let mut sink = CaveMesh::new();
        let outcome = bootstrap.run(&noon(), &mut sink);
        assert_eq!(sink, outcome.result.mesh);
        assert_eq!(outcome.result.tunnels.len(), 10);
        let spawn = outcome.spawn_point.unwrap();
        let top = outcome.result.mesh.bounds().unwrap().max.y;
        assert!((spawn.y - (top + 2.0)).abs() < 1e-4);
    }
}

//! Multi-octave value noise used to perturb cave radii and centerlines.
//!
//! All samples are remapped to `[0, 1]` so callers can center them with
//! `- 0.5` the same way for every octave count.

use noise::{NoiseFn, Value};

/// Octaves summed by [`Fbm::fbm1`] and [`Fbm::fbm3`].
pub const OCTAVES: u32 = 4;
/// Frequency multiplier per octave.
pub const LACUNARITY: f32 = 2.0;
/// Amplitude multiplier per octave.
pub const GAIN: f32 = 0.5;

/// Fixed second coordinate for 1D sampling through the 2D noise.
const LINE_OFFSET: f64 = 0.1234;

/// Fractal Brownian motion over seeded 2D value noise.
#[derive(Clone, Debug)]
pub struct Fbm {
    noise: Value,
}

impl Fbm {
    /// Create a sampler for the given generator seed.
    pub fn new(seed: u64) -> Self {
        // High bits are folded in before truncating to the noise seed width.
        let folded = seed ^ (seed >> 32);
        // Offset decorrelates the noise lattice from the RNG stream of the same seed.
        let noise = Value::new(folded.wrapping_add(0x0CA7_E5ED) as u32);
        Self { noise }
    }

    /// Single 2D sample in `[0, 1]`.
    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        let v = self.noise.get([x as f64, y as f64]);
        ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// 1D fBm. Starts at amplitude 0.5, so the result lies in `[0, 0.9375]`.
    pub fn fbm1(&self, x: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;
        for _ in 0..OCTAVES {
            let v = self.noise.get([(x * frequency) as f64, LINE_OFFSET]);
            total += ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0) * amplitude;
            frequency *= LACUNARITY;
            amplitude *= GAIN;
        }
        total
    }

    /// 3D fBm built from three axis-pair 2D samples per octave.
    pub fn fbm3(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;
        for _ in 0..OCTAVES {
            let (fx, fy, fz) = (x * frequency, y * frequency, z * frequency);
            let sum = self.noise2(fx, fy) + self.noise2(fy, fz) + self.noise2(fz, fx);
            total += sum / 3.0 * amplitude;
            frequency *= LACUNARITY;
            amplitude *= GAIN;
        }
        total
    }

    /// Upper bound of [`Fbm::fbm1`] and [`Fbm::fbm3`] (geometric series sum).
    pub fn max_amplitude() -> f32 {
        let mut sum = 0.0;
        let mut amp = 0.5;
        for _ in 0..OCTAVES {
            sum += amp;
            amp *= GAIN;
        }
        sum
    }
}

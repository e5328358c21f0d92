//! Deterministic seeded generation utilities.
//!
//! Provides the RNG derivation used by every generator, the wall-clock based
//! seed schedule of the bootstrap, and deterministic trig via `libm` so ring
//! vertices are bit-identical across platforms.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// RNG
// ---------------------------------------------------------------------------

/// Derive the generator RNG for a seed.
///
/// The returned RNG produces an identical sequence for the same seed
/// regardless of thread or platform.
pub fn cave_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// ---------------------------------------------------------------------------
// Time-based seeding
// ---------------------------------------------------------------------------

/// Seed derived from a wall-clock instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSeed {
    /// `YYYYMMDD + minute_band`.
    pub seed: u64,
    /// Index of the `minute_modulo`-minute window within the day.
    pub minute_band: u32,
}

/// Compute the time seed for `now`.
///
/// One large cave shape per day, with a small modulation every
/// `minute_modulo` minutes. A modulo of zero is treated as one.
pub fn time_seed(now: &DateTime<Utc>, minute_modulo: u32) -> TimeSeed {
    let daily = now.year().max(0) as u64 * 10_000 + now.month() as u64 * 100 + now.day() as u64;
    let minute_band = (now.hour() * 60 + now.minute()) / minute_modulo.max(1);
    TimeSeed {
        seed: daily + minute_band as u64,
        minute_band,
    }
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f32) -> f32 {
    libm::sinf(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f32) -> f32 {
    libm::cosf(x)
}

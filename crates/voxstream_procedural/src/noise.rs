//! # Simplex Noise
//!
//! Deterministic 2D simplex noise and its fractal sum.
//!
//! ## Determinism Guarantee
//!
//! Given the same `NoiseSeed`, this implementation produces **exactly** the
//! same values on any platform. Terrain grids are cached and dropped freely,
//! so regenerating a chunk must reproduce it bit for bit.

use serde::{Deserialize, Serialize};

/// Seed for deterministic noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a new seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed, e.g. one per fractal octave.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0 ^ purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(0x5EED_0F7E_44A1_B5C3)
    }
}

/// 12 gradient directions for 2D simplex.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0],
    [1, 1],
    [0, 1],
    [-1, 1],
    [-1, 0],
    [-1, -1],
    [0, -1],
    [1, -1],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
];

/// Seeded permutation of `0..256`, doubled so lookups never wrap.
#[derive(Clone)]
struct Permutation([u8; 512]);

impl Permutation {
    fn shuffled(seed: NoiseSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().take(256).enumerate() {
            *p = i as u8;
        }

        // Fisher-Yates driven by xorshift64. A zero state would never move.
        let mut state = seed.value() | 1;
        for i in (1..256usize).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            perm.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);
        Self(perm)
    }

    #[inline]
    fn at(&self, index: usize) -> usize {
        usize::from(self.0[index & 511])
    }
}

/// 2D simplex noise in `[-1, 1]`.
///
/// # Example
///
/// ```rust,ignore
/// let noise = SimplexNoise::new(NoiseSeed::new(42));
/// let v = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&v));
/// ```
#[derive(Clone)]
pub struct SimplexNoise {
    perm: Permutation,
}

impl SimplexNoise {
    /// Skew factor: `(sqrt(3) - 1) / 2`.
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskew factor: `(3 - sqrt(3)) / 6`.
    const G2: f64 = 0.211_324_865_405_187_1;

    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        Self {
            perm: Permutation::shuffled(seed),
        }
    }

    /// Samples noise at `(x, y)`. Result is in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1): (i32, i32) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let i1 = i1 as usize;
        let j1 = j1 as usize;

        let h0 = self.perm.at(ii + self.perm.at(jj));
        let h1 = self.perm.at(ii + i1 + self.perm.at(jj + j1));
        let h2 = self.perm.at(ii + 1 + self.perm.at(jj + 1));

        let n = corner(x0, y0, h0) + corner(x1, y1, h1) + corner(x2, y2, h2);

        // 70 normalizes the summed contributions to [-1, 1].
        (70.0 * n).clamp(-1.0, 1.0)
    }

    /// Sums `params.octaves` layers of noise, normalized back to `[-1, 1]`.
    #[must_use]
    pub fn fractal(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = params.frequency;
        let mut norm = 0.0;

        for _ in 0..params.octaves.max(1) {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            norm += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        total / norm
    }
}

/// Contribution of one simplex corner.
#[inline]
fn corner(x: f64, y: f64, hash: usize) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let g = GRADIENTS[hash % 12];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(g[0]) + y * f64::from(g[1]))
}

/// Floor to `i32` without going through `f64::floor`.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

/// Fractal sum settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalParams {
    /// Number of layers (at least 1 is always sampled).
    pub octaves: u32,
    /// Base frequency in cycles per voxel.
    pub frequency: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
}

impl Default for FractalParams {
    /// Rolling hills: 6 octaves, one feature every ~128 voxels.
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 1.0 / 128.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

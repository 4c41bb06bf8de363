//! # Height Fields
//!
//! A height field is a pure function `(x, y) -> [-1, 1]`. Samplers turn it
//! into voxel columns with [`column_height`].

use crate::noise::{FractalParams, NoiseSeed, SimplexNoise};

/// Pure 2D height function.
///
/// Values outside `[-1, 1]` are clamped by the consumer.
pub trait HeightField: Send + Sync {
    /// Height at world voxel column `(x, y)`.
    fn height(&self, x: f64, y: f64) -> f64;
}

impl<F> HeightField for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    #[inline]
    fn height(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Same height everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantHeight(pub f64);

impl HeightField for ConstantHeight {
    #[inline]
    fn height(&self, _x: f64, _y: f64) -> f64 {
        self.0
    }
}

/// Fractal simplex terrain.
#[derive(Clone)]
pub struct FractalHeightField {
    noise: SimplexNoise,
    params: FractalParams,
}

impl FractalHeightField {
    /// Creates a fractal field.
    #[must_use]
    pub fn new(seed: NoiseSeed, params: FractalParams) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            params,
        }
    }

    /// Fractal settings in use.
    #[must_use]
    pub const fn params(&self) -> &FractalParams {
        &self.params
    }
}

impl HeightField for FractalHeightField {
    #[inline]
    fn height(&self, x: f64, y: f64) -> f64 {
        self.noise.fractal(x, y, &self.params)
    }
}

/// Maps a height sample to a column height in voxels.
///
/// The sample is clamped to `[-1, 1]` and rescaled to `[0, max_height]`,
/// truncating toward zero. Cells with `z < column_height` are solid.
#[inline]
#[must_use]
pub fn column_height(sample: f64, max_height: i32) -> i32 {
    ((sample.clamp(-1.0, 1.0) + 1.0) * 0.5 * f64::from(max_height)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_height_mapping() {
        assert_eq!(column_height(-1.0, 64), 0);
        assert_eq!(column_height(0.0, 64), 32);
        assert_eq!(column_height(1.0, 64), 64);
        // Out-of-range samples clamp instead of overshooting.
        assert_eq!(column_height(3.5, 64), 64);
        assert_eq!(column_height(-7.0, 64), 0);
        // Truncation, not rounding.
        assert_eq!(column_height(0.99, 10), 9);
    }

    #[test]
    fn test_closure_is_height_field() {
        let ramp = |x: f64, _y: f64| x / 100.0;
        assert!((ramp.height(50.0, 3.0) - 0.5).abs() < f64::EPSILON);
        assert!((ConstantHeight(0.25).height(-9.0, 9.0) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fractal_field_is_deterministic() {
        let a = FractalHeightField::new(NoiseSeed::new(9), FractalParams::default());
        let b = FractalHeightField::new(NoiseSeed::new(9), FractalParams::default());
        for i in 0..256_i32 {
            let (x, y) = (f64::from(i) * 7.0 - 900.0, f64::from(i) * -3.0);
            assert_eq!(a.height(x, y).to_bits(), b.height(x, y).to_bits());
        }
    }
}

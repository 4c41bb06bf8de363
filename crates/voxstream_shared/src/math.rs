//! Integer and float vector types for the voxel grid.
//!
//! `Int3` is the workhorse: voxel positions, chunk indices, chunk sizes and
//! world bounds are all `Int3`. All arithmetic is component-wise.
//!
//! ## Negative coordinates
//!
//! `/` on `Int3` truncates toward zero like `i32` does. Anything that maps a
//! world voxel to the chunk that owns it must use [`Int3::div_floor`]
//! instead, otherwise voxel `-1` lands in chunk `0`.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Shl, Shr, Sub};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Floor division on `i32` (rounds toward negative infinity).
#[inline]
#[must_use]
pub const fn floor_div(a: i32, b: i32) -> i32 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Ceiling division on `i32` (rounds toward positive infinity).
#[inline]
#[must_use]
pub const fn ceil_div(a: i32, b: i32) -> i32 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

/// 3D integer vector.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize,
    Deserialize,
)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Int3 {
    /// X component.
    pub x: i32,
    /// Y component.
    pub y: i32,
    /// Z component (up).
    pub z: i32,
}

impl Int3 {
    /// All zeros.
    pub const ZERO: Self = Self::splat(0);
    /// All ones.
    pub const ONE: Self = Self::splat(1);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same value on every axis.
    #[inline]
    #[must_use]
    pub const fn splat(v: i32) -> Self {
        Self::new(v, v, v)
    }

    /// Component-wise floor division.
    #[inline]
    #[must_use]
    pub const fn div_floor(self, rhs: Self) -> Self {
        Self::new(
            floor_div(self.x, rhs.x),
            floor_div(self.y, rhs.y),
            floor_div(self.z, rhs.z),
        )
    }

    /// Component-wise ceiling division.
    #[inline]
    #[must_use]
    pub const fn div_ceil(self, rhs: Self) -> Self {
        Self::new(
            ceil_div(self.x, rhs.x),
            ceil_div(self.y, rhs.y),
            ceil_div(self.z, rhs.z),
        )
    }

    /// Component-wise remainder matching [`Int3::div_floor`].
    ///
    /// For positive `rhs` every component lands in `0..rhs`.
    #[inline]
    #[must_use]
    pub const fn rem_floor(self, rhs: Self) -> Self {
        Self::new(
            self.x - floor_div(self.x, rhs.x) * rhs.x,
            self.y - floor_div(self.y, rhs.y) * rhs.y,
            self.z - floor_div(self.z, rhs.z) * rhs.z,
        )
    }

    /// Component-wise minimum.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Component-wise clamp into `[lo, hi]`.
    #[inline]
    #[must_use]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// Rounds every component of `v` down.
    #[inline]
    #[must_use]
    pub fn floor(v: Vec3) -> Self {
        Self::new(v.x.floor() as i32, v.y.floor() as i32, v.z.floor() as i32)
    }

    /// Rounds every component of `v` up.
    #[inline]
    #[must_use]
    pub fn ceil(v: Vec3) -> Self {
        Self::new(v.x.ceil() as i32, v.y.ceil() as i32, v.z.ceil() as i32)
    }

    /// `x * y * z` widened to `i64`.
    #[inline]
    #[must_use]
    pub const fn product(self) -> i64 {
        self.x as i64 * self.y as i64 * self.z as i64
    }

    /// True if every component of `self` is strictly less than `other`'s.
    #[inline]
    #[must_use]
    pub const fn all_lt(self, other: Self) -> bool {
        self.x < other.x && self.y < other.y && self.z < other.z
    }

    /// True if every component of `self` is less than or equal to `other`'s.
    #[inline]
    #[must_use]
    pub const fn all_le(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    /// Converts to array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for Int3 {
    fn from(a: [i32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl From<Int3> for [i32; 3] {
    fn from(v: Int3) -> Self {
        v.to_array()
    }
}

impl fmt::Display for Int3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

impl Add for Int3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Int3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Int3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<i32> for Int3 {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Truncating division, like `i32 / i32`. Use [`Int3::div_floor`] for grid math.
impl Div for Int3 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

impl Neg for Int3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Component-wise left shift.
impl Shl<u32> for Int3 {
    type Output = Self;
    fn shl(self, rhs: u32) -> Self {
        Self::new(self.x << rhs, self.y << rhs, self.z << rhs)
    }
}

/// Component-wise arithmetic right shift: floor division by `2^rhs`.
impl Shr<u32> for Int3 {
    type Output = Self;
    fn shr(self, rhs: u32) -> Self {
        Self::new(self.x >> rhs, self.y >> rhs, self.z >> rhs)
    }
}

/// Chunk index in the world grid.
///
/// This is an index, not a voxel position: chunk `(1, 0, 0)` with a chunk
/// size of 16 starts at voxel `(16, 0, 0)`. See [`ChunkCoord::origin`].
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct ChunkCoord(pub Int3);

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Int3::new(x, y, z))
    }

    /// Returns the chunk index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Int3 {
        self.0
    }

    /// Returns the chunk that owns a world voxel.
    #[inline]
    #[must_use]
    pub const fn containing(world_voxel: Int3, chunk_size: Int3) -> Self {
        Self(world_voxel.div_floor(chunk_size))
    }

    /// Returns the world voxel position of the chunk's min corner.
    #[inline]
    #[must_use]
    pub fn origin(self, chunk_size: Int3) -> Int3 {
        self.0 * chunk_size
    }

    /// Returns the chunk displaced by `delta` chunks.
    #[inline]
    #[must_use]
    pub fn offset(self, delta: Int3) -> Self {
        Self(self.0 + delta)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 3D float vector - view positions.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Same value on every axis
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_division_negative() {
        let size = Int3::splat(16);
        assert_eq!(Int3::new(0, 15, 16).div_floor(size), Int3::new(0, 0, 1));
        assert_eq!(Int3::new(-1, -16, -17).div_floor(size), Int3::new(-1, -1, -2));
        // Plain `/` truncates - this is exactly the bug div_floor exists for.
        assert_eq!(Int3::new(-1, -1, -1) / size, Int3::ZERO);
    }

    #[test]
    fn test_ceil_division() {
        let size = Int3::splat(4);
        assert_eq!(Int3::new(0, 1, 4).div_ceil(size), Int3::new(0, 1, 1));
        assert_eq!(Int3::new(5, -1, -4).div_ceil(size), Int3::new(2, 0, -1));
        assert_eq!(Int3::new(-5, -8, -9).div_ceil(size), Int3::new(-1, -2, -2));
    }

    #[test]
    fn test_rem_floor_in_range() {
        let size = Int3::new(16, 8, 4);
        for v in -40..40 {
            let r = Int3::splat(v).rem_floor(size);
            assert!(Int3::ZERO.all_le(r) && r.all_lt(size), "{v} -> {r}");
            assert_eq!(Int3::splat(v).div_floor(size) * size + r, Int3::splat(v));
        }
    }

    #[test]
    fn test_chunk_coord_containing() {
        let size = Int3::new(16, 16, 32);
        assert_eq!(ChunkCoord::containing(Int3::new(-1, 0, 31), size), ChunkCoord::new(-1, 0, 0));
        assert_eq!(ChunkCoord::containing(Int3::new(-16, 16, 32), size), ChunkCoord::new(-1, 1, 1));
        assert_eq!(ChunkCoord::new(-1, 2, 1).origin(size), Int3::new(-16, 32, 32));
    }

    #[test]
    fn test_floor_ceil_from_float() {
        let v = Vec3::new(-0.5, 1.5, 2.0);
        assert_eq!(Int3::floor(v), Int3::new(-1, 1, 2));
        assert_eq!(Int3::ceil(v), Int3::new(0, 2, 2));
    }

    #[test]
    fn test_shifts_match_power_of_two_scaling() {
        let v = Int3::new(-17, 0, 33);
        assert_eq!(v << 4, v * 16);
        // Right shift rounds toward negative infinity, like div_floor.
        assert_eq!(v >> 4, v.div_floor(Int3::splat(16)));
        assert_eq!(Int3::new(-1, -16, 15) >> 4, Int3::new(-1, -1, 0));
    }
}

//! Face directions and the fixed cube tables.
//!
//! Cube corner `i` (0..8) sits at `((i >> 2) & 1, (i >> 1) & 1, i & 1)`
//! relative to the cell's min corner. Each face lists its four corners
//! clockwise as seen from outside the cell; triangles are `c0 c1 c2` and
//! `c0 c2 c3`.

use voxstream_shared::Int3;

/// One of the six axis-aligned face directions.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceDirection {
    /// +X
    PosX = 0,
    /// -X
    NegX = 1,
    /// +Y
    PosY = 2,
    /// -Y
    NegY = 3,
    /// +Z (top)
    PosZ = 4,
    /// -Z
    NegZ = 5,
}

const FACE_CORNERS: [[u8; 4]; 6] = [
    [4, 5, 7, 6],
    [0, 2, 3, 1],
    [2, 6, 7, 3],
    [0, 1, 5, 4],
    [1, 3, 7, 5],
    [0, 4, 6, 2],
];

impl FaceDirection {
    /// All directions in emission order.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Position in [`FaceDirection::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Offset to the cell across this face.
    #[inline]
    #[must_use]
    pub const fn normal(self) -> Int3 {
        match self {
            Self::PosX => Int3::new(1, 0, 0),
            Self::NegX => Int3::new(-1, 0, 0),
            Self::PosY => Int3::new(0, 1, 0),
            Self::NegY => Int3::new(0, -1, 0),
            Self::PosZ => Int3::new(0, 0, 1),
            Self::NegZ => Int3::new(0, 0, -1),
        }
    }

    /// Cube corners of this face, in winding order.
    #[inline]
    #[must_use]
    pub const fn corners(self) -> [u8; 4] {
        FACE_CORNERS[self as usize]
    }

    /// True for `+Z`, the face that takes a material's top override.
    #[inline]
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::PosZ)
    }
}

/// Offset of cube corner `i` from the cell's min corner.
#[inline]
#[must_use]
pub const fn corner_offset(i: u8) -> Int3 {
    Int3::new(((i >> 2) & 1) as i32, ((i >> 1) & 1) as i32, (i & 1) as i32)
}

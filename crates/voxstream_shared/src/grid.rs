//! # Voxel Grid Data
//!
//! One chunk's material indices, corner-padded: local coordinates run
//! `0..=size` on every axis, so the cell one step past the chunk's upper
//! faces is stored alongside the interior.
//!
//! Layout: `cells[(x * (sy + 1) + y) * (sz + 1) + z]` (Z fastest).
//!
//! Grids are constant once built and are shared as `Arc<VoxelGridData>`.

use crate::error::{ConfigError, ConfigResult};
use crate::math::{ChunkCoord, Int3};

/// Material indices for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGridData {
    coord: ChunkCoord,
    chunk_size: Int3,
    cells: Box<[u16]>,
}

impl VoxelGridData {
    /// Builds a grid by evaluating `f` at every padded local coordinate.
    ///
    /// `f` is called in storage order (X outer, Z inner).
    #[must_use]
    pub fn from_fn(coord: ChunkCoord, chunk_size: Int3, mut f: impl FnMut(Int3) -> u16) -> Self {
        let dims = chunk_size + Int3::ONE;
        let mut cells = Vec::with_capacity(dims.product().max(0) as usize);
        for x in 0..dims.x {
            for y in 0..dims.y {
                for z in 0..dims.z {
                    cells.push(f(Int3::new(x, y, z)));
                }
            }
        }
        Self {
            coord,
            chunk_size,
            cells: cells.into_boxed_slice(),
        }
    }

    /// Grid with every cell set to `value`.
    #[must_use]
    pub fn filled(coord: ChunkCoord, chunk_size: Int3, value: u16) -> Self {
        Self::from_fn(coord, chunk_size, |_| value)
    }

    /// Wraps an existing cell buffer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CellCountMismatch` if `cells` is not exactly
    /// `(sx+1)(sy+1)(sz+1)` long.
    pub fn from_cells(coord: ChunkCoord, chunk_size: Int3, cells: Box<[u16]>) -> ConfigResult<Self> {
        let expected = (chunk_size + Int3::ONE).product().max(0) as usize;
        if cells.len() != expected {
            return Err(ConfigError::CellCountMismatch {
                size: chunk_size,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            coord,
            chunk_size,
            cells,
        })
    }

    /// Chunk this grid belongs to.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Interior size in voxels.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> Int3 {
        self.chunk_size
    }

    /// World voxel position of local `(0, 0, 0)`.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Int3 {
        self.coord.origin(self.chunk_size)
    }

    /// Raw cells in storage order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// True if `local` is inside the padded range `0..=size`.
    #[inline]
    #[must_use]
    pub const fn contains_local(&self, local: Int3) -> bool {
        Int3::ZERO.all_le(local) && local.all_le(self.chunk_size)
    }

    /// Storage index of a padded local coordinate.
    #[inline]
    #[must_use]
    pub fn index_of(&self, local: Int3) -> Option<usize> {
        if !self.contains_local(local) {
            return None;
        }
        let dims = self.chunk_size + Int3::ONE;
        Some(((local.x * dims.y + local.y) * dims.z + local.z) as usize)
    }

    /// Material index at a padded local coordinate.
    #[inline]
    #[must_use]
    pub fn get(&self, local: Int3) -> Option<u16> {
        self.index_of(local).map(|i| self.cells[i])
    }

    /// Material index at a world voxel, if this grid stores it.
    #[inline]
    #[must_use]
    pub fn get_world(&self, world_voxel: Int3) -> Option<u16> {
        self.get(world_voxel - self.origin())
    }

    /// True if every stored cell equals `value`.
    #[must_use]
    pub fn is_uniform(&self, value: u16) -> bool {
        self.cells.iter().all(|&c| c == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_layout() {
        let size = Int3::new(2, 3, 4);
        let grid = VoxelGridData::from_fn(ChunkCoord::new(0, 0, 0), size, |p| {
            (p.x * 100 + p.y * 10 + p.z) as u16
        });
        assert_eq!(grid.cells().len(), 3 * 4 * 5);
        assert_eq!(grid.index_of(Int3::new(1, 2, 3)), Some((4 + 2) * 5 + 3));
        assert_eq!(grid.get(Int3::new(2, 3, 4)), Some(234));
        assert_eq!(grid.get(Int3::new(3, 0, 0)), None);
        assert_eq!(grid.get(Int3::new(0, -1, 0)), None);
    }

    #[test]
    fn test_world_lookup_uses_origin() {
        let size = Int3::splat(4);
        let grid = VoxelGridData::from_fn(ChunkCoord::new(-1, 0, 2), size, |p| p.z as u16);
        assert_eq!(grid.origin(), Int3::new(-4, 0, 8));
        assert_eq!(grid.get_world(Int3::new(-4, 0, 11)), Some(3));
        // The padding row belongs to the next chunk up but is stored here.
        assert_eq!(grid.get_world(Int3::new(0, 4, 12)), Some(4));
        assert_eq!(grid.get_world(Int3::new(-5, 0, 8)), None);
    }

    #[test]
    fn test_from_cells_checks_length() {
        let size = Int3::splat(1);
        assert!(VoxelGridData::from_cells(ChunkCoord::default(), size, vec![0; 8].into()).is_ok());
        assert_eq!(
            VoxelGridData::from_cells(ChunkCoord::default(), size, vec![0; 7].into()),
            Err(ConfigError::CellCountMismatch {
                size,
                expected: 8,
                actual: 7
            })
        );
    }

    #[test]
    fn test_uniform() {
        let grid = VoxelGridData::filled(ChunkCoord::default(), Int3::splat(3), 5);
        assert!(grid.is_uniform(5));
        assert!(!grid.is_uniform(0));
    }
}

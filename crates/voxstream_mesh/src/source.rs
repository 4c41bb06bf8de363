//! Where the extractor reads material indices from.

use voxstream_shared::{Int3, VoxelGridData};

/// Answers material lookups by world voxel position.
///
/// Lookups with no data behind them return the empty material index.
pub trait VoxelSource {
    /// Material index at a world voxel.
    fn material_index(&self, world_voxel: Int3) -> u16;
}

impl<S: VoxelSource + ?Sized> VoxelSource for &S {
    #[inline]
    fn material_index(&self, world_voxel: Int3) -> u16 {
        (**self).material_index(world_voxel)
    }
}

/// A single grid with nothing around it.
#[derive(Clone, Copy, Debug)]
pub struct GridSource<'a> {
    grid: &'a VoxelGridData,
    empty_index: u16,
    min: Int3,
    max: Int3,
}

impl<'a> GridSource<'a> {
    /// Wraps a grid; lookups outside its padded range return `empty_index`.
    #[must_use]
    pub const fn new(grid: &'a VoxelGridData, empty_index: u16) -> Self {
        Self {
            grid,
            empty_index,
            min: Int3::splat(i32::MIN),
            max: Int3::splat(i32::MAX),
        }
    }

    /// Also treats cells outside `[min, max)` as empty, padding included.
    #[must_use]
    pub const fn within(mut self, min: Int3, max: Int3) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

impl VoxelSource for GridSource<'_> {
    #[inline]
    fn material_index(&self, world_voxel: Int3) -> u16 {
        if !(self.min.all_le(world_voxel) && world_voxel.all_lt(self.max)) {
            return self.empty_index;
        }
        self.grid.get_world(world_voxel).unwrap_or(self.empty_index)
    }
}

/// Same material everywhere. Handy for testing interior behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSource(pub u16);

impl VoxelSource for UniformSource {
    #[inline]
    fn material_index(&self, _world_voxel: Int3) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxstream_shared::ChunkCoord;

    #[test]
    fn test_grid_source_misses_are_empty() {
        let grid = VoxelGridData::filled(ChunkCoord::new(1, 0, 0), Int3::splat(2), 4);
        let source = GridSource::new(&grid, 9);
        assert_eq!(source.material_index(Int3::new(2, 0, 0)), 4);
        assert_eq!(source.material_index(Int3::new(4, 2, 2)), 4);
        assert_eq!(source.material_index(Int3::new(1, 0, 0)), 9);
        assert_eq!(source.material_index(Int3::new(5, 0, 0)), 9);
    }

    #[test]
    fn test_grid_source_respects_world_bounds() {
        let grid = VoxelGridData::filled(ChunkCoord::new(0, 0, 0), Int3::splat(2), 4);
        let source = GridSource::new(&grid, 9).within(Int3::ZERO, Int3::new(1, 8, 8));
        assert_eq!(source.material_index(Int3::new(0, 2, 2)), 4);
        // Padding cell past the world edge.
        assert_eq!(source.material_index(Int3::new(1, 0, 0)), 9);
        assert_eq!(source.material_index(Int3::new(2, 2, 2)), 9);
    }
}

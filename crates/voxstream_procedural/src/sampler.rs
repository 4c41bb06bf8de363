//! # Terrain Samplers
//!
//! A sampler produces the corner-padded material grid of one chunk. It is
//! called once per chunk lifetime in the cache and must be pure: sampling
//! the same coordinate twice yields the same grid.

use tracing::trace;
use voxstream_shared::{ChunkCoord, GridParameters, Int3, VoxelGridData};

use crate::height::{column_height, FractalHeightField, HeightField};
use crate::noise::{FractalParams, NoiseSeed};

/// Produces the padded voxel grid for a chunk.
pub trait TerrainSampler: Send + Sync {
    /// Samples `(size + 1)³` cells starting at the chunk origin.
    fn sample(&self, coord: ChunkCoord, params: &GridParameters) -> VoxelGridData;
}

impl<F> TerrainSampler for F
where
    F: Fn(ChunkCoord, &GridParameters) -> VoxelGridData + Send + Sync,
{
    #[inline]
    fn sample(&self, coord: ChunkCoord, params: &GridParameters) -> VoxelGridData {
        self(coord, params)
    }
}

/// Column terrain from a height field.
///
/// Every cell below its column height gets `fill_material`; everything at or
/// above gets the empty material. An optional surface material replaces the
/// top solid cell of each column.
#[derive(Clone)]
pub struct HeightmapSampler<H> {
    field: H,
    fill_material: u16,
    surface_material: Option<u16>,
}

impl<H: HeightField> HeightmapSampler<H> {
    /// Creates a sampler filling solid cells with `fill_material`.
    #[must_use]
    pub const fn new(field: H, fill_material: u16) -> Self {
        Self {
            field,
            fill_material,
            surface_material: None,
        }
    }

    /// Uses `material` for the top solid cell of every column.
    #[must_use]
    pub const fn with_surface(mut self, material: u16) -> Self {
        self.surface_material = Some(material);
        self
    }

    /// The underlying height field.
    #[must_use]
    pub const fn field(&self) -> &H {
        &self.field
    }

    fn cell(&self, world_z: i32, height: i32, empty: u16) -> u16 {
        if world_z >= height {
            return empty;
        }
        match self.surface_material {
            Some(surface) if world_z == height - 1 => surface,
            _ => self.fill_material,
        }
    }
}

impl HeightmapSampler<FractalHeightField> {
    /// Fractal simplex terrain filled with material `1`.
    #[must_use]
    pub fn fractal(seed: NoiseSeed, params: FractalParams) -> Self {
        Self::new(FractalHeightField::new(seed, params), 1)
    }
}

impl<H: HeightField> TerrainSampler for HeightmapSampler<H> {
    fn sample(&self, coord: ChunkCoord, params: &GridParameters) -> VoxelGridData {
        let size = params.chunk_size;
        let origin = coord.origin(size);
        let columns_y = size.y + 1;

        // One height per padded column, reused down the whole Z run.
        let mut heights = Vec::with_capacity(((size.x + 1) * columns_y) as usize);
        for x in 0..=size.x {
            for y in 0..=size.y {
                let sample = self
                    .field
                    .height(f64::from(origin.x + x), f64::from(origin.y + y));
                heights.push(column_height(sample, params.max_height));
            }
        }

        let empty = params.empty_material_index;
        let grid = VoxelGridData::from_fn(coord, size, |p: Int3| {
            let height = heights[(p.x * columns_y + p.y) as usize];
            self.cell(origin.z + p.z, height, empty)
        });
        trace!(%coord, "sampled terrain chunk");
        grid
    }
}

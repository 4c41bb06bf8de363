//! # Grid Parameters
//!
//! The immutable configuration of one streaming session: material table,
//! chunk dimensions, world bounds and render distance.
//!
//! Parameters are validated once, before streaming starts. Nothing in the
//! streaming or meshing path re-checks them.
//!
//! ## TOML layout
//!
//! ```toml
//! empty_material_index = 0
//! max_render_distance = 96
//! chunk_size = [16, 16, 16]
//! min_coordinate = [-4096, -4096, 0]
//! max_coordinate = [4096, 4096, 64]
//! max_height = 64
//!
//! [[materials]]
//! surface_material = 0
//!
//! [[materials]]
//! surface_material = 1
//! top_surface_material = 2
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::math::Int3;

/// Largest number of corner vertices a chunk may have (16-bit index space).
pub const MAX_CHUNK_CORNERS: i64 = 65_536;

/// How a surface material blends with what is behind it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Fully opaque.
    #[default]
    Opaque,
    /// Alpha-tested; still occludes like an opaque surface.
    Masked,
    /// Alpha-blended; lets faces behind it show through.
    Translucent,
}

impl BlendMode {
    /// Returns true for alpha-blended materials.
    #[inline]
    #[must_use]
    pub const fn is_translucent(self) -> bool {
        matches!(self, Self::Translucent)
    }
}

/// Renderer-side surface material handle.
///
/// The grid never interprets this value; it is handed back to the render
/// collaborator in every draw element.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceMaterialId(pub u32);

/// One entry of the material table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Material drawn on every face.
    pub surface_material: SurfaceMaterialId,
    /// Optional override for the `+Z` (top) face.
    #[serde(default)]
    pub top_surface_material: Option<SurfaceMaterialId>,
    /// Blend mode of `surface_material`.
    #[serde(default)]
    pub blend_mode: BlendMode,
}

impl MaterialDef {
    /// Creates an opaque material with no top override.
    #[must_use]
    pub const fn opaque(surface: u32) -> Self {
        Self {
            surface_material: SurfaceMaterialId(surface),
            top_surface_material: None,
            blend_mode: BlendMode::Opaque,
        }
    }

    /// Creates a translucent material with no top override.
    #[must_use]
    pub const fn translucent(surface: u32) -> Self {
        Self {
            surface_material: SurfaceMaterialId(surface),
            top_surface_material: None,
            blend_mode: BlendMode::Translucent,
        }
    }

    /// Sets the `+Z` face override.
    #[must_use]
    pub const fn with_top(mut self, top: u32) -> Self {
        self.top_surface_material = Some(SurfaceMaterialId(top));
        self
    }

    /// Surface material for a face.
    ///
    /// `is_top` selects the `+Z` override, which only applies when it is set
    /// and differs from the base surface.
    #[inline]
    #[must_use]
    pub fn surface_for(&self, is_top: bool) -> SurfaceMaterialId {
        match self.top_surface_material {
            Some(top) if is_top && top != self.surface_material => top,
            _ => self.surface_material,
        }
    }
}

/// Session-wide grid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridParameters {
    /// Material table, indexed by the values stored in voxel grids.
    pub materials: Vec<MaterialDef>,
    /// Material index that means "nothing here".
    pub empty_material_index: u16,
    /// Cylindrical render radius in voxels.
    pub max_render_distance: i32,
    /// Voxels per chunk on each axis.
    pub chunk_size: Int3,
    /// World bounds, inclusive.
    pub min_coordinate: Int3,
    /// World bounds, exclusive.
    pub max_coordinate: Int3,
    /// Terrain height range handed to the sampler.
    pub max_height: i32,
}

impl GridParameters {
    /// Two materials (empty + opaque ground), 16³ chunks, 64 voxel radius.
    #[must_use]
    pub fn terrain_default() -> Self {
        Self {
            materials: vec![MaterialDef::opaque(0), MaterialDef::opaque(1)],
            empty_material_index: 0,
            max_render_distance: 64,
            chunk_size: Int3::splat(16),
            min_coordinate: Int3::new(-4096, -4096, 0),
            max_coordinate: Int3::new(4096, 4096, 64),
            max_height: 64,
        }
    }

    /// Replaces the material table.
    #[must_use]
    pub fn with_materials(mut self, materials: Vec<MaterialDef>) -> Self {
        self.materials = materials;
        self
    }

    /// Replaces the chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: Int3) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Replaces the world bounds.
    #[must_use]
    pub const fn with_bounds(mut self, min: Int3, max: Int3) -> Self {
        self.min_coordinate = min;
        self.max_coordinate = max;
        self
    }

    /// Replaces the render distance.
    #[must_use]
    pub const fn with_render_distance(mut self, distance: i32) -> Self {
        self.max_render_distance = distance;
        self
    }

    /// Replaces the max terrain height.
    #[must_use]
    pub const fn with_max_height(mut self, height: i32) -> Self {
        self.max_height = height;
        self
    }

    /// Parses and validates parameters from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed text and any
    /// [`GridParameters::validate`] error for a bad configuration.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let params: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serializes to TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks every invariant the streamer and extractor rely on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.materials.is_empty() {
            return Err(ConfigError::NoMaterials);
        }
        if self.materials.len() > usize::from(u16::MAX) + 1 {
            return Err(ConfigError::TooManyMaterials(self.materials.len()));
        }
        if usize::from(self.empty_material_index) >= self.materials.len() {
            return Err(ConfigError::EmptyIndexOutOfRange {
                index: self.empty_material_index,
                count: self.materials.len(),
            });
        }
        if !Int3::ZERO.all_lt(self.chunk_size) {
            return Err(ConfigError::NonPositiveChunkSize(self.chunk_size));
        }
        let corners = self.corner_count();
        if corners > MAX_CHUNK_CORNERS {
            return Err(ConfigError::TooManyCorners {
                size: self.chunk_size,
                corners,
            });
        }
        if !self.min_coordinate.all_lt(self.max_coordinate) {
            return Err(ConfigError::EmptyWorldBounds {
                min: self.min_coordinate,
                max: self.max_coordinate,
            });
        }
        if self.max_render_distance <= 0 {
            return Err(ConfigError::NonPositiveRenderDistance(self.max_render_distance));
        }
        if self.max_height < 0 {
            return Err(ConfigError::NegativeMaxHeight(self.max_height));
        }
        Ok(())
    }

    /// Corner lattice size of one chunk: `(sx+1)(sy+1)(sz+1)`.
    #[inline]
    #[must_use]
    pub fn corner_count(&self) -> i64 {
        let s = self.chunk_size;
        (i64::from(s.x) + 1)
            .saturating_mul(i64::from(s.y) + 1)
            .saturating_mul(i64::from(s.z) + 1)
    }

    /// True if a world voxel lies inside `[min_coordinate, max_coordinate)`.
    #[inline]
    #[must_use]
    pub fn in_world(&self, voxel: Int3) -> bool {
        self.min_coordinate.all_le(voxel) && voxel.all_lt(self.max_coordinate)
    }

    /// Looks up a material definition.
    #[inline]
    #[must_use]
    pub fn material(&self, index: u16) -> Option<&MaterialDef> {
        self.materials.get(usize::from(index))
    }

    /// `max_render_distance²` widened to `i64`.
    #[inline]
    #[must_use]
    pub const fn render_distance_squared(&self) -> i64 {
        self.max_render_distance as i64 * self.max_render_distance as i64
    }
}

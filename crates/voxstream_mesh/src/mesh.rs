//! Mesh output types.
//!
//! `MeshBuildResult` is a plain value. The renderer uploads `vertices` and
//! `indices` as-is and issues one draw call per [`DrawElement`].

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use voxstream_shared::SurfaceMaterialId;

use crate::face::FaceDirection;

/// Lattice corner position, local to the chunk origin (`0..=chunk_size`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable, PartialEq, Eq, Hash)]
pub struct GridVertex {
    /// X, Y, Z in voxels.
    pub position: [u16; 3],
}

impl GridVertex {
    /// Creates a vertex.
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// One draw call: a contiguous index run with a single material and face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawElement {
    /// Offset into [`MeshBuildResult::indices`].
    pub first_index: u32,
    /// Number of triangles (indices / 3).
    pub triangle_count: u32,
    /// Renderer material for this batch.
    pub material: SurfaceMaterialId,
    /// Grid material index the batch was built from.
    pub material_index: u16,
    /// Face direction shared by every triangle in the batch.
    pub face: FaceDirection,
}

impl DrawElement {
    /// Index range covered by this element.
    #[inline]
    #[must_use]
    pub const fn index_range(&self) -> Range<usize> {
        let start = self.first_index as usize;
        start..start + self.triangle_count as usize * 3
    }
}

/// Surface mesh of one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshBuildResult {
    /// Active lattice corners.
    pub vertices: Vec<GridVertex>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u16>,
    /// Batches, ordered by material index then face direction.
    pub elements: Vec<DrawElement>,
}

impl MeshBuildResult {
    /// True if there is nothing to draw.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total triangles across all elements.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles facing `face`, summed over materials.
    #[must_use]
    pub fn triangles_facing(&self, face: FaceDirection) -> usize {
        self.elements
            .iter()
            .filter(|e| e.face == face)
            .map(|e| e.triangle_count as usize)
            .sum()
    }

    /// Indices of one element.
    #[inline]
    #[must_use]
    pub fn element_indices(&self, element: &DrawElement) -> &[u16] {
        &self.indices[element.index_range()]
    }

    /// Vertex buffer bytes.
    #[inline]
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer bytes.
    #[inline]
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<GridVertex>(), 6);
        let mesh = MeshBuildResult {
            vertices: vec![GridVertex::new(1, 2, 3), GridVertex::new(4, 5, 6)],
            indices: vec![0, 1, 0],
            elements: Vec::new(),
        };
        assert_eq!(mesh.vertex_bytes().len(), 12);
        assert_eq!(mesh.index_bytes().len(), 6);
        assert_eq!(&mesh.vertex_bytes()[..2], &1u16.to_ne_bytes());
    }

    #[test]
    fn test_element_ranges() {
        let element = DrawElement {
            first_index: 6,
            triangle_count: 2,
            material: SurfaceMaterialId(1),
            material_index: 1,
            face: FaceDirection::PosZ,
        };
        assert_eq!(element.index_range(), 6..12);
    }
}

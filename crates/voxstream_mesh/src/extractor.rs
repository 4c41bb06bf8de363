//! # Voxel Surface Extraction
//!
//! Converts a chunk of material indices into a culled triangle mesh.
//!
//! ## Algorithm
//!
//! 1. Classify every cell of the chunk plus a one-cell border
//! 2. Pass A: a lattice corner is *active* if its 8 surrounding cells do not
//!    all share one visibility class; active corners become vertices
//! 3. Pass B: for every cell and face direction, emit the face iff the
//!    cell's class strictly outranks the neighbour's
//! 4. Concatenate batches in (material index, face) order
//!
//! Iteration is X outer, Z inner in both passes, so output is bit-for-bit
//! reproducible.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{trace, warn};
use voxstream_shared::{ChunkCoord, GridParameters, Int3, VoxelGridData};

use crate::face::{corner_offset, FaceDirection};
use crate::mesh::{DrawElement, GridVertex, MeshBuildResult};
use crate::source::{GridSource, VoxelSource};
use crate::visibility::{VisibilityClass, VisibilityClassifier};

/// Builds slower than this are logged at `warn`.
pub const SLOW_BUILD_THRESHOLD: Duration = Duration::from_millis(10);

/// Surface extractor.
///
/// Holds scratch buffers only; no state carries over between builds. Keep
/// one per worker thread to avoid reallocating.
#[derive(Debug, Default)]
pub struct VoxelMeshExtractor {
    /// Classes over the chunk region plus a one-cell border.
    classes: Vec<VisibilityClass>,
    /// Material indices, same layout as `classes`.
    materials: Vec<u16>,
    /// Lattice corner -> vertex index (0 for inactive corners).
    vertex_map: Vec<u16>,
}

/// Dense box of cells, `(x * dy + y) * dz + z`.
#[derive(Clone, Copy)]
struct Layout {
    dims: Int3,
}

impl Layout {
    #[inline]
    fn index(self, p: Int3) -> usize {
        ((p.x * self.dims.y + p.y) * self.dims.z + p.z) as usize
    }

    #[inline]
    fn len(self) -> usize {
        self.dims.product() as usize
    }
}

impl VoxelMeshExtractor {
    /// Creates an extractor with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the surface of chunk `coord`.
    ///
    /// The region is the chunk clipped to the world bounds. Returns `None`
    /// when no cell in that region is visible; a visible region with no
    /// exposed faces yields an empty mesh.
    pub fn extract<S: VoxelSource + ?Sized>(
        &mut self,
        source: &S,
        coord: ChunkCoord,
        params: &GridParameters,
        classifier: &VisibilityClassifier,
    ) -> Option<MeshBuildResult> {
        let start = Instant::now();
        let origin = coord.origin(params.chunk_size);
        let min = origin.max(params.min_coordinate);
        let max = (origin + params.chunk_size).min(params.max_coordinate);
        if !min.all_lt(max) {
            return None;
        }
        let extent = max - min;

        // Border cells sit at index 0 and extent + 1 on each axis.
        let cells = Layout {
            dims: extent + Int3::splat(2),
        };
        if !self.load_cells(source, classifier, min - Int3::ONE, cells) {
            trace!(%coord, "chunk has no visible cells");
            return None;
        }

        let lattice = Layout {
            dims: extent + Int3::ONE,
        };
        let vertices = self.collect_vertices(cells, lattice, min - origin);
        let batches = self.collect_faces(cells, lattice, extent);

        let mut indices = Vec::with_capacity(batches.values().map(Vec::len).sum());
        let mut elements = Vec::with_capacity(batches.len());
        for ((material_index, face), batch) in batches {
            let Some(def) = params.material(material_index) else {
                continue;
            };
            elements.push(DrawElement {
                first_index: indices.len() as u32,
                triangle_count: (batch.len() / 3) as u32,
                material: def.surface_for(face.is_top()),
                material_index,
                face,
            });
            indices.extend_from_slice(&batch);
        }

        let elapsed = start.elapsed();
        if elapsed > SLOW_BUILD_THRESHOLD {
            warn!(
                %coord,
                elapsed_ms = elapsed.as_millis() as u64,
                triangles = indices.len() / 3,
                "slow mesh build"
            );
        } else {
            trace!(%coord, vertices = vertices.len(), elements = elements.len(), "mesh built");
        }

        Some(MeshBuildResult {
            vertices,
            indices,
            elements,
        })
    }

    /// Extracts a standalone grid. Lookups outside the grid or the world
    /// bounds are empty.
    ///
    /// The grid's chunk size must match `params.chunk_size`.
    pub fn extract_grid(
        &mut self,
        grid: &VoxelGridData,
        params: &GridParameters,
        classifier: &VisibilityClassifier,
    ) -> Option<MeshBuildResult> {
        debug_assert_eq!(grid.chunk_size(), params.chunk_size);
        let source = GridSource::new(grid, classifier.empty_index())
            .within(params.min_coordinate, params.max_coordinate);
        self.extract(&source, grid.coord(), params, classifier)
    }

    /// Fills the class and material caches. Returns true if any cell inside
    /// the region (not the border) is visible.
    fn load_cells<S: VoxelSource + ?Sized>(
        &mut self,
        source: &S,
        classifier: &VisibilityClassifier,
        base: Int3,
        cells: Layout,
    ) -> bool {
        self.classes.clear();
        self.materials.clear();
        self.classes.reserve(cells.len());
        self.materials.reserve(cells.len());

        let inner_max = cells.dims - Int3::ONE;
        let mut any_visible = false;
        for x in 0..cells.dims.x {
            for y in 0..cells.dims.y {
                for z in 0..cells.dims.z {
                    let p = Int3::new(x, y, z);
                    let material = source.material_index(base + p);
                    let class = classifier.classify(material);
                    if class != VisibilityClass::Empty && Int3::ONE.all_le(p) && p.all_lt(inner_max) {
                        any_visible = true;
                    }
                    self.materials.push(material);
                    self.classes.push(class);
                }
            }
        }
        any_visible
    }

    /// Pass A. `local_base` is the region min relative to the chunk origin.
    fn collect_vertices(&mut self, cells: Layout, lattice: Layout, local_base: Int3) -> Vec<GridVertex> {
        self.vertex_map.clear();
        self.vertex_map.resize(lattice.len(), 0);

        let mut vertices = Vec::new();
        for x in 0..lattice.dims.x {
            for y in 0..lattice.dims.y {
                for z in 0..lattice.dims.z {
                    let corner = Int3::new(x, y, z);
                    // Cell cache is offset by one, so the cells around lattice
                    // corner `c` are `c + {0,1}³` in cache space.
                    let first = self.classes[cells.index(corner)];
                    let mixed = (1..8u8)
                        .any(|i| self.classes[cells.index(corner + corner_offset(i))] != first);
                    if mixed {
                        self.vertex_map[lattice.index(corner)] = vertices.len() as u16;
                        let local = local_base + corner;
                        vertices.push(GridVertex::new(local.x as u16, local.y as u16, local.z as u16));
                    }
                }
            }
        }
        vertices
    }

    /// Pass B.
    fn collect_faces(
        &self,
        cells: Layout,
        lattice: Layout,
        extent: Int3,
    ) -> BTreeMap<(u16, FaceDirection), Vec<u16>> {
        let mut batches: BTreeMap<(u16, FaceDirection), Vec<u16>> = BTreeMap::new();
        for x in 0..extent.x {
            for y in 0..extent.y {
                for z in 0..extent.z {
                    let cell = Int3::new(x, y, z);
                    let at = cells.index(cell + Int3::ONE);
                    let class = self.classes[at];
                    if class == VisibilityClass::Empty {
                        continue;
                    }
                    for face in FaceDirection::ALL {
                        let neighbour = self.classes[cells.index(cell + Int3::ONE + face.normal())];
                        if class <= neighbour {
                            continue;
                        }
                        let [c0, c1, c2, c3] = face
                            .corners()
                            .map(|i| self.vertex_map[lattice.index(cell + corner_offset(i))]);
                        batches
                            .entry((self.materials[at], face))
                            .or_default()
                            .extend_from_slice(&[c0, c1, c2, c0, c2, c3]);
                    }
                }
            }
        }
        batches
    }
}

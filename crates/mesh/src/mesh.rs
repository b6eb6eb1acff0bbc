//! Module for mesh-related data and implementations

// crate modules
use crate::error::{Error, Result};
use crate::geometry::Geometry;

// wwforge modules
use wwforge_utils::ValueExt;

// external crates
use serde::{Deserialize, Serialize};

/// Structured 3D mesh used by mesh filters and weight window sets
///
/// The mesh is described by the number of voxels along each of the generic
/// (i, j, k) axes and the two corners of its bounding region. What i, j, and k
/// mean depends on the [Geometry]: (x, y, z) for rectangular and (r, phi, z)
/// for cylindrical meshes.
///
/// ## Cell indexing
///
/// There are two flat orderings of the cells of a mesh, and mixing them up
/// silently puts values in the wrong voxels.
///
/// - **bin order** is how a transport engine numbers mesh filter bins, with
///   `i` varying fastest, i.e. `index = i + j*ni + k*ni*nj`
/// - **grid order** is the dense `[ni][nj][nk]` layout used by weight window
///   bounds, with `k` varying fastest, i.e. `index = (i*nj + j)*nk + k`
///
/// ```rust
/// # use wwforge_mesh::SpatialMesh;
/// let mesh = SpatialMesh::regular(1, [2, 4, 3], [0.0; 3], [2.0, 4.0, 3.0]);
///
/// // The same voxel has different flat indices in the two orders
/// assert_eq!(mesh.ijk_to_bin_index(1, 2, 0), 5);
/// assert_eq!(mesh.ijk_to_grid_index(1, 2, 0), 18);
/// ```
///
/// Meshes are deliberately plain data. Weight window sets hold their own copy
/// so that changing a tally mesh later never alters windows that were already
/// generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialMesh {
    /// Mesh identifier
    pub id: u32,
    /// Mesh geometry type
    #[serde(default)]
    pub geometry: Geometry,
    /// Number of voxels along (i, j, k)
    pub dimension: [usize; 3],
    /// Lower corner of the mesh in (i, j, k)
    pub lower_left: [f64; 3],
    /// Upper corner of the mesh in (i, j, k)
    pub upper_right: [f64; 3],
}

impl SpatialMesh {
    /// Initialise a new rectangular mesh
    pub fn regular(
        id: u32,
        dimension: [usize; 3],
        lower_left: [f64; 3],
        upper_right: [f64; 3],
    ) -> Self {
        Self {
            id,
            geometry: Geometry::Rectangular,
            dimension,
            lower_left,
            upper_right,
        }
    }

    /// Initialise a new cylindrical mesh
    ///
    /// Bounds are given as (r, phi, z), with phi in radians.
    pub fn cylindrical(
        id: u32,
        dimension: [usize; 3],
        lower_left: [f64; 3],
        upper_right: [f64; 3],
    ) -> Self {
        Self {
            id,
            geometry: Geometry::Cylindrical,
            dimension,
            lower_left,
            upper_right,
        }
    }

    /// Check the mesh has at least one voxel along every axis
    pub fn validate(&self) -> Result<()> {
        if self.dimension.contains(&0) {
            return Err(Error::InvalidDimension(self.dimension));
        }
        Ok(())
    }

    /// Total number of voxels in the mesh
    ///
    /// ```rust
    /// # use wwforge_mesh::SpatialMesh;
    /// let mesh = SpatialMesh::regular(1, [2, 4, 3], [0.0; 3], [1.0; 3]);
    /// assert_eq!(mesh.n_cells(), 24);
    /// ```
    pub fn n_cells(&self) -> usize {
        self.dimension.iter().product()
    }

    /// Convert (i, j, k) indices to a bin order index
    pub fn ijk_to_bin_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [ni, nj, _] = self.dimension;
        i + j * ni + k * ni * nj
    }

    /// Find the (i, j, k) indices for a bin order index
    pub fn bin_index_to_ijk(&self, idx: usize) -> (usize, usize, usize) {
        let [ni, nj, _] = self.dimension;
        let k = idx / (ni * nj);
        let j = (idx - k * ni * nj) / ni;
        let i = idx - k * ni * nj - j * ni;
        (i, j, k)
    }

    /// Convert (i, j, k) indices to a grid order index
    pub fn ijk_to_grid_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [_, nj, nk] = self.dimension;
        (i * nj + j) * nk + k
    }

    /// Find the (i, j, k) indices for a grid order index
    pub fn grid_index_to_ijk(&self, idx: usize) -> (usize, usize, usize) {
        let [_, nj, nk] = self.dimension;
        let i = idx / (nj * nk);
        let j = (idx - i * nj * nk) / nk;
        let k = idx - i * nj * nk - j * nk;
        (i, j, k)
    }

    /// Convert from a bin order index to a grid order index
    pub fn bin_index_to_grid_index(&self, idx: usize) -> usize {
        let (i, j, k) = self.bin_index_to_ijk(idx);
        self.ijk_to_grid_index(i, j, k)
    }

    /// Convert from a grid order index to a bin order index
    pub fn grid_index_to_bin_index(&self, idx: usize) -> usize {
        let (i, j, k) = self.grid_index_to_ijk(idx);
        self.ijk_to_bin_index(i, j, k)
    }

    /// Checked conversion of (i, j, k) to a grid order index
    pub fn try_grid_index(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        let [ni, nj, nk] = self.dimension;
        if i >= ni || j >= nj || k >= nk {
            return Err(Error::IndexOutOfBounds {
                index: [i, j, k],
                dimension: self.dimension,
            });
        }
        Ok(self.ijk_to_grid_index(i, j, k))
    }
}

impl std::fmt::Display for SpatialMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [ni, nj, nk] = self.dimension;
        writeln!(f, "Mesh {} ({})", self.id, self.geometry.long_name())?;
        writeln!(f, "  dimension   : {ni} x {nj} x {nk}")?;
        writeln!(
            f,
            "  lower left  : {} {} {}",
            self.lower_left[0].sci(5, 2),
            self.lower_left[1].sci(5, 2),
            self.lower_left[2].sci(5, 2)
        )?;
        write!(
            f,
            "  upper right : {} {} {}",
            self.upper_right[0].sci(5, 2),
            self.upper_right[1].sci(5, 2),
            self.upper_right[2].sci(5, 2)
        )
    }
}

//! Reordering of flat per-voxel data between bin and grid order
//!
//! Engine results arrive flattened in bin order (i fastest). Reshaping that
//! directly into an `[ni][nj][nk]` array is wrong. The data must be viewed as
//! `[nk][nj][ni]` (the reversed dimension) and then transposed, which is what
//! [SpatialMesh::to_grid_order()] does in a single pass.

// crate modules
use crate::error::{Error, Result};
use crate::mesh::SpatialMesh;

// external crates
use log::trace;

impl SpatialMesh {
    /// Reorder a bin order slice into grid order
    ///
    /// Equivalent to reshaping with the reversed dimension and transposing.
    /// The slice must contain exactly one value per voxel.
    ///
    /// ```rust
    /// # use wwforge_mesh::SpatialMesh;
    /// let mesh = SpatialMesh::regular(1, [2, 1, 3], [0.0; 3], [1.0; 3]);
    ///
    /// // bin order: (0,0,0) (1,0,0) (0,0,1) (1,0,1) (0,0,2) (1,0,2)
    /// let binned = [0, 1, 2, 3, 4, 5];
    ///
    /// // grid order: (0,0,0) (0,0,1) (0,0,2) (1,0,0) (1,0,1) (1,0,2)
    /// assert_eq!(mesh.to_grid_order(&binned).unwrap(), vec![0, 2, 4, 1, 3, 5]);
    /// ```
    pub fn to_grid_order<T: Copy>(&self, values: &[T]) -> Result<Vec<T>> {
        self.check_length(values.len())?;
        trace!("Reordering {} values of mesh {} to grid order", values.len(), self.id);

        Ok((0..values.len())
            .map(|g| values[self.grid_index_to_bin_index(g)])
            .collect())
    }

    /// Reorder a grid order slice back into bin order
    ///
    /// Exact inverse of [SpatialMesh::to_grid_order()].
    ///
    /// ```rust
    /// # use wwforge_mesh::SpatialMesh;
    /// let mesh = SpatialMesh::regular(1, [2, 1, 3], [0.0; 3], [1.0; 3]);
    /// let grid = [0, 2, 4, 1, 3, 5];
    /// assert_eq!(mesh.to_bin_order(&grid).unwrap(), vec![0, 1, 2, 3, 4, 5]);
    /// ```
    pub fn to_bin_order<T: Copy>(&self, values: &[T]) -> Result<Vec<T>> {
        self.check_length(values.len())?;
        trace!("Reordering {} values of mesh {} to bin order", values.len(), self.id);

        Ok((0..values.len())
            .map(|b| values[self.bin_index_to_grid_index(b)])
            .collect())
    }

    fn check_length(&self, found: usize) -> Result<()> {
        let expected = self.n_cells();
        if found != expected {
            return Err(Error::UnexpectedNumberOfValues {
                id: self.id,
                expected,
                found,
            });
        }
        Ok(())
    }
}

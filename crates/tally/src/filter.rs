//! Tally filters

// wwforge modules
use wwforge_mesh::SpatialMesh;

// crate modules
use crate::particle::Particle;

// external crates
use serde::{Deserialize, Serialize};

/// A filter attached to a tally, splitting the score into bins
///
/// Only [Filter::Mesh], [Filter::Energy], and [Filter::Particle] can be used
/// for weight window generation. The other kinds exist so that any tally a
/// problem defines can be described, and rejected where it is incompatible.
///
/// Filters serialise as `{"type": "<kind>", "bins": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "bins", rename_all = "lowercase")]
pub enum Filter {
    /// Spatial mesh, one bin per voxel
    Mesh(SpatialMesh),
    /// Ascending energy bin boundaries \[eV\]
    Energy(Vec<f64>),
    /// Particle types, one bin each
    Particle(Vec<Particle>),
    /// Cell ids, one bin each
    Cell(Vec<u32>),
    /// Surface ids, one bin each
    Surface(Vec<u32>),
    /// Ascending time bin boundaries \[s\]
    Time(Vec<f64>),
    /// Ascending direction cosine bin boundaries
    Mu(Vec<f64>),
}

/// Kind of a [Filter], without the bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Mesh,
    Energy,
    Particle,
    Cell,
    Surface,
    Time,
    Mu,
}

impl Filter {
    /// The kind of filter
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Mesh(_) => FilterKind::Mesh,
            Self::Energy(_) => FilterKind::Energy,
            Self::Particle(_) => FilterKind::Particle,
            Self::Cell(_) => FilterKind::Cell,
            Self::Surface(_) => FilterKind::Surface,
            Self::Time(_) => FilterKind::Time,
            Self::Mu(_) => FilterKind::Mu,
        }
    }

    /// Number of bins the filter splits a score into
    ///
    /// Boundary based filters have one bin fewer than boundaries.
    ///
    /// ```rust
    /// # use wwforge_tally::Filter;
    /// assert_eq!(Filter::Energy(vec![0.0, 1.0, 20.0e6]).num_bins(), 2);
    /// assert_eq!(Filter::Cell(vec![1, 2, 3]).num_bins(), 3);
    /// ```
    pub fn num_bins(&self) -> usize {
        match self {
            Self::Mesh(mesh) => mesh.n_cells(),
            Self::Energy(bounds) | Self::Time(bounds) | Self::Mu(bounds) => {
                bounds.len().saturating_sub(1)
            }
            Self::Particle(particles) => particles.len(),
            Self::Cell(ids) | Self::Surface(ids) => ids.len(),
        }
    }
}

impl FilterKind {
    /// Lowercase name, matching the serialised `type` tag
    pub fn name(&self) -> &str {
        match self {
            Self::Mesh => "mesh",
            Self::Energy => "energy",
            Self::Particle => "particle",
            Self::Cell => "cell",
            Self::Surface => "surface",
            Self::Time => "time",
            Self::Mu => "mu",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

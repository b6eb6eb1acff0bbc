//! Extraction of flux data into a fixed (space, energy, particle) layout
//!
//! Tallies may carry the mesh, energy, and particle filters in any
//! combination and declaration order. Everything downstream works on one
//! canonical layout instead, with a size-1 axis standing in for any filter
//! that is absent.

// crate modules
use crate::error::{Error, Result};

// wwforge modules
use wwforge_mesh::SpatialMesh;
use wwforge_tally::{Filter, FilterKind, Particle, ResultValue, TallyResult, TallySpecification};
use wwforge_utils::f;

// external crates
use log::{debug, warn};

/// Energy bounds used when a tally has no energy filter
pub const DEFAULT_ENERGY_BOUNDS: [f64; 2] = [0.0, 1e40];

/// Particle used when a tally has no particle filter
pub const DEFAULT_PARTICLE: Particle = Particle::Neutron;

/// Position of each supported filter among the result axes
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterLayout {
    pub mesh_axis: usize,
    pub energy_axis: Option<usize>,
    pub particle_axis: Option<usize>,
    pub bins: Vec<usize>,
}

impl FilterLayout {
    /// Work out the axis layout of a tally, rejecting incompatible filters
    pub fn from_specification(tally: &TallySpecification) -> Result<Self> {
        // any unsupported filter at all is fatal
        if let Some(filter) = tally.filters.iter().find(|f| !is_supported(f)) {
            return Err(Error::UnsupportedFilter(filter.kind()));
        }

        let mesh_axis = tally
            .find_filter(FilterKind::Mesh)
            .map(|(axis, _)| axis)
            .ok_or(Error::MissingMeshFilter(tally.id))?;

        // with three supported kinds, more than three axes means duplicates
        if tally.filters.len() > 3 {
            return Err(Error::DimensionalityError {
                id: tally.id,
                reason: f!("{} filter axes remain, at most 3 expected", tally.filters.len()),
            });
        }

        for kind in [FilterKind::Mesh, FilterKind::Energy, FilterKind::Particle] {
            let count = tally.filters.iter().filter(|f| f.kind() == kind).count();
            if count > 1 {
                return Err(Error::DimensionalityError {
                    id: tally.id,
                    reason: f!("{count} {kind} filters found, at most 1 expected"),
                });
            }
        }

        let bins = tally.filter_bins();
        if let Some(axis) = bins.iter().position(|n| *n == 0) {
            return Err(Error::DimensionalityError {
                id: tally.id,
                reason: f!("{} filter has no bins", tally.filters[axis].kind()),
            });
        }

        Ok(Self {
            mesh_axis,
            energy_axis: tally.find_filter(FilterKind::Energy).map(|(axis, _)| axis),
            particle_axis: tally.find_filter(FilterKind::Particle).map(|(axis, _)| axis),
            bins,
        })
    }

    /// Split a flat filter combination index into per-axis bin indices
    fn unravel(&self, mut idx: usize) -> Vec<usize> {
        let mut indices = vec![0; self.bins.len()];
        for (axis, n) in self.bins.iter().enumerate().rev() {
            indices[axis] = idx % n;
            idx /= n;
        }
        indices
    }
}

fn is_supported(filter: &Filter) -> bool {
    matches!(
        filter,
        Filter::Mesh(_) | Filter::Energy(_) | Filter::Particle(_)
    )
}

/// Flux means and errors in the canonical (space, energy, particle) layout
///
/// Arrays are row-major over `[n_cells][n_energy][n_particles]`, with the
/// spatial index in the mesh bin order reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxData {
    /// Copy of the tally mesh
    pub mesh: SpatialMesh,
    /// Energy group boundaries
    pub energy_bounds: Vec<f64>,
    /// Particle types in filter order
    pub particles: Vec<Particle>,
    /// Canonical flux means
    pub mean: Vec<f64>,
    /// Canonical relative errors
    pub rel_err: Vec<f64>,
}

impl FluxData {
    /// Select a score and nuclide from a result and canonicalise the axes
    pub fn extract(
        tally: &TallySpecification,
        result: &TallyResult,
        score: &str,
        nuclide: &str,
    ) -> Result<Self> {
        let layout = FilterLayout::from_specification(tally)?;

        if result.filter_bins != layout.bins {
            return Err(Error::DimensionalityError {
                id: tally.id,
                reason: f!(
                    "result has filter bins {:?}, tally defines {:?}",
                    result.filter_bins,
                    layout.bins
                ),
            });
        }

        let score_idx = result.score_index(score)?;
        let nuclide_idx = select_nuclide(result, nuclide)?;
        debug!("Tally {}: score index {score_idx}, nuclide index {nuclide_idx}", tally.id);

        let mean = result.slice(ResultValue::Mean, nuclide_idx, score_idx)?;
        let rel_err = result.slice(ResultValue::RelErr, nuclide_idx, score_idx)?;

        let mesh = tally.mesh().ok_or(Error::MissingMeshFilter(tally.id))?.clone();

        let energy_bounds = tally
            .energy_bounds()
            .map(|e| e.to_vec())
            .unwrap_or_else(|| DEFAULT_ENERGY_BOUNDS.to_vec());

        let particles = tally
            .particles()
            .map(|p| p.to_vec())
            .unwrap_or_else(|| vec![DEFAULT_PARTICLE]);

        let mut flux = Self {
            mesh,
            energy_bounds,
            particles,
            mean: vec![0.0; mean.len()],
            rel_err: vec![0.0; rel_err.len()],
        };

        // scatter every filter combination into its canonical position
        for (idx, (m, r)) in mean.iter().zip(rel_err.iter()).enumerate() {
            let bins = layout.unravel(idx);
            let cell = bins[layout.mesh_axis];
            let energy = layout.energy_axis.map_or(0, |axis| bins[axis]);
            let particle = layout.particle_axis.map_or(0, |axis| bins[axis]);

            let target = flux.canonical_index(cell, energy, particle);
            flux.mean[target] = *m;
            flux.rel_err[target] = *r;
        }

        Ok(flux)
    }

    /// Number of spatial cells
    pub fn n_cells(&self) -> usize {
        self.mesh.n_cells()
    }

    /// Number of energy groups
    pub fn n_energy(&self) -> usize {
        self.energy_bounds.len().saturating_sub(1)
    }

    /// Number of particle types
    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }

    /// Shape of the canonical arrays as `[n_cells, n_energy, n_particles]`
    pub fn shape(&self) -> [usize; 3] {
        [self.n_cells(), self.n_energy(), self.n_particles()]
    }

    fn canonical_index(&self, cell: usize, energy: usize, particle: usize) -> usize {
        (cell * self.n_energy() + energy) * self.n_particles() + particle
    }

    /// Spatial slice of means and relative errors, in mesh bin order
    pub fn spatial_slice(&self, energy: usize, particle: usize) -> (Vec<f64>, Vec<f64>) {
        (0..self.n_cells())
            .map(|cell| {
                let idx = self.canonical_index(cell, energy, particle);
                (self.mean[idx], self.rel_err[idx])
            })
            .unzip()
    }
}

/// Pick the requested nuclide, falling back to the only one present
fn select_nuclide(result: &TallyResult, nuclide: &str) -> Result<usize> {
    match result.nuclide_index(nuclide) {
        Ok(idx) => Ok(idx),
        Err(e) if result.nuclides.len() == 1 => {
            warn!(
                "Warning: Nuclide \"{nuclide}\" not on tally {}, using \"{}\"",
                result.id, result.nuclides[0]
            );
            debug!("  - {e}");
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

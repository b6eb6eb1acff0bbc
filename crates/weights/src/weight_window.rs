// wwforge modules
use wwforge_mesh::SpatialMesh;
use wwforge_tally::Particle;
use wwforge_utils::{f, ValueExt};

// crate modules
use crate::bound::Bound;
use crate::error::{Error, Result};

// external crates
use serde::{Deserialize, Serialize};

/// Mesh-based weight windows for a single particle type
///
/// The [WeightWindowSet] holds a lower bound for every voxel of its mesh in
/// every energy group, along with the constant ratio that defines the upper
/// bounds and the cap on splitting.
///
/// ### Layout
///
/// Lower bounds are shaped `[ni][nj][nk][ne]` and stored flat in row-major
/// order, so the energy group varies fastest followed by the mesh grid order
/// (see [SpatialMesh]). Use [WeightWindowSet::lower_bound()] rather than
/// indexing by hand.
///
/// ```rust
/// # use wwforge_mesh::SpatialMesh;
/// # use wwforge_tally::Particle;
/// # use wwforge_weights::{Bound, WeightWindowSet};
/// let mesh = SpatialMesh::regular(1, [2, 1, 1], [0.0; 3], [2.0, 1.0, 1.0]);
///
/// // One group per energy bin, each in mesh grid order
/// let fast = vec![Bound::Enabled(1.0), Bound::Enabled(0.5)];
/// let slow = vec![Bound::Disabled, Bound::Enabled(1.0)];
///
/// let ww = WeightWindowSet::from_groups(
///     mesh,
///     Particle::Neutron,
///     vec![0.0, 1.0, 20.0e6],
///     &[fast, slow],
///     5.0,
///     1_000_000,
/// )
/// .unwrap();
///
/// assert_eq!(ww.shape(), [2, 1, 1, 2]);
/// assert_eq!(ww.lower_bound(1, 0, 0, 0), Some(Bound::Enabled(0.5)));
/// assert_eq!(ww.lower_bound(0, 0, 0, 1), Some(Bound::Disabled));
/// assert_eq!(ww.upper_bounds(), vec![5.0, -1.0, 2.5, 5.0]);
/// ```
///
/// ### Serialisation
///
/// Sets are written in the representation a transport engine consumes
/// directly, with explicit lower and upper bounds and `-1.0` for any voxel
/// that should not be biased.
///
/// | Field               | Content                                 |
/// | ------------------- | --------------------------------------- |
/// | `particle`          | particle label                          |
/// | `mesh`              | copy of the spatial mesh                |
/// | `energy_bounds`     | energy group boundaries                 |
/// | `lower_ww_bounds`   | flattened lower bounds                  |
/// | `upper_ww_bounds`   | flattened upper bounds                  |
/// | `upper_bound_ratio` | upper / lower                           |
/// | `max_split`         | maximum number of splits per history    |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WeightWindowRecord", try_from = "WeightWindowRecord")]
pub struct WeightWindowSet {
    /// Copy of the mesh the windows are defined on
    pub mesh: SpatialMesh,
    /// Particle type the windows apply to
    pub particle: Particle,
    /// Energy group boundaries, one more than the number of groups
    pub energy_bounds: Vec<f64>,
    /// Lower bounds, `[ni][nj][nk][ne]` row-major
    pub lower_bounds: Vec<Bound>,
    /// Constant ratio of upper to lower bound
    pub upper_bound_ratio: f64,
    /// Maximum number of daughter particles from a single split
    pub max_split: u32,
}

impl WeightWindowSet {
    /// Create a set from already flattened lower bounds
    pub fn new(
        mesh: SpatialMesh,
        particle: Particle,
        energy_bounds: Vec<f64>,
        lower_bounds: Vec<Bound>,
        upper_bound_ratio: f64,
        max_split: u32,
    ) -> Result<Self> {
        let ww = Self {
            mesh,
            particle,
            energy_bounds,
            lower_bounds,
            upper_bound_ratio,
            max_split,
        };
        ww.validate()?;
        Ok(ww)
    }

    /// Create a set from one group of grid ordered bounds per energy bin
    ///
    /// This is the natural output of processing a tally one energy group at a
    /// time. The groups are interleaved into the `[ni][nj][nk][ne]` layout.
    pub fn from_groups(
        mesh: SpatialMesh,
        particle: Particle,
        energy_bounds: Vec<f64>,
        groups: &[Vec<Bound>],
        upper_bound_ratio: f64,
        max_split: u32,
    ) -> Result<Self> {
        let n_cells = mesh.n_cells();

        if let Some(group) = groups.iter().find(|g| g.len() != n_cells) {
            return Err(Error::UnexpectedNumberOfBounds {
                expected: n_cells,
                found: group.len(),
            });
        }

        let lower_bounds = (0..n_cells)
            .flat_map(|cell| groups.iter().map(move |group| group[cell]))
            .collect();

        Self::new(
            mesh,
            particle,
            energy_bounds,
            lower_bounds,
            upper_bound_ratio,
            max_split,
        )
    }

    /// Check internal consistency of the set
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;

        let ascending = self.energy_bounds.windows(2).all(|w| w[0] < w[1]);
        if self.energy_bounds.len() < 2 || !ascending {
            return Err(Error::InvalidEnergyBounds(self.energy_bounds.clone()));
        }

        if !self.upper_bound_ratio.is_finite() || self.upper_bound_ratio <= 1.0 {
            return Err(Error::InvalidUpperBoundRatio(self.upper_bound_ratio));
        }

        if self.max_split == 0 {
            return Err(Error::InvalidMaxSplit);
        }

        let expected = self.mesh.n_cells() * self.n_energy_bins();
        if self.lower_bounds.len() != expected {
            return Err(Error::UnexpectedNumberOfBounds {
                expected,
                found: self.lower_bounds.len(),
            });
        }

        Ok(())
    }

    /// Number of energy groups
    pub fn n_energy_bins(&self) -> usize {
        self.energy_bounds.len().saturating_sub(1)
    }

    /// Shape of the lower bounds as `[ni, nj, nk, ne]`
    pub fn shape(&self) -> [usize; 4] {
        let [ni, nj, nk] = self.mesh.dimension;
        [ni, nj, nk, self.n_energy_bins()]
    }

    /// Lower bound of a voxel in an energy group
    pub fn lower_bound(&self, i: usize, j: usize, k: usize, e: usize) -> Option<Bound> {
        if e >= self.n_energy_bins() {
            return None;
        }
        let cell = self.mesh.try_grid_index(i, j, k).ok()?;
        self.lower_bounds.get(cell * self.n_energy_bins() + e).copied()
    }

    /// All lower bounds of one energy group, in mesh grid order
    pub fn energy_group(&self, e: usize) -> Vec<Bound> {
        let ne = self.n_energy_bins();
        if e >= ne {
            return Vec::new();
        }
        self.lower_bounds.iter().skip(e).step_by(ne).copied().collect()
    }

    /// Flattened lower bounds with `-1.0` for disabled voxels
    pub fn lower_values(&self) -> Vec<f64> {
        self.lower_bounds.iter().map(|b| f64::from(*b)).collect()
    }

    /// Flattened upper bounds with `-1.0` for disabled voxels
    pub fn upper_bounds(&self) -> Vec<f64> {
        self.lower_bounds
            .iter()
            .map(|b| f64::from(b.map(|v| v * self.upper_bound_ratio)))
            .collect()
    }

    /// Multiply all enabled lower bounds by a constant factor
    ///
    /// Disabled bounds stay disabled.
    ///
    /// ```rust
    /// # use wwforge_mesh::SpatialMesh;
    /// # use wwforge_tally::Particle;
    /// # use wwforge_weights::{Bound, WeightWindowSet};
    /// let mesh = SpatialMesh::regular(1, [3, 1, 1], [0.0; 3], [1.0; 3]);
    /// let bounds = vec![Bound::Enabled(0.2), Bound::Disabled, Bound::Enabled(0.4)];
    /// let mut ww = WeightWindowSet::new(
    ///     mesh, Particle::Neutron, vec![0.0, 1e40], bounds, 5.0, 10
    /// ).unwrap();
    ///
    /// ww.scale(0.5);
    /// assert_eq!(ww.lower_values(), vec![0.1, -1.0, 0.2]);
    /// ```
    pub fn scale(&mut self, factor: f64) {
        self.lower_bounds
            .iter_mut()
            .for_each(|b| *b = b.map(|v| v * factor));
    }

    /// Percentage of voxels, across all groups, that carry a weight window
    ///
    /// Useful common sense value for checking successive iterations are
    /// improving. Do not expect it to reach 100% if the mesh covers regions of
    /// zero importance for the particle type.
    pub fn enabled_percentage(&self) -> f64 {
        if self.lower_bounds.is_empty() {
            return 0.0;
        }
        let enabled = self.lower_bounds.iter().filter(|b| b.is_enabled()).count();
        100.0 * (enabled as f64) / (self.lower_bounds.len() as f64)
    }
}

impl std::fmt::Display for WeightWindowSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [ni, nj, nk, ne] = self.shape();
        writeln!(f, "Weight windows for {}", self.particle)?;
        writeln!(f, "  mesh        : {} ({ni} x {nj} x {nk})", self.mesh.id)?;
        writeln!(f, "  energy bins : {ne}")?;
        writeln!(f, "  ratio       : {}", self.upper_bound_ratio.sci(5, 2))?;
        writeln!(f, "  max split   : {}", self.max_split)?;
        write!(f, "  enabled     : {}", f!("{:.2}%", self.enabled_percentage()))
    }
}

/// On-file representation of a [WeightWindowSet]
#[derive(Debug, Serialize, Deserialize)]
struct WeightWindowRecord {
    particle: Particle,
    mesh: SpatialMesh,
    energy_bounds: Vec<f64>,
    lower_ww_bounds: Vec<f64>,
    #[serde(default)]
    upper_ww_bounds: Vec<f64>,
    upper_bound_ratio: f64,
    max_split: u32,
}

impl From<WeightWindowSet> for WeightWindowRecord {
    fn from(ww: WeightWindowSet) -> Self {
        Self {
            lower_ww_bounds: ww.lower_values(),
            upper_ww_bounds: ww.upper_bounds(),
            particle: ww.particle,
            mesh: ww.mesh,
            energy_bounds: ww.energy_bounds,
            upper_bound_ratio: ww.upper_bound_ratio,
            max_split: ww.max_split,
        }
    }
}

/// Upper bounds on file are derived data and are not read back
impl TryFrom<WeightWindowRecord> for WeightWindowSet {
    type Error = Error;

    fn try_from(record: WeightWindowRecord) -> Result<Self> {
        let lower_bounds = record
            .lower_ww_bounds
            .into_iter()
            .map(Bound::from)
            .collect();

        Self::new(
            record.mesh,
            record.particle,
            record.energy_bounds,
            lower_bounds,
            record.upper_bound_ratio,
            record.max_split,
        )
    }
}

//! Flux tally to weight window transform

// crate modules
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::flux::FluxData;

// wwforge modules
use wwforge_tally::{Statepoint, TallyResult, TallySpecification};
use wwforge_utils::SliceExt;
use wwforge_weights::{Bound, WeightWindowSet};

// external crates
use itertools::Itertools;
use log::{debug, info, warn};

/// Builds weight windows from the results of a flux tally
///
/// The generator is standalone and holds nothing but its configuration. Both
/// the tally definition and its results are passed in explicitly, and nothing
/// given to it is modified.
///
/// For every particle type, and every energy group within it:
///
/// 1. Flux is normalised to the maximum of the group
/// 2. Voxels with zero flux or relative errors above tolerance are disabled
/// 3. Any remaining undefined values are disabled
/// 4. Values are reordered from engine bin order into mesh grid order
///
/// One [WeightWindowSet] is returned for every particle type, in the order of
/// the particle filter. Tallies without an energy filter get a single group
/// spanning `[0, 1e40]`, and tallies without a particle filter are assumed to
/// be for neutrons.
///
/// ```rust
/// # use wwforge_mesh::SpatialMesh;
/// # use wwforge_tally::{Filter, TallyResult, TallySpecification};
/// # use wwforge_weights::Bound;
/// # use wwforge_wwgen::{GeneratorConfig, WeightWindowGenerator};
/// let mesh = SpatialMesh::regular(1, [3, 1, 1], [0.0; 3], [3.0, 1.0, 1.0]);
/// let tally = TallySpecification::new(1).with_filter(Filter::Mesh(mesh));
///
/// let result = TallyResult {
///     id: 1,
///     filter_bins: vec![3],
///     nuclides: vec!["total".into()],
///     scores: vec!["flux".into()],
///     mean: vec![8.0, 2.0, 0.0],
///     rel_err: vec![0.01, 0.05, f64::NAN],
/// };
///
/// let generator = WeightWindowGenerator::new(GeneratorConfig::default()).unwrap();
/// let ww = generator.generate(&tally, &result).unwrap();
///
/// assert_eq!(ww.len(), 1);
/// assert_eq!(ww[0].lower_values(), vec![1.0, 0.25, -1.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightWindowGenerator {
    config: GeneratorConfig,
}

impl WeightWindowGenerator {
    /// Initialise a generator, checking the configuration is usable
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Generation parameters in use
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one weight window set per particle type from tally results
    pub fn generate(
        &self,
        tally: &TallySpecification,
        result: &TallyResult,
    ) -> Result<Vec<WeightWindowSet>> {
        let flux = FluxData::extract(tally, result, &self.config.score, &self.config.nuclide)?;
        let [n_cells, n_energy, n_particles] = flux.shape();
        debug!("Tally {}: {n_cells} cells, {n_energy} energy groups, {n_particles} particles", tally.id);

        let mut weight_windows = Vec::with_capacity(n_particles);

        for (p, particle) in flux.particles.iter().enumerate() {
            let mut groups = Vec::with_capacity(n_energy);

            for e in 0..n_energy {
                let (mean, rel_err) = flux.spatial_slice(e, p);

                if mean.iter().all(|m| *m == 0.0) {
                    warn!("Warning: No {particle} flux in energy group {e} of tally {}", tally.id);
                }

                let bounds = lower_bounds(
                    &mean,
                    &rel_err,
                    self.config.rel_err_tol,
                    self.config.flux_floor,
                );
                groups.push(flux.mesh.to_grid_order(&bounds)?);
            }

            let ww = WeightWindowSet::from_groups(
                flux.mesh.clone(),
                *particle,
                flux.energy_bounds.clone(),
                &groups,
                self.config.upper_bound_ratio,
                self.config.max_split,
            )?;

            debug!("  - {particle}: {:.2}% of voxels biased", ww.enabled_percentage());
            weight_windows.push(ww);
        }

        info!(
            "Generated weight windows for {} from tally {}",
            weight_windows.iter().map(|ww| ww.particle.label()).join(", "),
            tally.id
        );

        Ok(weight_windows)
    }

    /// Look up the tally in a statepoint and generate weight windows from it
    pub fn generate_from_statepoint(
        &self,
        tally: &TallySpecification,
        statepoint: &Statepoint,
    ) -> Result<Vec<WeightWindowSet>> {
        let result = statepoint.get_tally(tally.id)?;
        self.generate(tally, result)
    }
}

/// Normalised lower bounds for a single group of voxels
///
/// The flux is divided by its maximum, taken before any masking. A group with
/// no flux at all normalises to zero rather than NAN, and is therefore
/// entirely disabled.
///
/// A voxel is disabled if its normalised flux is at or below `flux_floor`, its
/// relative error is above `rel_err_tol`, or the normalised value is not
/// finite.
///
/// ```rust
/// # use wwforge_weights::Bound;
/// # use wwforge_wwgen::lower_bounds;
/// let mean = [10.0, 0.0, 5.0, 2.0];
/// let rel_err = [0.01, f64::NAN, 0.10, 0.99];
///
/// let bounds = lower_bounds(&mean, &rel_err, 0.95, 0.0);
/// assert_eq!(bounds, vec![
///     Bound::Enabled(1.0),
///     Bound::Disabled,        // zero flux
///     Bound::Enabled(0.5),
///     Bound::Disabled,        // too uncertain
/// ]);
/// ```
pub fn lower_bounds(mean: &[f64], rel_err: &[f64], rel_err_tol: f64, flux_floor: f64) -> Vec<Bound> {
    let peak = mean.peak();

    mean.iter()
        .zip(rel_err)
        .map(|(m, r)| {
            let normalised = if peak == 0.0 { 0.0 } else { m / peak };

            if normalised <= flux_floor || *r > rel_err_tol || !normalised.is_finite() {
                Bound::Disabled
            } else {
                Bound::Enabled(normalised)
            }
        })
        .collect()
}

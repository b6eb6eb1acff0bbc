//! Tally specification as defined in a problem

// wwforge modules
use wwforge_mesh::SpatialMesh;

// crate modules
use crate::filter::{Filter, FilterKind};
use crate::particle::Particle;

// external crates
use serde::{Deserialize, Serialize};

/// Definition of a tally in the problem description
///
/// Filters are kept in the order they were declared, which is also the order
/// of the leading axes of the corresponding [TallyResult](crate::TallyResult)
/// arrays.
///
/// ```rust
/// # use wwforge_mesh::SpatialMesh;
/// # use wwforge_tally::{Filter, FilterKind, TallySpecification};
/// let mesh = SpatialMesh::regular(1, [2, 4, 3], [0.0; 3], [1.0; 3]);
///
/// let tally = TallySpecification::new(1)
///     .with_name("flux_on_mesh")
///     .with_filter(Filter::Energy(vec![0.0, 1.0, 20e6]))
///     .with_filter(Filter::Mesh(mesh));
///
/// assert_eq!(tally.scores, vec!["flux"]);
/// assert_eq!(tally.nuclides, vec!["total"]);
/// assert_eq!(tally.filter_kinds(), vec![FilterKind::Energy, FilterKind::Mesh]);
/// assert_eq!(tally.filter_bins(), vec![2, 24]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallySpecification {
    /// Unique tally identifier
    pub id: u32,
    /// Optional descriptive name
    #[serde(default)]
    pub name: String,
    /// Filters in declaration order
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Scores tallied, `["flux"]` by default
    #[serde(default = "default_scores")]
    pub scores: Vec<String>,
    /// Nuclides tallied, `["total"]` by default
    #[serde(default = "default_nuclides")]
    pub nuclides: Vec<String>,
}

fn default_scores() -> Vec<String> {
    vec!["flux".to_string()]
}

fn default_nuclides() -> Vec<String> {
    vec!["total".to_string()]
}

impl TallySpecification {
    /// New flux tally with no filters
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            filters: Vec::new(),
            scores: default_scores(),
            nuclides: default_nuclides(),
        }
    }

    /// Set the tally name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Append a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace the nuclides
    pub fn with_nuclides(mut self, nuclides: &[&str]) -> Self {
        self.nuclides = nuclides.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Kinds of all filters, in declaration order
    pub fn filter_kinds(&self) -> Vec<FilterKind> {
        self.filters.iter().map(|f| f.kind()).collect()
    }

    /// Number of bins for each filter, in declaration order
    pub fn filter_bins(&self) -> Vec<usize> {
        self.filters.iter().map(|f| f.num_bins()).collect()
    }

    /// Position and reference of the first filter of a given kind
    pub fn find_filter(&self, kind: FilterKind) -> Option<(usize, &Filter)> {
        self.filters
            .iter()
            .enumerate()
            .find(|(_, f)| f.kind() == kind)
    }

    /// The mesh of the mesh filter, if there is one
    pub fn mesh(&self) -> Option<&SpatialMesh> {
        self.filters.iter().find_map(|f| match f {
            Filter::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// Energy bin boundaries of the energy filter, if there is one
    pub fn energy_bounds(&self) -> Option<&[f64]> {
        self.filters.iter().find_map(|f| match f {
            Filter::Energy(bounds) => Some(bounds.as_slice()),
            _ => None,
        })
    }

    /// Particles of the particle filter, if there is one
    pub fn particles(&self) -> Option<&[Particle]> {
        self.filters.iter().find_map(|f| match f {
            Filter::Particle(particles) => Some(particles.as_slice()),
            _ => None,
        })
    }
}

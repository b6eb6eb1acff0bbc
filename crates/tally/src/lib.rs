//! Tally specifications and simulation results
//!
//! The data model here mirrors what a transport engine needs to be told about
//! a tally, and what it reports back at the end of a run.
//!
//! - [TallySpecification] - tally id, ordered [Filter]s, scores and nuclides
//! - [TallyResult] - mean and relative error for every bin combination
//! - [Statepoint] - all tally results of one run, looked up by tally id
//!
//! ```rust
//! # use wwforge_mesh::SpatialMesh;
//! # use wwforge_tally::{Filter, Particle, TallySpecification};
//! let mesh = SpatialMesh::regular(1, [10, 10, 10], [-50.0; 3], [50.0; 3]);
//!
//! let tally = TallySpecification::new(104)
//!     .with_filter(Filter::Mesh(mesh))
//!     .with_filter(Filter::Particle(vec![Particle::Neutron, Particle::Photon]));
//!
//! assert_eq!(tally.filter_bins(), vec![1000, 2]);
//! ```

mod error;
mod filter;
mod particle;
mod result;
mod specification;
mod statepoint;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use filter::{Filter, FilterKind};

#[doc(inline)]
pub use particle::Particle;

#[doc(inline)]
pub use result::{ResultValue, TallyResult};

#[doc(inline)]
pub use specification::TallySpecification;

#[doc(inline)]
pub use statepoint::Statepoint;

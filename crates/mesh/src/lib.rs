//! Spatial mesh definitions for mesh filters and weight windows
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod geometry;
mod mesh;
mod ordering;

#[doc(inline)]
pub use mesh::SpatialMesh;

#[doc(inline)]
pub use geometry::Geometry;

#[doc(inline)]
pub use error::{Error, Result};

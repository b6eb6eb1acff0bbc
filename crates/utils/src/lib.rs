//! Common utility for extended `std` types
//!
//! These are left public for convenience. Prettier formatting for scientific
//! numbers and maxima of float slices are useful everywhere.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod slice_ext;
mod value_ext;

// Flatten
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;

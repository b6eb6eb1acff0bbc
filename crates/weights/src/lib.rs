//! Tools for weight window sets
//!
#![doc = include_str!("../readme.md")]

mod bound;
mod error;
mod operations;
mod weight_window;

#[doc(inline)]
pub use crate::bound::Bound;

#[doc(inline)]
pub use crate::weight_window::WeightWindowSet;

#[doc(inline)]
pub use crate::error::{Error, Result};

#[doc(inline)]
pub use crate::operations::{read_weight_windows, write_weight_windows};

//! `wwforge` is a small toolkit for generating and iteratively refining weight
//! windows from mesh flux tallies
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use wwforge_utils as utils;

#[cfg(feature = "mesh")]
#[cfg_attr(docsrs, doc(cfg(feature = "mesh")))]
#[doc(inline)]
pub use wwforge_mesh as mesh;

#[cfg(feature = "tally")]
#[cfg_attr(docsrs, doc(cfg(feature = "tally")))]
#[doc(inline)]
pub use wwforge_tally as tally;

#[cfg(feature = "weights")]
#[cfg_attr(docsrs, doc(cfg(feature = "weights")))]
#[doc(inline)]
pub use wwforge_weights as weights;

#[cfg(feature = "wwgen")]
#[cfg_attr(docsrs, doc(cfg(feature = "wwgen")))]
#[doc(inline)]
pub use wwforge_wwgen as wwgen;

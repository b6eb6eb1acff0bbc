//! Lower weight window bound of a single voxel and energy group

// external crates
use serde::{Deserialize, Serialize};

/// Lower weight window bound for one voxel in one energy group
///
/// A disabled bound means "do not bias here", usually because the flux was
/// zero or too uncertain. It is not a malformed value. On file a disabled
/// bound is the sentinel `-1.0`.
///
/// ```rust
/// # use wwforge_weights::Bound;
/// assert_eq!(Bound::from(0.25), Bound::Enabled(0.25));
/// assert_eq!(Bound::from(-1.0), Bound::Disabled);
/// assert_eq!(Bound::from(f64::NAN), Bound::Disabled);
///
/// assert_eq!(f64::from(Bound::Disabled), -1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum Bound {
    /// Normalised importance bound in \[0, 1\]
    Enabled(f64),
    /// Cell is not biased
    Disabled,
}

impl Bound {
    /// File representation of a disabled bound
    pub const SENTINEL: f64 = -1.0;

    /// The bound value, if enabled
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Enabled(v) => Some(*v),
            Self::Disabled => None,
        }
    }

    /// Whether the cell carries a weight window
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// Apply a function to an enabled value, leaving disabled bounds alone
    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        match self {
            Self::Enabled(v) => Self::from(f(v)),
            Self::Disabled => Self::Disabled,
        }
    }
}

/// Negative and non-finite values are all treated as disabled
impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Self::Enabled(value)
        } else {
            Self::Disabled
        }
    }
}

impl From<Bound> for f64 {
    fn from(bound: Bound) -> Self {
        bound.value().unwrap_or(Bound::SENTINEL)
    }
}

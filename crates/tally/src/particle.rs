//! Transport particle designators

// external crates
use serde::{Deserialize, Serialize};

/// Particle types that can be tallied and biased
///
/// Particle filters list these by label, and weight window sets are built for
/// exactly one of them. The lowercase label is what gets written to files.
///
/// ```rust
/// # use wwforge_tally::Particle;
/// let particle: Particle = serde_json::from_str("\"photon\"").unwrap();
/// assert_eq!(particle, Particle::Photon);
/// assert_eq!(Particle::Photon.label(), "photon");
/// ```
#[repr(u8)]
#[derive(
    Debug, Default, Copy, Clone, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Particle {
    #[default]
    Neutron = 1,
    Photon = 2,
    Electron = 3,
    Positron = 4,
}

impl Particle {
    /// Lowercase label used in filters and output files
    pub fn label(&self) -> &str {
        match self {
            Self::Neutron => "neutron",
            Self::Photon => "photon",
            Self::Electron => "electron",
            Self::Positron => "positron",
        }
    }
}

impl std::fmt::Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

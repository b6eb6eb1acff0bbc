use serde::{Deserialize, Serialize};

/// Mesh geometry types, i.e. `Rectangular`, `Cylindrical`
///
/// The (i, j, k) axes of a [SpatialMesh](crate::SpatialMesh) are interpreted
/// according to the geometry. Spherical meshes are not supported.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Cartesian (x, y, z) mesh
    #[default]
    Rectangular,
    /// Cylindrical (r, phi, z) mesh
    Cylindrical,
}

impl Geometry {
    /// Full name i.e. 'Rectangular', 'Cylindrical'
    pub fn long_name(&self) -> &str {
        match self {
            Geometry::Rectangular => "Rectangular",
            Geometry::Cylindrical => "Cylindrical",
        }
    }

    /// Coordinate system based name i.e. 'XYZ', 'RPZ'
    pub fn axes_name(&self) -> &str {
        match self {
            Geometry::Rectangular => "XYZ",
            Geometry::Cylindrical => "RPZ",
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.axes_name())
    }
}

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Coronal,
    Sagittal,
    Oblique,
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plane::Axial => "AXIAL",
            Plane::Coronal => "CORONAL",
            Plane::Sagittal => "SAGITTAL",
            Plane::Oblique => "OBLIQUE",
        };
        f.write_str(name)
    }
}

/// Anatomical vocabulary used for orientation letters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// R/L, A/P, H/F
    #[default]
    Biped,
    /// Rt/Le, V/D, Cr/Cd
    Quadruped,
}

/// Which projector to use when posting a geometry on a localizer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    ProjectSlice,
    #[default]
    IntersectSlice,
    IntersectVolume,
}

//! Numeric tolerances shared by the geometry modules.

/// Allowed deviation of a direction cosine from unit length, and of the
/// row/column dot product from zero.
pub const ORTHONORMAL_TOLERANCE: f64 = 0.001;

/// Allowed component-wise difference between two normals considered parallel.
pub const COPLANAR_TOLERANCE: f64 = 0.001;

/// Allowed variation (mm) of the interval between consecutive frames of a
/// regularly sampled volume.
pub const REGULAR_SPACING_TOLERANCE: f64 = 0.001;

/// Spacing (mm) below which image/patient mappings are undefined.
pub const MIN_PIXEL_SPACING: f64 = 0.00001;

/// A direction cosine component must exceed this to name a major axis.
pub const OBLIQUITY_THRESHOLD: f64 = 0.8;

/// Components at or below this are ignored when spelling out an orientation.
pub const DIRECTION_COMPONENT_EPSILON: f64 = 0.0001;

/// Minimum dot product of two oblique normals considered the same orientation.
pub const SAME_ORIENTATION_THRESHOLD: f64 = 0.95;

/// Side length (mm) of the rectangle synthesized for a localization slab.
pub const LOCALIZATION_EXTENT: f64 = 100_000.0;

/// Distance (mm) from the localizer plane under which a point lies on it;
/// also the distance under which two intersection points are merged.
pub const PLANE_TOLERANCE: f64 = 1e-6;

//! Anatomical labels for direction cosines and image planes.
//!
//! The patient coordinate system is LPH+: x increases toward the patient's
//! left, y toward posterior and z toward the head.

use nalgebra::Vector3;

use crate::consts::{DIRECTION_COMPONENT_EPSILON, OBLIQUITY_THRESHOLD, SAME_ORIENTATION_THRESHOLD};
use crate::enums::{Plane, Subject};
use crate::slice::SliceGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Direction toward which a patient axis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientDirection {
    Right,
    Left,
    Anterior,
    Posterior,
    Head,
    Feet,
}

impl PatientDirection {
    /// Direction of `axis` given the sign of the vector component along it.
    pub fn along(axis: Axis, component: f64) -> Self {
        match axis {
            Axis::X if component < 0.0 => PatientDirection::Right,
            Axis::X => PatientDirection::Left,
            Axis::Y if component < 0.0 => PatientDirection::Anterior,
            Axis::Y => PatientDirection::Posterior,
            Axis::Z if component < 0.0 => PatientDirection::Feet,
            Axis::Z => PatientDirection::Head,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            PatientDirection::Right | PatientDirection::Left => Axis::X,
            PatientDirection::Anterior | PatientDirection::Posterior => Axis::Y,
            PatientDirection::Head | PatientDirection::Feet => Axis::Z,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PatientDirection::Right => PatientDirection::Left,
            PatientDirection::Left => PatientDirection::Right,
            PatientDirection::Anterior => PatientDirection::Posterior,
            PatientDirection::Posterior => PatientDirection::Anterior,
            PatientDirection::Head => PatientDirection::Feet,
            PatientDirection::Feet => PatientDirection::Head,
        }
    }

    /// Letter code of the direction.
    ///
    /// Quadruped codes are mixed case (`Le`, `Rt`, `V`, `D`, `Cr`, `Cd`);
    /// upper-case them to produce a Patient Orientation code string.
    pub fn code(self, subject: Subject) -> &'static str {
        match (subject, self) {
            (Subject::Biped, PatientDirection::Right) => "R",
            (Subject::Biped, PatientDirection::Left) => "L",
            (Subject::Biped, PatientDirection::Anterior) => "A",
            (Subject::Biped, PatientDirection::Posterior) => "P",
            (Subject::Biped, PatientDirection::Head) => "H",
            (Subject::Biped, PatientDirection::Feet) => "F",
            (Subject::Quadruped, PatientDirection::Right) => "Rt",
            (Subject::Quadruped, PatientDirection::Left) => "Le",
            (Subject::Quadruped, PatientDirection::Anterior) => "V",
            (Subject::Quadruped, PatientDirection::Posterior) => "D",
            (Subject::Quadruped, PatientDirection::Head) => "Cr",
            (Subject::Quadruped, PatientDirection::Feet) => "Cd",
        }
    }
}

/// Major axis direction of a unit vector, or `None` if it is oblique.
///
/// An axis is major when its absolute component exceeds
/// [`OBLIQUITY_THRESHOLD`] and strictly exceeds the other two.
pub fn major_axis_label(v: &Vector3<f64>) -> Option<PatientDirection> {
    let (x, y, z) = (v.x.abs(), v.y.abs(), v.z.abs());
    let axis = if x > OBLIQUITY_THRESHOLD && x > y && x > z {
        Axis::X
    } else if y > OBLIQUITY_THRESHOLD && y > x && y > z {
        Axis::Y
    } else if z > OBLIQUITY_THRESHOLD && z > x && z > y {
        Axis::Z
    } else {
        return None;
    };
    Some(PatientDirection::along(axis, v[axis.index()]))
}

/// Plane spanned by a row and a column direction cosine.
pub fn plane_label(row: &Vector3<f64>, column: &Vector3<f64>) -> Plane {
    let (Some(row_axis), Some(column_axis)) = (major_axis_label(row), major_axis_label(column))
    else {
        return Plane::Oblique;
    };
    match (row_axis.axis(), column_axis.axis()) {
        (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Plane::Axial,
        (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => Plane::Coronal,
        (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Plane::Sagittal,
        _ => Plane::Oblique,
    }
}

/// Spell out a direction with up to three letters, largest component first.
///
/// Returns e.g. `"L"` for an axis-aligned vector and `"RAH"` for an oblique
/// one. Components at or below [`DIRECTION_COMPONENT_EPSILON`] are skipped,
/// so the zero vector yields an empty string.
pub fn full_orientation_string(v: &Vector3<f64>, subject: Subject) -> String {
    let mut remaining = [v.x.abs(), v.y.abs(), v.z.abs()];
    let mut code = String::with_capacity(6);
    for _ in 0..3 {
        let [x, y, z] = remaining;
        let axis = if x > DIRECTION_COMPONENT_EPSILON && x >= y && x >= z {
            Axis::X
        } else if y > DIRECTION_COMPONENT_EPSILON && y >= x && y >= z {
            Axis::Y
        } else if z > DIRECTION_COMPONENT_EPSILON && z >= x && z >= y {
            Axis::Z
        } else {
            break;
        };
        code.push_str(PatientDirection::along(axis, v[axis.index()]).code(subject));
        remaining[axis.index()] = 0.0;
    }
    code
}

/// Whether two slices have parallel normals pointing the same way.
///
/// Normals are compared component-wise, so anti-parallel slices (a stack
/// acquired with flipped row/column cosines) are not coplanar.
pub fn coplanar(a: &SliceGeometry, b: &SliceGeometry, tolerance: f64) -> bool {
    (a.normal() - b.normal()).iter().all(|d| d.abs() < tolerance)
}

/// Whether two row/column pairs describe the same orientation.
///
/// Non-oblique pairs must share a plane label. Oblique pairs match when
/// their normals differ by less than about 18 degrees.
pub fn has_same_orientation(
    row1: &Vector3<f64>,
    column1: &Vector3<f64>,
    row2: &Vector3<f64>,
    column2: &Vector3<f64>,
) -> bool {
    let plane1 = plane_label(row1, column1);
    if plane1 != Plane::Oblique {
        return plane1 == plane_label(row2, column2);
    }
    let (Some(normal1), Some(normal2)) = (
        row1.cross(column1).try_normalize(f64::EPSILON),
        row2.cross(column2).try_normalize(f64::EPSILON),
    ) else {
        return false;
    };
    normal1.dot(&normal2) > SAME_ORIENTATION_THRESHOLD
}

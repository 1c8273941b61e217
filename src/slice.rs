use std::fmt;

use nalgebra::{Point2, Point3, Vector3};

use crate::consts::{MIN_PIXEL_SPACING, ORTHONORMAL_TOLERANCE};
use crate::enums::{Plane, Subject};
use crate::error::GeometryError;
use crate::orientation::{full_orientation_string, plane_label};

/// Distances in mm between voxel centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelSpacing {
    /// Between adjacent rows (first value of Pixel Spacing).
    pub row: f64,
    /// Between adjacent columns (second value of Pixel Spacing).
    pub column: f64,
    /// Between adjacent slices of a volume, 0 when unknown.
    pub slice: f64,
}

impl VoxelSpacing {
    pub fn new(row: f64, column: f64, slice: f64) -> Self {
        Self { row, column, slice }
    }

    fn is_degenerate(&self) -> bool {
        self.row < MIN_PIXEL_SPACING || self.column < MIN_PIXEL_SPACING
    }
}

/// Position and orientation of one cross-sectional image in patient space.
///
/// Direction cosines are validated on construction; the normal and the
/// distance of the slice from the origin along that normal are derived once
/// and never taken from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceGeometry {
    row: Vector3<f64>,
    column: Vector3<f64>,
    normal: Vector3<f64>,
    tlhc: Point3<f64>,
    voxel_spacing: VoxelSpacing,
    slice_thickness: f64,
    dimensions: (u32, u32, u32),
    distance_along_normal: f64,
}

/// Check that `row` and `column` are unit vectors and orthogonal.
///
/// # Errors
///
/// Returns [`GeometryError::NotOrthonormal`] if a component is NaN or
/// infinite, or if either length differs from 1 or their dot product from 0
/// by more than [`ORTHONORMAL_TOLERANCE`].
pub fn validate_direction_cosines(
    row: &Vector3<f64>,
    column: &Vector3<f64>,
) -> Result<(), GeometryError> {
    if !row.iter().chain(column.iter()).all(|v| v.is_finite()) {
        return Err(GeometryError::NotOrthonormal {
            reason: "direction cosine is not finite",
        });
    }
    if (row.norm() - 1.0).abs() > ORTHONORMAL_TOLERANCE {
        return Err(GeometryError::NotOrthonormal {
            reason: "row is not a unit vector",
        });
    }
    if (column.norm() - 1.0).abs() > ORTHONORMAL_TOLERANCE {
        return Err(GeometryError::NotOrthonormal {
            reason: "column is not a unit vector",
        });
    }
    if row.dot(column).abs() > ORTHONORMAL_TOLERANCE {
        return Err(GeometryError::NotOrthonormal {
            reason: "row and column are not orthogonal",
        });
    }
    Ok(())
}

impl SliceGeometry {
    /// Build the geometry of a slice.
    ///
    /// # Arguments
    ///
    /// * `row` - direction of increasing column index (direction cosine)
    /// * `column` - direction of increasing row index (direction cosine)
    /// * `tlhc` - center of the top left-hand voxel
    /// * `voxel_spacing` - row, column and slice spacing in mm
    /// * `slice_thickness` - thickness in mm
    /// * `dimensions` - rows, columns and frames (1 for a lone slice)
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotOrthonormal`] if the direction cosines are
    /// not unit length or not orthogonal. They are never corrected silently.
    pub fn new(
        row: Vector3<f64>,
        column: Vector3<f64>,
        tlhc: Point3<f64>,
        voxel_spacing: VoxelSpacing,
        slice_thickness: f64,
        dimensions: (u32, u32, u32),
    ) -> Result<Self, GeometryError> {
        validate_direction_cosines(&row, &column)?;
        Ok(Self::from_orthonormal(
            row,
            column,
            tlhc,
            voxel_spacing,
            slice_thickness,
            dimensions,
        ))
    }

    /// Build from values laid out as in DICOM attributes: Image Orientation
    /// (Patient), Image Position (Patient) and Pixel Spacing.
    pub fn from_attributes(
        orientation: [f64; 6],
        position: [f64; 3],
        pixel_spacing: [f64; 2],
        slice_thickness: f64,
        rows: u32,
        columns: u32,
    ) -> Result<Self, GeometryError> {
        Self::new(
            Vector3::new(orientation[0], orientation[1], orientation[2]),
            Vector3::new(orientation[3], orientation[4], orientation[5]),
            Point3::from(position),
            VoxelSpacing::new(pixel_spacing[0], pixel_spacing[1], 0.0),
            slice_thickness,
            (rows, columns, 1),
        )
    }

    /// Caller guarantees `row` and `column` are orthonormal.
    pub(crate) fn from_orthonormal(
        row: Vector3<f64>,
        column: Vector3<f64>,
        tlhc: Point3<f64>,
        voxel_spacing: VoxelSpacing,
        slice_thickness: f64,
        dimensions: (u32, u32, u32),
    ) -> Self {
        let normal = row.cross(&column).normalize();
        let distance_along_normal = normal.dot(&tlhc.coords);
        Self {
            row,
            column,
            normal,
            tlhc,
            voxel_spacing,
            slice_thickness,
            dimensions,
            distance_along_normal,
        }
    }

    pub fn row(&self) -> &Vector3<f64> {
        &self.row
    }

    pub fn column(&self) -> &Vector3<f64> {
        &self.column
    }

    /// Unit normal, `row × column`.
    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// Center of the top left-hand voxel.
    pub fn tlhc(&self) -> &Point3<f64> {
        &self.tlhc
    }

    pub fn voxel_spacing(&self) -> &VoxelSpacing {
        &self.voxel_spacing
    }

    pub fn slice_thickness(&self) -> f64 {
        self.slice_thickness
    }

    /// Rows, columns and frames.
    pub fn dimensions(&self) -> (u32, u32, u32) {
        self.dimensions
    }

    /// Signed distance of the TLHC from the origin along the normal.
    pub fn distance_along_normal(&self) -> f64 {
        self.distance_along_normal
    }

    /// Copy of this geometry with the slice interval replaced.
    pub fn with_slice_spacing(&self, slice: f64) -> Self {
        Self {
            voxel_spacing: VoxelSpacing {
                slice,
                ..self.voxel_spacing
            },
            ..self.clone()
        }
    }

    pub(crate) fn with_extent(
        &self,
        tlhc: Point3<f64>,
        slice_thickness: f64,
        dimensions: (u32, u32, u32),
    ) -> Self {
        Self::from_orthonormal(
            self.row,
            self.column,
            tlhc,
            self.voxel_spacing,
            slice_thickness,
            dimensions,
        )
    }

    /// Patient position of a (possibly fractional) column and row offset.
    ///
    /// Column offsets step along `row` by the column spacing and row offsets
    /// along `column` by the row spacing, as DICOM Pixel Spacing defines them.
    pub fn position_of(&self, column: f64, row: f64) -> Point3<f64> {
        self.tlhc
            + self.row * (column * self.voxel_spacing.column)
            + self.column * (row * self.voxel_spacing.row)
    }

    /// Column and row offsets of a patient position projected onto the slice.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateSpacing`] when the row or column
    /// spacing is below [`MIN_PIXEL_SPACING`]; this can happen with
    /// half-edited geometry and is not fatal to the caller.
    pub fn image_coordinate_of(&self, point: &Point3<f64>) -> Result<Point2<f64>, GeometryError> {
        if self.voxel_spacing.is_degenerate() {
            return Err(GeometryError::DegenerateSpacing {
                row: self.voxel_spacing.row,
                column: self.voxel_spacing.column,
            });
        }
        let offset = *point - self.tlhc;
        Ok(Point2::new(
            offset.dot(&self.row) / self.voxel_spacing.column,
            offset.dot(&self.column) / self.voxel_spacing.row,
        ))
    }

    /// Corners of the image rectangle: TLHC, TRHC, BRHC, BLHC.
    pub fn corners(&self) -> [Point3<f64>; 4] {
        let (along_row, along_column) = self.edges();
        let tlhc = self.tlhc;
        [
            tlhc,
            tlhc + along_row,
            tlhc + along_row + along_column,
            tlhc + along_column,
        ]
    }

    /// Corners of the slab covering `frames × slice_thickness` centered on the
    /// slice plane: the four corners of the face on the normal side, then the
    /// four of the opposite face, each in TL, TR, BR, BL order.
    pub fn slab_corners(&self) -> [Point3<f64>; 8] {
        let half_thickness =
            self.normal * (f64::from(self.dimensions.2) / 2.0 * self.slice_thickness);
        let [tl, tr, br, bl] = self.corners();
        [
            tl + half_thickness,
            tr + half_thickness,
            br + half_thickness,
            bl + half_thickness,
            tl - half_thickness,
            tr - half_thickness,
            br - half_thickness,
            bl - half_thickness,
        ]
    }

    fn edges(&self) -> (Vector3<f64>, Vector3<f64>) {
        let (rows, columns, _) = self.dimensions;
        (
            self.row * (f64::from(columns) * self.voxel_spacing.column),
            self.column * (f64::from(rows) * self.voxel_spacing.row),
        )
    }

    pub fn plane(&self) -> Plane {
        plane_label(&self.row, &self.column)
    }

    pub fn row_orientation(&self, subject: Subject) -> String {
        full_orientation_string(&self.row, subject)
    }

    pub fn column_orientation(&self, subject: Subject) -> String {
        full_orientation_string(&self.column, subject)
    }

    /// Row letters followed by column letters, e.g. `"LP"` for an axial slice.
    pub fn orientation_label(&self, subject: Subject) -> String {
        self.row_orientation(subject) + &self.column_orientation(subject)
    }
}

impl fmt::Display for SliceGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row ({}, {}, {}) column ({}, {}, {}) normal ({}, {}, {}) tlhc ({}, {}, {}) \
             spacing ({}, {}, {}) thickness {} dimensions ({}, {}, {})",
            self.row.x,
            self.row.y,
            self.row.z,
            self.column.x,
            self.column.y,
            self.column.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.tlhc.x,
            self.tlhc.y,
            self.tlhc.z,
            self.voxel_spacing.row,
            self.voxel_spacing.column,
            self.voxel_spacing.slice,
            self.slice_thickness,
            self.dimensions.0,
            self.dimensions.1,
            self.dimensions.2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn axial(z: f64) -> SliceGeometry {
        SliceGeometry::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Point3::new(-100.0, -120.0, z),
            VoxelSpacing::new(0.5, 0.8, 0.0),
            2.0,
            (400, 250, 1),
        )
        .unwrap()
    }

    #[test]
    fn rejects_long_row() {
        let result = SliceGeometry::new(
            Vector3::new(1.1, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Point3::origin(),
            VoxelSpacing::new(1.0, 1.0, 0.0),
            1.0,
            (10, 10, 1),
        );
        assert!(matches!(result, Err(GeometryError::NotOrthonormal { .. })));
    }

    #[test]
    fn rejects_non_finite_cosines() {
        let nan_row = SliceGeometry::new(
            Vector3::new(f64::NAN, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Point3::origin(),
            VoxelSpacing::new(1.0, 1.0, 0.0),
            1.0,
            (10, 10, 1),
        );
        assert!(matches!(nan_row, Err(GeometryError::NotOrthonormal { .. })));

        let infinite_column = SliceGeometry::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, f64::INFINITY, 0.0),
            Point3::origin(),
            VoxelSpacing::new(1.0, 1.0, 0.0),
            1.0,
            (10, 10, 1),
        );
        assert!(matches!(
            infinite_column,
            Err(GeometryError::NotOrthonormal { .. })
        ));
    }

    #[test]
    fn anisotropic_spacing_follows_pixel_spacing_order() {
        // Pixel Spacing (0.5, 2.0): rows 0.5 mm apart, columns 2.0 mm apart.
        let slice = SliceGeometry::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Point3::origin(),
            VoxelSpacing::new(0.5, 2.0, 0.0),
            1.0,
            (10, 10, 1),
        )
        .unwrap();
        assert_relative_eq!(slice.position_of(3.0, 0.0), Point3::new(6.0, 0.0, 0.0));
        assert_relative_eq!(slice.position_of(0.0, 3.0), Point3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn rejects_non_orthogonal_pair() {
        // Unit vectors with a dot product of 0.1.
        let tilt = 0.1f64.asin();
        let result = SliceGeometry::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(tilt.sin(), tilt.cos(), 0.0),
            Point3::origin(),
            VoxelSpacing::new(1.0, 1.0, 0.0),
            1.0,
            (10, 10, 1),
        );
        assert_eq!(
            result.unwrap_err(),
            GeometryError::NotOrthonormal {
                reason: "row and column are not orthogonal"
            }
        );
    }

    #[test]
    fn accepts_slightly_rounded_cosines() {
        let slice = SliceGeometry::from_attributes(
            [0.999_999, 0.0, 0.0, 0.0, 0.999_999, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 1.0],
            1.0,
            8,
            8,
        );
        assert!(slice.is_ok());
    }

    #[test]
    fn normal_and_distance() {
        let slice = axial(42.0);
        assert_relative_eq!(*slice.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(slice.distance_along_normal(), 42.0);
    }

    #[test]
    fn position_uses_column_spacing_along_row() {
        let slice = axial(10.0);
        let p = slice.position_of(10.0, 4.0);
        assert_relative_eq!(p, Point3::new(-100.0 + 8.0, -120.0 + 2.0, 10.0));
    }

    #[test]
    fn image_coordinate_inverts_position() {
        let slice = axial(10.0);
        let p = slice.position_of(37.0, 211.0);
        let c = slice.image_coordinate_of(&p).unwrap();
        assert_relative_eq!(c, Point2::new(37.0, 211.0), epsilon = 1e-9);
    }

    #[test]
    fn degenerate_spacing_is_reported() {
        let slice = SliceGeometry::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Point3::origin(),
            VoxelSpacing::new(0.000_001, 1.0, 0.0),
            1.0,
            (10, 10, 1),
        )
        .unwrap();
        assert!(matches!(
            slice.image_coordinate_of(&Point3::new(1.0, 1.0, 0.0)),
            Err(GeometryError::DegenerateSpacing { .. })
        ));
    }

    #[test]
    fn corners_follow_tl_tr_br_bl() {
        let slice = axial(0.0);
        let [tl, tr, br, bl] = slice.corners();
        assert_relative_eq!(tl, Point3::new(-100.0, -120.0, 0.0));
        assert_relative_eq!(tr, Point3::new(100.0, -120.0, 0.0));
        assert_relative_eq!(br, Point3::new(100.0, 80.0, 0.0));
        assert_relative_eq!(bl, Point3::new(-100.0, 80.0, 0.0));
    }

    #[test]
    fn slab_corners_straddle_the_plane() {
        let slice = axial(0.0).with_extent(Point3::new(-100.0, -120.0, 0.0), 2.0, (400, 250, 5));
        let corners = slice.slab_corners();
        assert!(corners[..4].iter().all(|c| (c.z - 5.0).abs() < 1e-12));
        assert!(corners[4..].iter().all(|c| (c.z + 5.0).abs() < 1e-12));
    }

    #[test]
    fn orientation_labels() {
        let slice = axial(0.0);
        assert_eq!(slice.orientation_label(Subject::Biped), "LP");
        assert_eq!(slice.orientation_label(Subject::Quadruped), "LeD");
        assert_eq!(slice.plane(), Plane::Axial);
    }

    #[test]
    fn slice_spacing_is_replaced_not_mutated() {
        let slice = axial(0.0);
        let filled = slice.with_slice_spacing(3.0);
        assert_eq!(slice.voxel_spacing().slice, 0.0);
        assert_eq!(filled.voxel_spacing().slice, 3.0);
        assert_eq!(filled.tlhc(), slice.tlhc());
    }
}

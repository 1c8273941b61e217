//! The reference image that other geometries are posted on.
//!
//! Points are carried into localizer space by translating by `-TLHC` and
//! rotating with a matrix whose rows are the localizer's row, column and
//! normal. In that space the localizer plane is `z = 0` and `z` is the signed
//! distance from it.

use nalgebra::{Matrix3, Point2, Point3};
use rayon::prelude::*;

use crate::consts::{MIN_PIXEL_SPACING, PLANE_TOLERANCE};
use crate::error::GeometryError;
use crate::projector::Projector;
use crate::slice::SliceGeometry;
use crate::volume::VolumeGeometry;

/// Ordered 2D points in localizer pixel coordinates (column, row).
///
/// A closed outline is a polygon whose last point connects back to the
/// first; an open one is a polyline. An empty outline means the geometry does
/// not meet the localizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    points: Vec<Point2<f64>>,
    closed: bool,
}

impl Outline {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn open(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2<f64>> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Line segments to draw, including the closing one of a polygon.
    pub fn segments(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 2 => Some((*last, *first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }
}

/// Geometry of a localizer together with its rotation into local space.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizerFrame {
    geometry: SliceGeometry,
    rotation: Matrix3<f64>,
}

impl LocalizerFrame {
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroDimension`] if the localizer has no rows
    /// or columns and [`GeometryError::DegenerateSpacing`] if its pixel
    /// spacing is too small to map into pixels.
    pub fn new(geometry: SliceGeometry) -> Result<Self, GeometryError> {
        let (rows, columns, _) = geometry.dimensions();
        if rows == 0 || columns == 0 {
            return Err(GeometryError::ZeroDimension);
        }
        let spacing = geometry.voxel_spacing();
        if spacing.row < MIN_PIXEL_SPACING || spacing.column < MIN_PIXEL_SPACING {
            return Err(GeometryError::DegenerateSpacing {
                row: spacing.row,
                column: spacing.column,
            });
        }
        let rotation = Matrix3::from_rows(&[
            geometry.row().transpose(),
            geometry.column().transpose(),
            geometry.normal().transpose(),
        ]);
        Ok(Self { geometry, rotation })
    }

    pub fn geometry(&self) -> &SliceGeometry {
        &self.geometry
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Carry a patient position into localizer space.
    pub fn to_localizer_space(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (*point - *self.geometry.tlhc()))
    }

    /// Drop `z` and convert a localizer-space point to sub-pixel column/row.
    ///
    /// Results run from 0.5 to 0.5 less than the image dimensions, so a
    /// point on the far edge of the image (column `columns`) lands at
    /// `columns - 0.5` and is still drawn inside the image.
    pub fn to_image_space(&self, local: &Point3<f64>) -> Point2<f64> {
        let (rows, columns, _) = self.geometry.dimensions();
        let (rows, columns) = (f64::from(rows), f64::from(columns));
        let spacing = self.geometry.voxel_spacing();
        Point2::new(
            local.x / spacing.column * ((columns - 1.0) / columns) + 0.5,
            local.y / spacing.row * ((rows - 1.0) / rows) + 0.5,
        )
    }

    /// Parallel projection of a patient position onto the localizer image.
    pub fn project_point(&self, point: &Point3<f64>) -> Point2<f64> {
        self.to_image_space(&self.to_localizer_space(point))
    }

    /// Corners of a geometry in localizer space, snapped onto the plane
    /// when within [`PLANE_TOLERANCE`] of it.
    pub(crate) fn local_corners<const N: usize>(
        &self,
        corners: [Point3<f64>; N],
    ) -> [Point3<f64>; N] {
        corners.map(|corner| {
            let mut local = self.to_localizer_space(&corner);
            if local.z.abs() < PLANE_TOLERANCE {
                local.z = 0.0;
            }
            local
        })
    }

    pub(crate) fn outline_from_local(&self, points: &[Point3<f64>], closed: bool) -> Outline {
        let points = points.iter().map(|p| self.to_image_space(p)).collect();
        if closed {
            Outline::closed(points)
        } else {
            Outline::open(points)
        }
    }

    pub fn outline_of(&self, projector: &impl Projector, geometry: &SliceGeometry) -> Outline {
        projector.outline(self, geometry)
    }

    /// Outline of every frame of `volume`, in frame order.
    pub fn outlines_for_volume<P>(&self, projector: &P, volume: &VolumeGeometry) -> Vec<Outline>
    where
        P: Projector + Sync,
    {
        volume
            .frames()
            .par_iter()
            .map(|frame| projector.outline(self, frame))
            .collect()
    }
}

/// Whether the segment `a`–`b` touches or crosses the plane `z = 0`.
pub(crate) fn crosses_z_plane(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a.z <= 0.0 && b.z >= 0.0) || (a.z >= 0.0 && b.z <= 0.0)
}

/// Point where the line through `a` and `b` meets `z = 0`.
///
/// A segment of constant `z` has no single crossing; its start point is
/// returned.
pub(crate) fn intersect_z_plane(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let dz = b.z - a.z;
    if dz.abs() < f64::EPSILON {
        return Point3::new(a.x, a.y, 0.0);
    }
    let t = -a.z / dz;
    let p = *a + (*b - *a) * t;
    Point3::new(p.x, p.y, 0.0)
}

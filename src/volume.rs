use std::fmt;

use nalgebra::{Matrix3, Point3};
use tracing::debug;

use crate::consts::{COPLANAR_TOLERANCE, MIN_PIXEL_SPACING, REGULAR_SPACING_TOLERANCE};
use crate::error::GeometryError;
use crate::orientation::coplanar;
use crate::slice::SliceGeometry;

/// An ordered stack of slice geometries.
///
/// Frames keep the order they were supplied in. Whether the stack is
/// regularly sampled is decided once, on construction; for a regular stack
/// every frame carries the common interval as its slice spacing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeGeometry {
    frames: Vec<SliceGeometry>,
    /// Signed distance along the normal from one frame to the next.
    interval: Option<f64>,
}

impl VolumeGeometry {
    pub fn new(frames: Vec<SliceGeometry>) -> Self {
        let interval = Self::check_regularity(&frames);
        debug!(
            frames = frames.len(),
            regular = interval.is_some(),
            interval = interval.unwrap_or_default(),
            "volume regularity checked"
        );
        let frames = match interval {
            Some(interval) => frames
                .iter()
                .map(|frame| frame.with_slice_spacing(interval.abs()))
                .collect(),
            None => frames,
        };
        Self { frames, interval }
    }

    /// Signed interval between frames if the stack is regularly sampled.
    ///
    /// A stack is regular when it has at least two frames, each pair of
    /// consecutive frames is coplanar, and the distance along the normal
    /// between consecutive frames is the same within
    /// [`REGULAR_SPACING_TOLERANCE`]. Stops at the first pair that fails.
    pub fn check_regularity(frames: &[SliceGeometry]) -> Option<f64> {
        let [first, second, rest @ ..] = frames else {
            return None;
        };
        if !coplanar(first, second, COPLANAR_TOLERANCE) {
            return None;
        }
        let wanted = second.distance_along_normal() - first.distance_along_normal();
        let mut last = second;
        for current in rest {
            if !coplanar(last, current, COPLANAR_TOLERANCE) {
                return None;
            }
            let interval = current.distance_along_normal() - last.distance_along_normal();
            if (interval - wanted).abs() >= REGULAR_SPACING_TOLERANCE {
                return None;
            }
            last = current;
        }
        Some(wanted)
    }

    pub fn frames(&self) -> &[SliceGeometry] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&SliceGeometry> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_regular(&self) -> bool {
        self.interval.is_some()
    }

    /// Common interval between frames in mm, always positive.
    pub fn slice_spacing(&self) -> Option<f64> {
        self.interval.map(f64::abs)
    }

    pub fn distances_along_normal(&self) -> Vec<f64> {
        self.frames
            .iter()
            .map(SliceGeometry::distance_along_normal)
            .collect()
    }

    /// Index of the frame whose distance along its normal is closest to that
    /// of `other`. Ties go to the lowest index.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoFrames`] if the volume is empty.
    pub fn closest_frame_to(&self, other: &SliceGeometry) -> Result<usize, GeometryError> {
        let target = other.distance_along_normal();
        let closest = self
            .frames
            .iter()
            .map(|frame| (frame.distance_along_normal() - target).abs())
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((index, distance)),
            })
            .map(|(index, _)| index)
            .ok_or(GeometryError::NoFrames)?;
        debug!(closest, target, "closest frame found");
        Ok(closest)
    }

    /// Patient position of a column/row offset within `frame`.
    pub fn map_image_to_patient(
        &self,
        column: f64,
        row: f64,
        frame: usize,
    ) -> Result<Point3<f64>, GeometryError> {
        if self.frames.is_empty() {
            return Err(GeometryError::NoFrames);
        }
        let geometry = self
            .frames
            .get(frame)
            .ok_or(GeometryError::FrameOutOfRange {
                frame,
                frames: self.frames.len(),
            })?;
        Ok(geometry.position_of(column, row))
    }

    /// Column, row and (fractional) frame offsets of a patient position.
    ///
    /// The inverse is solved in closed form against the first frame's row,
    /// column and normal, stepping one frame per slice interval. It is exact
    /// only for a regular volume: on an irregular stack the first frame's
    /// basis and its own slice spacing are used as an approximation, so check
    /// [`VolumeGeometry::is_regular`] first.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoFrames`] for an empty volume, and
    /// [`GeometryError::DegenerateSpacing`] when a spacing is too small to
    /// invert.
    pub fn map_patient_to_image(&self, point: &Point3<f64>) -> Result<Point3<f64>, GeometryError> {
        let first = self.frames.first().ok_or(GeometryError::NoFrames)?;
        let spacing = first.voxel_spacing();
        let degenerate = GeometryError::DegenerateSpacing {
            row: spacing.row,
            column: spacing.column,
        };
        let interval = self.interval.unwrap_or(spacing.slice);
        if spacing.row < MIN_PIXEL_SPACING
            || spacing.column < MIN_PIXEL_SPACING
            || interval.abs() < MIN_PIXEL_SPACING
        {
            return Err(degenerate);
        }
        if self.interval.is_none() {
            debug!(
                frames = self.frames.len(),
                "inverse mapping on an irregular volume uses the first frame only"
            );
        }

        let basis = Matrix3::from_columns(&[
            first.row() * spacing.column,
            first.column() * spacing.row,
            first.normal() * interval,
        ]);
        let inverse = basis.try_inverse().ok_or(degenerate)?;
        Ok(Point3::from(inverse * (*point - *first.tlhc())))
    }

    /// The whole stack as a single slab geometry.
    ///
    /// The slab is centered between the first and last frame, has the
    /// first frame's in-plane extent, and is `frames × spacing` thick, where
    /// spacing is the regular interval or else the first frame's thickness.
    pub fn as_slab(&self) -> Result<SliceGeometry, GeometryError> {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return Err(GeometryError::NoFrames);
        };
        let center = nalgebra::center(first.tlhc(), last.tlhc());
        let thickness = self
            .slice_spacing()
            .unwrap_or_else(|| first.slice_thickness());
        let (rows, columns, _) = first.dimensions();
        let frames = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        Ok(first.with_extent(center, thickness, (rows, columns, frames)))
    }
}

impl fmt::Display for VolumeGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            writeln!(f, "[{index}] {frame}")?;
        }
        Ok(())
    }
}

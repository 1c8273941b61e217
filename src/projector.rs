//! Ways of posting a slice or slab on a localizer.
//!
//! - [`ProjectSlice`] projects the slice rectangle along the localizer
//!   normal.
//! - [`IntersectSlice`] cuts the zero-thickness slice rectangle with the
//!   localizer plane.
//! - [`IntersectVolume`] cuts the slab around the slice (frames times
//!   thickness) with the localizer plane.
//!
//! None of them fail: an empty [`Outline`] means there is nothing to draw.

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::consts::{LOCALIZATION_EXTENT, PLANE_TOLERANCE};
use crate::enums::ProjectionKind;
use crate::localizer::{LocalizerFrame, Outline, crosses_z_plane, intersect_z_plane};
use crate::slice::{SliceGeometry, VoxelSpacing};

pub trait Projector {
    /// Outline of `geometry` in the pixel space of `localizer`.
    fn outline(&self, localizer: &LocalizerFrame, geometry: &SliceGeometry) -> Outline;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct IntersectSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct IntersectVolume;

impl Projector for ProjectSlice {
    /// Closed quadrilateral of the four projected corners. A slice seen edge
    /// on collapses to a line but is still returned.
    fn outline(&self, localizer: &LocalizerFrame, geometry: &SliceGeometry) -> Outline {
        let corners = geometry
            .corners()
            .map(|corner| localizer.to_localizer_space(&corner));
        localizer.outline_from_local(&corners, true)
    }
}

impl Projector for IntersectSlice {
    /// The whole rectangle when the slice lies in the localizer plane,
    /// otherwise the segment where the plane cuts it. A slice that only
    /// touches the plane at one corner gives an empty outline.
    fn outline(&self, localizer: &LocalizerFrame, geometry: &SliceGeometry) -> Outline {
        let corners = localizer.local_corners(geometry.corners());
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0)];
        let crossing = edges.map(|(a, b)| crosses_z_plane(&corners[a], &corners[b]));

        if !crossing.contains(&true) {
            return Outline::empty();
        }
        if corners.iter().all(|corner| corner.z == 0.0) {
            return localizer.outline_from_local(&corners, true);
        }

        let mut points: Vec<Point3<f64>> = Vec::with_capacity(4);
        for (&(a, b), _) in edges.iter().zip(crossing).filter(|(_, crosses)| *crosses) {
            let point = intersect_z_plane(&corners[a], &corners[b]);
            if points
                .iter()
                .all(|known| (*known - point).norm() >= PLANE_TOLERANCE)
            {
                points.push(point);
            }
        }
        if points.len() < 2 {
            return Outline::empty();
        }
        localizer.outline_from_local(&points, points.len() > 2)
    }
}

/// Opposite edges of a slab, by corner index, in the order they are tried.
/// Within a group the edges are listed in drawing order.
const SLAB_EDGE_GROUPS: [[(usize, usize); 4]; 3] = [
    [(0, 1), (2, 3), (6, 7), (4, 5)],
    [(0, 3), (1, 2), (5, 6), (4, 7)],
    [(0, 4), (1, 5), (2, 6), (3, 7)],
];

impl Projector for IntersectVolume {
    /// Closed quadrilateral where the localizer plane cuts the slab, taken
    /// from the first group of four parallel edges that all cross the plane.
    fn outline(&self, localizer: &LocalizerFrame, geometry: &SliceGeometry) -> Outline {
        let corners = localizer.local_corners(geometry.slab_corners());
        SLAB_EDGE_GROUPS
            .iter()
            .find(|group| {
                group
                    .iter()
                    .all(|&(a, b)| crosses_z_plane(&corners[a], &corners[b]))
            })
            .map_or_else(Outline::empty, |group| {
                let points = group.map(|(a, b)| intersect_z_plane(&corners[a], &corners[b]));
                localizer.outline_from_local(&points, true)
            })
    }
}

impl IntersectVolume {
    /// Outlines of spectroscopy-style localization slabs.
    ///
    /// Each slab is modelled as a cuboid [`LOCALIZATION_EXTENT`] mm wide in
    /// its own plane. Slabs that miss the localizer, or have no usable
    /// normal, contribute nothing.
    pub fn outline_for_volume_localization(
        &self,
        localizer: &LocalizerFrame,
        slabs: &[LocalizationSlab],
    ) -> Vec<Outline> {
        slabs
            .iter()
            .filter_map(|slab| {
                let geometry = slab.geometry();
                if geometry.is_none() {
                    warn!(normal = ?slab.normal, "skipping localization slab without a normal");
                }
                geometry
            })
            .map(|geometry| self.outline(localizer, &geometry))
            .filter(|outline| !outline.is_empty())
            .collect()
    }
}

impl Projector for ProjectionKind {
    fn outline(&self, localizer: &LocalizerFrame, geometry: &SliceGeometry) -> Outline {
        match self {
            ProjectionKind::ProjectSlice => ProjectSlice.outline(localizer, geometry),
            ProjectionKind::IntersectSlice => IntersectSlice.outline(localizer, geometry),
            ProjectionKind::IntersectVolume => IntersectVolume.outline(localizer, geometry),
        }
    }
}

/// A slab known only by its normal, thickness and mid point, as in a
/// spectroscopy Volume Localization Sequence item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalizationSlab {
    pub normal: Vector3<f64>,
    /// mm
    pub thickness: f64,
    pub midpoint: Point3<f64>,
}

impl LocalizationSlab {
    pub fn new(normal: Vector3<f64>, thickness: f64, midpoint: Point3<f64>) -> Self {
        Self {
            normal,
            thickness,
            midpoint,
        }
    }

    /// Oversized slab geometry centered on the mid point, or `None` if the
    /// normal is zero.
    pub fn geometry(&self) -> Option<SliceGeometry> {
        let normal = self.normal.try_normalize(f64::EPSILON)?;
        // Any in-plane axis will do; start from the world axis least aligned
        // with the normal.
        let (x, y, z) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        let helper = if x <= y && x <= z {
            Vector3::x()
        } else if y <= z {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let row = helper.cross(&normal).normalize();
        let column = normal.cross(&row);
        let half = LOCALIZATION_EXTENT / 2.0;
        let tlhc = self.midpoint - row * half - column * half;
        Some(SliceGeometry::from_orthonormal(
            row,
            column,
            tlhc,
            VoxelSpacing::new(LOCALIZATION_EXTENT, LOCALIZATION_EXTENT, 0.0),
            self.thickness,
            (1, 1, 1),
        ))
    }
}

use dicom_localizer::{
    IntersectSlice, IntersectVolume, LocalizerFrame, ProjectSlice, Projector, SliceGeometry,
    VolumeGeometry, VoxelSpacing,
};
use nalgebra::{Point3, Rotation3, Vector3};
use proptest::prelude::*;

fn rotated_slice(
    roll: f64,
    pitch: f64,
    yaw: f64,
    tlhc: Point3<f64>,
    spacing: (f64, f64),
    thickness: f64,
    dimensions: (u32, u32, u32),
) -> SliceGeometry {
    let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);
    SliceGeometry::new(
        rotation * Vector3::x(),
        rotation * Vector3::y(),
        tlhc,
        VoxelSpacing::new(spacing.0, spacing.1, 0.0),
        thickness,
        dimensions,
    )
    .unwrap()
}

fn axial_localizer() -> LocalizerFrame {
    LocalizerFrame::new(rotated_slice(
        0.0,
        0.0,
        0.0,
        Point3::new(-256.0, -256.0, 0.0),
        (2.0, 2.0),
        1.0,
        (256, 256, 1),
    ))
    .unwrap()
}

proptest! {
    #[test]
    fn position_and_image_coordinate_round_trip(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
        ox in -200.0f64..200.0, oy in -200.0f64..200.0, oz in -200.0f64..200.0,
        row_spacing in 0.1f64..5.0, column_spacing in 0.1f64..5.0,
        column in -10.0f64..600.0, row in -10.0f64..600.0,
    ) {
        let slice = rotated_slice(
            roll, pitch, yaw,
            Point3::new(ox, oy, oz),
            (row_spacing, column_spacing),
            1.0,
            (512, 512, 1),
        );
        let recovered = slice.image_coordinate_of(&slice.position_of(column, row)).unwrap();
        prop_assert!((recovered.x - column).abs() < 1e-6, "column {} vs {}", recovered.x, column);
        prop_assert!((recovered.y - row).abs() < 1e-6, "row {} vs {}", recovered.y, row);
    }

    #[test]
    fn normal_is_unit_and_orthogonal(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
    ) {
        let slice = rotated_slice(roll, pitch, yaw, Point3::origin(), (1.0, 1.0), 1.0, (1, 1, 1));
        prop_assert!((slice.normal().norm() - 1.0).abs() < 1e-9);
        prop_assert!(slice.normal().dot(slice.row()).abs() < 1e-9);
        prop_assert!(slice.normal().dot(slice.column()).abs() < 1e-9);
    }

    #[test]
    fn regular_volume_mapping_round_trip(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
        interval in prop_oneof![-8.0f64..-0.5, 0.5f64..8.0],
        frames in 2usize..12,
        column in 0.0f64..256.0, row in 0.0f64..256.0,
        frame_seed in 0usize..1000,
    ) {
        let first = rotated_slice(
            roll, pitch, yaw,
            Point3::new(-100.0, 20.0, 35.0),
            (0.8, 1.2),
            1.0,
            (256, 256, 1),
        );
        let step = first.normal() * interval;
        let stack: Vec<_> = (0..frames)
            .map(|i| {
                SliceGeometry::new(
                    *first.row(),
                    *first.column(),
                    *first.tlhc() + step * i as f64,
                    *first.voxel_spacing(),
                    1.0,
                    (256, 256, 1),
                )
                .unwrap()
            })
            .collect();
        let volume = VolumeGeometry::new(stack);
        prop_assert!(volume.is_regular());

        let frame = frame_seed % frames;
        let patient = volume.map_image_to_patient(column, row, frame).unwrap();
        let image = volume.map_patient_to_image(&patient).unwrap();
        prop_assert!((image.x - column).abs() < 1e-6);
        prop_assert!((image.y - row).abs() < 1e-6);
        prop_assert!((image.z - frame as f64).abs() < 1e-6);
    }

    #[test]
    fn slice_through_localizer_always_intersects(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
        cx in -200.0f64..200.0, cy in -200.0f64..200.0,
    ) {
        let localizer = axial_localizer();
        let centered = rotated_slice(roll, pitch, yaw, Point3::origin(), (1.0, 1.0), 1.0, (100, 100, 1));
        // Move the slice so its center lies on the localizer plane.
        let center = centered.position_of(50.0, 50.0);
        let slice = rotated_slice(
            roll, pitch, yaw,
            Point3::new(cx, cy, 0.0) - center.coords,
            (1.0, 1.0),
            1.0,
            (100, 100, 1),
        );
        let outline = IntersectSlice.outline(&localizer, &slice);
        prop_assert!(!outline.is_empty());
        prop_assert!(outline.len() == 2 || outline.len() == 4);
    }

    #[test]
    fn slice_clear_of_localizer_never_intersects(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
        lift in 1.0f64..500.0,
    ) {
        let localizer = axial_localizer();
        // Every corner is within 100·√2 mm of the TLHC.
        let slice = rotated_slice(
            roll, pitch, yaw,
            Point3::new(0.0, 0.0, 150.0 + lift),
            (1.0, 1.0),
            1.0,
            (100, 100, 1),
        );
        prop_assert!(IntersectSlice.outline(&localizer, &slice).is_empty());
    }

    #[test]
    fn projected_and_intersected_volume_outlines_are_quadrilaterals(
        roll in -3.14f64..3.14, pitch in -1.5f64..1.5, yaw in -3.14f64..3.14,
        oz in -60.0f64..60.0,
        frames in 1u32..20,
    ) {
        let localizer = axial_localizer();
        let slab = rotated_slice(
            roll, pitch, yaw,
            Point3::new(-20.0, -20.0, oz),
            (1.0, 1.0),
            2.0,
            (40, 40, frames),
        );
        let projected = ProjectSlice.outline(&localizer, &slab);
        prop_assert!(projected.is_closed());
        prop_assert_eq!(projected.len(), 4);

        let cut = IntersectVolume.outline(&localizer, &slab);
        prop_assert!(cut.is_empty() || (cut.is_closed() && cut.len() == 4));
    }
}

use dicom_localizer::{
    enums::{ProjectionKind, Subject},
    error::GeometryError,
    localizer::LocalizerFrame,
    slice::SliceGeometry,
    volume::VolumeGeometry,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), GeometryError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scout = SliceGeometry::from_attributes(
        [1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
        [-250.0, 0.0, 250.0],
        [1.953125, 1.953125],
        1.0,
        256,
        256,
    )?;
    let localizer = LocalizerFrame::new(scout)?;
    info!(
        plane = %localizer.geometry().plane(),
        orientation = %localizer.geometry().orientation_label(Subject::Biped),
        "localizer"
    );

    let frames = (0..5)
        .map(|i| {
            SliceGeometry::from_attributes(
                [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                [-120.0, -120.0, -20.0 + 10.0 * f64::from(i)],
                [0.9375, 0.9375],
                5.0,
                256,
                256,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let volume = VolumeGeometry::new(frames);
    info!(
        frames = volume.len(),
        spacing = ?volume.slice_spacing(),
        "axial stack"
    );

    for kind in [ProjectionKind::ProjectSlice, ProjectionKind::IntersectSlice] {
        for (frame, outline) in localizer.outlines_for_volume(&kind, &volume).iter().enumerate() {
            let points: Vec<_> = outline
                .points()
                .iter()
                .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
                .collect();
            println!("{kind:?} frame {frame}: {}", points.join(" "));
        }
    }

    let slab = volume.as_slab()?;
    let outline = localizer.outline_of(&ProjectionKind::IntersectVolume, &slab);
    println!("IntersectVolume whole stack: {:?}", outline.points());

    Ok(())
}

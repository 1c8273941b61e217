use crate::{
    error::GeometryError,
    projector::LocalizationSlab,
    slice::{SliceGeometry, VoxelSpacing},
    volume::VolumeGeometry,
};

use dicom::core::Tag;
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;
use nalgebra::{Point3, Vector3};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GeometryLoaderError {
    #[error("Missing attribute {0}")]
    MissingAttribute(Tag),

    #[error("Invalid value for attribute {0}")]
    InvalidAttribute(Tag),

    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub struct GeometryLoader;

impl GeometryLoader {
    /// Read the plane geometry of a single image
    ///
    /// Slice Thickness is optional and read as 0 when absent; Spacing
    /// Between Slices, when present, becomes the slice spacing.
    ///
    /// # Errors
    ///
    /// Returns error if orientation, position, pixel spacing, rows or
    /// columns are missing or malformed, or if the orientation is not
    /// orthonormal
    pub fn slice_from_dicom_object(
        dicom_object: &InMemDicomObject,
    ) -> Result<SliceGeometry, GeometryLoaderError> {
        let orientation: [f64; 6] = Self::fixed(dicom_object, tags::IMAGE_ORIENTATION_PATIENT)?;
        let position: [f64; 3] = Self::fixed(dicom_object, tags::IMAGE_POSITION_PATIENT)?;
        let [row_spacing, column_spacing]: [f64; 2] =
            Self::fixed(dicom_object, tags::PIXEL_SPACING)?;
        let rows = Self::uint(dicom_object, tags::ROWS)?;
        let columns = Self::uint(dicom_object, tags::COLUMNS)?;
        let slice_thickness = Self::optional_float(dicom_object, tags::SLICE_THICKNESS)?
            .unwrap_or_else(|| {
                debug!("no slice thickness, assuming 0");
                0.0
            });
        let slice_spacing =
            Self::optional_float(dicom_object, tags::SPACING_BETWEEN_SLICES)?.unwrap_or(0.0);

        let slice = SliceGeometry::new(
            Vector3::new(orientation[0], orientation[1], orientation[2]),
            Vector3::new(orientation[3], orientation[4], orientation[5]),
            Point3::from(position),
            VoxelSpacing::new(row_spacing, column_spacing, slice_spacing),
            slice_thickness,
            (rows, columns, 1),
        )?;
        Ok(slice)
    }

    /// Build a volume from images in acquisition order
    ///
    /// Images without usable geometry are skipped, as when loading pixel
    /// volumes.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryLoaderError::NoValidImages`] if no image has
    /// usable geometry
    pub fn volume_from_dicom_objects<'a>(
        dicom_objects: impl IntoIterator<Item = &'a InMemDicomObject>,
    ) -> Result<VolumeGeometry, GeometryLoaderError> {
        let frames: Vec<_> = dicom_objects
            .into_iter()
            .enumerate()
            .filter_map(|(index, dicom_object)| {
                Self::slice_from_dicom_object(dicom_object)
                    .inspect_err(|error| warn!(index, %error, "skipping image"))
                    .ok()
            })
            .collect();

        if frames.is_empty() {
            return Err(GeometryLoaderError::NoValidImages);
        }

        Ok(VolumeGeometry::new(frames))
    }

    /// Read the slabs of a spectroscopy Volume Localization Sequence
    ///
    /// An object without the sequence has no slabs.
    ///
    /// # Errors
    ///
    /// Returns error if an item lacks thickness, orientation or mid point
    pub fn localization_slabs(
        dicom_object: &InMemDicomObject,
    ) -> Result<Vec<LocalizationSlab>, GeometryLoaderError> {
        let Ok(sequence) = dicom_object.element(tags::VOLUME_LOCALIZATION_SEQUENCE) else {
            return Ok(Vec::new());
        };
        let items = sequence
            .items()
            .ok_or(GeometryLoaderError::InvalidAttribute(
                tags::VOLUME_LOCALIZATION_SEQUENCE,
            ))?;

        items
            .iter()
            .map(|item| {
                let thickness = Self::float(item, tags::SLAB_THICKNESS)?;
                let normal: [f64; 3] = Self::fixed(item, tags::SLAB_ORIENTATION)?;
                let midpoint: [f64; 3] = Self::fixed(item, tags::MID_SLAB_POSITION)?;
                Ok(LocalizationSlab::new(
                    Vector3::from(normal),
                    thickness,
                    Point3::from(midpoint),
                ))
            })
            .collect()
    }

    fn fixed<const N: usize>(
        dicom_object: &InMemDicomObject,
        tag: Tag,
    ) -> Result<[f64; N], GeometryLoaderError> {
        let values = dicom_object
            .element(tag)
            .map_err(|_| GeometryLoaderError::MissingAttribute(tag))?
            .to_multi_float64()
            .map_err(|_| GeometryLoaderError::InvalidAttribute(tag))?;
        <[f64; N]>::try_from(values.as_slice())
            .map_err(|_| GeometryLoaderError::InvalidAttribute(tag))
    }

    fn float(dicom_object: &InMemDicomObject, tag: Tag) -> Result<f64, GeometryLoaderError> {
        Self::optional_float(dicom_object, tag)?
            .ok_or(GeometryLoaderError::MissingAttribute(tag))
    }

    fn optional_float(
        dicom_object: &InMemDicomObject,
        tag: Tag,
    ) -> Result<Option<f64>, GeometryLoaderError> {
        let Ok(element) = dicom_object.element(tag) else {
            return Ok(None);
        };
        element
            .to_float64()
            .map(Some)
            .map_err(|_| GeometryLoaderError::InvalidAttribute(tag))
    }

    fn uint(dicom_object: &InMemDicomObject, tag: Tag) -> Result<u32, GeometryLoaderError> {
        dicom_object
            .element(tag)
            .map_err(|_| GeometryLoaderError::MissingAttribute(tag))?
            .to_int::<u32>()
            .map_err(|_| GeometryLoaderError::InvalidAttribute(tag))
    }
}

//! # DICOM-localizer library
//!
//! This crate computes where other images lie on a localizer (scout) image,
//! the reference lines a viewer posts on a scout while the user pages
//! through a stack.
//!
//! It works on already-parsed geometry: Image Orientation (Patient), Image
//! Position (Patient), Pixel Spacing, Slice Thickness, Rows and Columns.
//! These can be read from a dicom-rs [`InMemDicomObject`] with
//! [`GeometryLoader`], or supplied directly. No pixel data is decoded.
//!
//! The building blocks are:
//!  - [`SliceGeometry`]: one image plane in patient space, with mappings
//!    between pixel offsets and patient positions
//!  - [`VolumeGeometry`]: an ordered stack of planes, checked once for
//!    regular sampling
//!  - [`LocalizerFrame`]: the scout that outlines are drawn on
//!  - [`Projector`]s: [`ProjectSlice`], [`IntersectSlice`] and
//!    [`IntersectVolume`], each turning a geometry into an [`Outline`] in
//!    localizer pixels
//!
//! Orientation helpers in [`orientation`] label direction cosines as
//! anatomical directions (R/L, A/P, H/F, or their quadruped equivalents)
//! and planes as axial, coronal, sagittal or oblique.
//!
//! Outlines for every frame of a volume are computed in parallel using
//! rayon.
//!
//! # Examples
//!
//! ## Posting an axial slice on a coronal scout
//!
//! ```
//! # use dicom_localizer::{IntersectSlice, LocalizerFrame, SliceGeometry};
//! let scout = SliceGeometry::from_attributes(
//!     [1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
//!     [-128.0, 0.0, 128.0],
//!     [1.0, 1.0],
//!     1.0,
//!     256,
//!     256,
//! )
//! .expect("scout orientation should be orthonormal");
//! let slice = SliceGeometry::from_attributes(
//!     [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     [-128.0, -128.0, 20.0],
//!     [1.0, 1.0],
//!     1.0,
//!     256,
//!     256,
//! )
//! .expect("slice orientation should be orthonormal");
//!
//! let localizer = LocalizerFrame::new(scout).expect("scout should have pixels");
//! let line = localizer.outline_of(&IntersectSlice, &slice);
//! assert_eq!(line.len(), 2);
//! assert!(!line.is_closed());
//! ```
//!
//! [`InMemDicomObject`]: https://docs.rs/dicom-object/latest/dicom_object/mem/struct.InMemDicomObject.html

pub mod consts;
pub mod enums;
pub mod error;
pub mod geometry_loader;
pub mod localizer;
pub mod orientation;
pub mod projector;
pub mod slice;
pub mod volume;

pub use enums::{Plane, ProjectionKind, Subject};
pub use error::GeometryError;
pub use geometry_loader::{GeometryLoader, GeometryLoaderError};
pub use localizer::{LocalizerFrame, Outline};
pub use projector::{
    IntersectSlice, IntersectVolume, LocalizationSlab, ProjectSlice, Projector,
};
pub use slice::{SliceGeometry, VoxelSpacing};
pub use volume::VolumeGeometry;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Direction cosines are not orthonormal: {reason}")]
    NotOrthonormal { reason: &'static str },

    #[error("Volume has no frames")]
    NoFrames,

    #[error("Pixel spacing too small for mapping (row {row} mm, column {column} mm)")]
    DegenerateSpacing { row: f64, column: f64 },

    #[error("Frame {frame} out of range for volume with {frames} frames")]
    FrameOutOfRange { frame: usize, frames: usize },

    #[error("Image has zero rows or columns")]
    ZeroDimension,
}

//! Error types for crop operations

use thiserror::Error;

/// Failures of a single crop operation
///
/// Engine entry points stay fail-soft: these are logged and turned into
/// `None`, empty results or `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("source image has been disposed")]
    ImageDisposed,
    #[error("no source image set")]
    NoImage,
    #[error("view layout is not ready")]
    LayoutNotReady,
    #[error("region {region} is degenerate, no perspective transform exists")]
    DegenerateQuad { region: usize },
    #[error("perspective transform is not invertible")]
    SingularTransform,
    #[error("invalid output size {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, CropError>;

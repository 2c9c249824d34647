//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single seam between the build pipeline
//! and pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate; tests use the recording `MockBackend` below.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Decode `params.source`, apply the sizing strategy and write the result
    /// to `params.output`, creating missing parent directories.
    ///
    /// Returns the dimensions of the written image.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}

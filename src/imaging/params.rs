//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`thumbnails`](super::thumbnails) walker (which
//! decides which derivatives to create) and the [`backend`](super::backend)
//! (which does the pixel work), so a mock backend can stand in during tests.

use crate::config::{ResizeFilter, ThumbnailMethod, ThumbnailSpec};
use std::path::{Path, PathBuf};

/// Everything the backend needs for one thumbnail derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub method: ThumbnailMethod,
    pub width: u32,
    pub height: u32,
    pub filter: ResizeFilter,
}

impl ThumbnailParams {
    pub fn from_spec(source: &Path, output: &Path, spec: &ThumbnailSpec) -> Self {
        Self {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            method: spec.method,
            width: spec.width,
            height: spec.height,
            filter: spec.filter,
        }
    }
}

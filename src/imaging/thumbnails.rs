//! Automatic thumbnails for a static image directory.
//!
//! Every image under `static/<subpath>` gets a derivative in a hidden
//! [`THUMB_DIR_NAME`] directory next to its mirrored copy:
//!
//! ```text
//! static/img/gallery/a.jpg        → <output>/static/img/gallery/.thumbs/a.jpg
//! static/img/gallery/2024/b.png   → <output>/static/img/gallery/2024/.thumbs/b.png
//! ```

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ThumbnailParams;
use super::rust_backend::is_image;
use crate::config::{THUMB_DIR_NAME, ThumbnailSpec};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("failed to walk image directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("thumbnail for {path} failed: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// One derivative written by [`generate_thumbnails`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedThumbnail {
    pub source: PathBuf,
    pub output: PathBuf,
    pub dimensions: Dimensions,
}

/// Where the thumbnail for `image` (relative to the static root) is written.
pub fn thumbnail_path(static_dest: &Path, relative_image: &Path) -> PathBuf {
    let dir = relative_image.parent().unwrap_or(Path::new(""));
    let name = relative_image.file_name().unwrap_or_default();
    static_dest.join(dir).join(THUMB_DIR_NAME).join(name)
}

/// Generate thumbnails for every image under `static_src/subpath`.
///
/// Images are visited in file-name order. Existing `.thumbs` directories in
/// the source are not descended into. The first failure stops the run.
pub fn generate_thumbnails(
    backend: &impl ImageBackend,
    static_src: &Path,
    static_dest: &Path,
    subpath: &str,
    spec: &ThumbnailSpec,
) -> Result<Vec<GeneratedThumbnail>, ThumbnailError> {
    let image_dir = static_src.join(subpath);
    let mut generated = Vec::new();

    let walker = WalkDir::new(&image_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != THUMB_DIR_NAME);

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(static_src) else {
            continue;
        };
        let output = thumbnail_path(static_dest, relative);
        let params = ThumbnailParams::from_spec(entry.path(), &output, spec);
        let dimensions = backend
            .thumbnail(&params)
            .map_err(|source| ThumbnailError::Image {
                path: entry.path().to_path_buf(),
                source,
            })?;

        generated.push(GeneratedThumbnail {
            source: entry.path().to_path_buf(),
            output,
            dimensions,
        });
    }

    Ok(generated)
}

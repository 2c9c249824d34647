//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` |
//! | `resize` | `DynamicImage::resize_exact` |
//! | `fit` | [`calculate_fit_dimensions`] + `resize_exact` |
//! | `fill` / `thumbnail` | [`calculate_fill_dimensions`] + `resize_exact` + centered `crop_imm` |
//! | Encode | `DynamicImage::save_with_format`, format from the output extension |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{
    calculate_center_crop, calculate_fill_dimensions, calculate_fit_dimensions,
};
use super::params::ThumbnailParams;
use crate::config::{ResizeFilter, ThumbnailMethod};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::path::Path;

/// Extensions eligible for automatic thumbnails (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Whether `path` has one of [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Gaussian => FilterType::Gaussian,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Resize-to-cover then center-crop to exactly `width`×`height`.
fn fill(img: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    let (fill_w, fill_h) = calculate_fill_dimensions(img.dimensions(), (width, height));
    let filled = img.resize_exact(fill_w, fill_h, filter);
    let (x, y) = calculate_center_crop((fill_w, fill_h), (width, height));
    filled.crop_imm(x, y, width, height)
}

fn apply_method(img: &DynamicImage, params: &ThumbnailParams) -> DynamicImage {
    let filter = filter_type(params.filter);
    match params.method {
        ThumbnailMethod::Resize => img.resize_exact(params.width, params.height, filter),
        ThumbnailMethod::Fit => {
            let (w, h) = calculate_fit_dimensions(img.dimensions(), (params.width, params.height));
            if (w, h) == img.dimensions() {
                img.clone()
            } else {
                img.resize_exact(w, h, filter)
            }
        }
        ThumbnailMethod::Fill | ThumbnailMethod::Thumbnail => {
            fill(img, params.width, params.height, filter)
        }
    }
}

/// Save `img` to `path`, inferring the format from the extension.
fn save_image(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Unsupported output format {}: {}",
            path.display(),
            e
        ))
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // JPEG has no alpha channel
    let result = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, format)
    } else {
        img.save_with_format(path, format)
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to write {}: {}", path.display(), e))
    })
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let thumb = apply_method(&img, params);
        save_image(&thumb, &params.output)?;
        Ok(Dimensions {
            width: thumb.width(),
            height: thumb.height(),
        })
    }
}

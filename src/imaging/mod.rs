//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate (PNG, JPEG) |
//! | **resize** | `resize_exact` |
//! | **fit** | aspect-preserving `resize_exact` within the box |
//! | **fill / thumbnail** | cover resize + center crop |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Thumbnails**: walks an image directory and drives the backend

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;
pub mod thumbnails;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_center_crop, calculate_fill_dimensions, calculate_fit_dimensions};
pub use params::ThumbnailParams;
pub use rust_backend::{IMAGE_EXTENSIONS, RustBackend, is_image};
pub use thumbnails::{GeneratedThumbnail, ThumbnailError, generate_thumbnails, thumbnail_path};

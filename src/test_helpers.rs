//! Shared test utilities for the siteware test suite.
//!
//! Provides file writers, synthetic image generation and a project
//! scaffold for tests that drive the build pipeline.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = setup_project("<main>{% include \"content\" %}</main>");
//! write_file(&project.path().join("src/index.html"), "<h1>Hi</h1>");
//! create_test_png(&project.path().join("static/img/a.png"), 64, 48);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::{
    DEFAULT_TEMPLATE_NAME, MASTER_CONFIG_FILE, SOURCE_DIR_NAME, STATIC_DIR_NAME,
    TEMPLATE_DIR_NAME,
};

// =========================================================================
// Files
// =========================================================================

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Read a file to a string. Panics with the path on failure.
pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Write a `width`×`height` RGB gradient PNG, creating parent directories.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Project scaffold
// =========================================================================

/// Create a project in a temp directory with the three standard
/// directories, a build config pointing at `public/`, an existing output
/// directory and `default.template` set to `layout`.
pub fn setup_project(layout: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for dir in [SOURCE_DIR_NAME, STATIC_DIR_NAME, "public"] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
    write_file(
        &root.join(TEMPLATE_DIR_NAME).join(DEFAULT_TEMPLATE_NAME),
        layout,
    );
    write_file(&root.join(MASTER_CONFIG_FILE), r#"{"output": "public"}"#);
    tmp
}

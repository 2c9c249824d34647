//! Build configuration and per-directory configuration.
//!
//! Two kinds of JSON file drive a build:
//!
//! ```text
//! project/
//! ├── siteware.master.json     # Build config: where the site is written
//! ├── src/
//! │   ├── siteware.json        # Directory config for src/
//! │   ├── index.html
//! │   └── blog/
//! │       ├── siteware.json    # Directory config for src/blog/ (independent)
//! │       └── first.html
//! ├── static/
//! └── templates/
//!     └── default.template
//! ```
//!
//! ## Build config
//!
//! ```json
//! { "output": "../site", "port": 8080 }
//! ```
//!
//! `output` is required and must not be blank; relative paths are resolved
//! against the project root. `port` is optional and only used by `serve`.
//!
//! ## Directory config
//!
//! Top-level keys are file names in the same directory:
//!
//! ```json
//! {
//!   "index.html": { "template": "home.template", "data": { "title": "Home" } },
//!   "static": {
//!     "autoThumbnail": {
//!       "img/gallery": { "method": "fill", "width": 200, "height": 200 }
//!     }
//!   }
//! }
//! ```
//!
//! Directory configs do **not** cascade: a directory without a
//! `siteware.json` uses defaults even when its parent has one. Within one
//! build each directory's config is read at most once (see [`ConfigCache`]).
//!
//! Unknown keys inside an entry are rejected to catch typos early.

use crate::types::Data;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Build configuration file, at the project root.
pub const MASTER_CONFIG_FILE: &str = "siteware.master.json";
/// Per-directory configuration file, inside any source directory.
pub const DIR_CONFIG_FILE: &str = "siteware.json";
pub const SOURCE_DIR_NAME: &str = "src";
pub const STATIC_DIR_NAME: &str = "static";
pub const TEMPLATE_DIR_NAME: &str = "templates";
/// Template used when a file has no entry or a blank `template`.
pub const DEFAULT_TEMPLATE_NAME: &str = "default.template";
/// Hidden directory that receives thumbnail derivatives.
pub const THUMB_DIR_NAME: &str = ".thumbs";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("output directory unset in {0}")]
    MissingOutput(PathBuf),
    #[error("invalid config {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

// =============================================================================
// Build config
// =============================================================================

/// Process-wide build settings, loaded once from [`MASTER_CONFIG_FILE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory for the generated site.
    #[serde(alias = "Output")]
    pub output: String,
    /// HTTP port for `serve` when no `--port` flag is given.
    #[serde(alias = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl BuildConfig {
    /// The output directory, resolved against `root` when relative.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(self.output.trim())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

/// Load and validate the build config from `root`.
///
/// A missing or malformed file is an error, as is a blank `output`.
pub fn load_build_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    let path = root.join(MASTER_CONFIG_FILE);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config: BuildConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;
    if config.output.trim().is_empty() {
        return Err(ConfigError::MissingOutput(path));
    }
    Ok(config)
}

// =============================================================================
// Directory config
// =============================================================================

/// Sizing strategy for a thumbnail derivative.
///
/// Parsed case-insensitively; anything unrecognised falls back to
/// [`ThumbnailMethod::Thumbnail`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ThumbnailMethod {
    /// Exact `width`×`height`, aspect ratio ignored.
    Resize,
    /// Aspect-preserving, bounded by `width`×`height`.
    Fit,
    /// Aspect-preserving cover, then center-crop to exactly `width`×`height`.
    Fill,
    /// Same result as [`ThumbnailMethod::Fill`].
    #[default]
    Thumbnail,
}

impl From<String> for ThumbnailMethod {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "resize" => ThumbnailMethod::Resize,
            "fit" => ThumbnailMethod::Fit,
            "fill" => ThumbnailMethod::Fill,
            _ => ThumbnailMethod::Thumbnail,
        }
    }
}

/// Resampling filter used when scaling thumbnails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// One `autoThumbnail` entry: how to derive thumbnails for an image directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailSpec {
    #[serde(default, alias = "Method")]
    pub method: ThumbnailMethod,
    #[serde(alias = "Width")]
    pub width: u32,
    #[serde(alias = "Height")]
    pub height: u32,
    #[serde(default, alias = "Filter")]
    pub filter: ResizeFilter,
}

/// Settings for one file (or, keyed by [`STATIC_DIR_NAME`], the static tree).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Template file name in `templates/`; blank means the default template.
    #[serde(alias = "Template")]
    pub template: String,
    /// Payload exposed to the template as `data`.
    #[serde(alias = "Data")]
    pub data: Data,
    /// Image subdirectory (relative to `static/`) → thumbnail spec.
    #[serde(rename = "autoThumbnail", alias = "AutoThumbnail")]
    pub auto_thumbnail: BTreeMap<String, ThumbnailSpec>,
}

/// Template and payload that apply to one source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSettings<'a> {
    pub template: &'a str,
    pub data: &'a Data,
}

static NO_DATA: Data = Data::Null;

/// The parsed contents of one `siteware.json`: file name → [`FileConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DirectoryConfig {
    pub files: HashMap<String, FileConfig>,
}

impl DirectoryConfig {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Template and data for `file_name`, applying the defaults:
    /// no entry or a blank template → [`DEFAULT_TEMPLATE_NAME`];
    /// no entry → no data.
    pub fn page_settings(&self, file_name: &str) -> PageSettings<'_> {
        match self.files.get(file_name) {
            Some(entry) => PageSettings {
                template: if entry.template.trim().is_empty() {
                    DEFAULT_TEMPLATE_NAME
                } else {
                    entry.template.trim()
                },
                data: &entry.data,
            },
            None => PageSettings {
                template: DEFAULT_TEMPLATE_NAME,
                data: &NO_DATA,
            },
        }
    }

    /// The `autoThumbnail` specs declared on the static entry, in subpath order.
    pub fn auto_thumbnails(&self) -> impl Iterator<Item = (&str, &ThumbnailSpec)> {
        self.files
            .get(STATIC_DIR_NAME)
            .into_iter()
            .flat_map(|entry| entry.auto_thumbnail.iter())
            .map(|(subpath, spec)| (subpath.as_str(), spec))
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Validation {
            path: path.to_path_buf(),
            message,
        };
        for (subpath, spec) in self.auto_thumbnails() {
            if spec.width == 0 || spec.height == 0 {
                return Err(invalid(format!(
                    "autoThumbnail \"{subpath}\": width and height must be greater than zero"
                )));
            }
            let escapes = Path::new(subpath)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(invalid(format!(
                    "autoThumbnail \"{subpath}\": path must be relative to {STATIC_DIR_NAME}/"
                )));
            }
        }
        Ok(())
    }
}

/// Read `dir/siteware.json`.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but cannot be read, decoded or validated.
pub fn load_directory_config(dir: &Path) -> Result<Option<DirectoryConfig>, ConfigError> {
    let path = dir.join(DIR_CONFIG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    let config: DirectoryConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;
    config.validate(&path)?;
    Ok(Some(config))
}

// =============================================================================
// Per-build cache
// =============================================================================

/// Outcome of [`ConfigCache::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: Arc<DirectoryConfig>,
    /// `true` only the first time this directory is resolved in the build.
    pub fresh: bool,
}

/// Directory configs keyed by directory path, populated on first use.
///
/// The first resolution of a directory is authoritative for the rest of the
/// build: the file is never read again, even if it changes on disk.
/// Directories without a config file all share one empty default.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: HashMap<PathBuf, Arc<DirectoryConfig>>,
    default: Arc<DirectoryConfig>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, dir: &Path) -> Result<Resolution, ConfigError> {
        if let Some(config) = self.entries.get(dir) {
            return Ok(Resolution {
                config: Arc::clone(config),
                fresh: false,
            });
        }
        let config = match load_directory_config(dir)? {
            Some(config) => Arc::new(config),
            None => Arc::clone(&self.default),
        };
        self.entries.insert(dir.to_path_buf(), Arc::clone(&config));
        Ok(Resolution {
            config,
            fresh: true,
        })
    }

    /// Number of directories resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Build config
    // =========================================================================

    #[test]
    fn load_build_config_reads_output() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MASTER_CONFIG_FILE), r#"{"output": "site"}"#).unwrap();

        let config = load_build_config(tmp.path()).unwrap();
        assert_eq!(config.output, "site");
        assert_eq!(config.port, None);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.output_path(tmp.path()), tmp.path().join("site"));
    }

    #[test]
    fn load_build_config_accepts_capitalized_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(MASTER_CONFIG_FILE),
            r#"{"Output": "/srv/www", "Port": 9000}"#,
        )
        .unwrap();

        let config = load_build_config(tmp.path()).unwrap();
        assert_eq!(config.output, "/srv/www");
        assert_eq!(config.port(), 9000);
        assert_eq!(config.output_path(tmp.path()), PathBuf::from("/srv/www"));
    }

    #[test]
    fn load_build_config_empty_output_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MASTER_CONFIG_FILE), r#"{"output": "  "}"#).unwrap();

        let err = load_build_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOutput(_)));
    }

    #[test]
    fn load_build_config_missing_output_key_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MASTER_CONFIG_FILE), "{}").unwrap();

        assert!(matches!(
            load_build_config(tmp.path()),
            Err(ConfigError::MissingOutput(_))
        ));
    }

    #[test]
    fn load_build_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_build_config(tmp.path()),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn load_build_config_malformed_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MASTER_CONFIG_FILE), "{ output: ").unwrap();
        assert!(matches!(
            load_build_config(tmp.path()),
            Err(ConfigError::Json { .. })
        ));
    }

    // =========================================================================
    // Thumbnail spec parsing
    // =========================================================================

    #[test]
    fn thumbnail_method_parsing() {
        assert_eq!(ThumbnailMethod::from("resize".to_string()), ThumbnailMethod::Resize);
        assert_eq!(ThumbnailMethod::from("FIT".to_string()), ThumbnailMethod::Fit);
        assert_eq!(ThumbnailMethod::from("Fill".to_string()), ThumbnailMethod::Fill);
        assert_eq!(
            ThumbnailMethod::from("thumbnail".to_string()),
            ThumbnailMethod::Thumbnail
        );
        assert_eq!(
            ThumbnailMethod::from("stretch".to_string()),
            ThumbnailMethod::Thumbnail
        );
    }

    #[test]
    fn thumbnail_spec_defaults() {
        let spec: ThumbnailSpec = serde_json::from_str(r#"{"width": 10, "height": 20}"#).unwrap();
        assert_eq!(spec.method, ThumbnailMethod::Thumbnail);
        assert_eq!(spec.filter, ResizeFilter::Triangle);
        assert_eq!((spec.width, spec.height), (10, 20));
    }

    #[test]
    fn thumbnail_spec_filter() {
        let spec: ThumbnailSpec =
            serde_json::from_str(r#"{"method": "fit", "width": 1, "height": 1, "filter": "lanczos3"}"#)
                .unwrap();
        assert_eq!(spec.filter, ResizeFilter::Lanczos3);
    }

    // =========================================================================
    // Directory config
    // =========================================================================

    fn write_dir_config(dir: &Path, json: &str) {
        fs::write(dir.join(DIR_CONFIG_FILE), json).unwrap();
    }

    #[test]
    fn load_directory_config_absent_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_directory_config(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn load_directory_config_parses_entries() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(
            tmp.path(),
            r#"{
                "index.html": {"template": "home.template", "data": {"title": "Home"}},
                "about.html": {"data": "plain"},
                "static": {"autoThumbnail": {"img": {"method": "fill", "width": 100, "height": 80}}}
            }"#,
        );

        let config = load_directory_config(tmp.path()).unwrap().unwrap();
        let index = config.page_settings("index.html");
        assert_eq!(index.template, "home.template");
        assert_eq!(
            index.data.get("title"),
            Some(&Data::String("Home".to_string()))
        );

        let about = config.page_settings("about.html");
        assert_eq!(about.template, DEFAULT_TEMPLATE_NAME);
        assert_eq!(about.data, &Data::String("plain".to_string()));

        let thumbs: Vec<_> = config.auto_thumbnails().collect();
        assert_eq!(thumbs.len(), 1);
        assert_eq!(thumbs[0].0, "img");
        assert_eq!(thumbs[0].1.method, ThumbnailMethod::Fill);
    }

    #[test]
    fn page_settings_for_unlisted_file_uses_defaults() {
        let config = DirectoryConfig::default();
        let settings = config.page_settings("anything.html");
        assert_eq!(settings.template, DEFAULT_TEMPLATE_NAME);
        assert!(settings.data.is_null());
    }

    #[test]
    fn page_settings_blank_template_uses_default() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(tmp.path(), r#"{"a.html": {"template": "   ", "data": 1}}"#);
        let config = load_directory_config(tmp.path()).unwrap().unwrap();
        let settings = config.page_settings("a.html");
        assert_eq!(settings.template, DEFAULT_TEMPLATE_NAME);
        assert!(!settings.data.is_null());
    }

    #[test]
    fn go_style_capitalized_keys_accepted() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(
            tmp.path(),
            r#"{"a.html": {"Template": "x.template", "Data": [1, 2]}}"#,
        );
        let config = load_directory_config(tmp.path()).unwrap().unwrap();
        assert_eq!(config.page_settings("a.html").template, "x.template");
    }

    #[test]
    fn malformed_directory_config_is_error() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(tmp.path(), r#"{"a.html": {"template": }"#);
        assert!(matches!(
            load_directory_config(tmp.path()),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn unknown_entry_key_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(tmp.path(), r#"{"a.html": {"templte": "x"}}"#);
        assert!(matches!(
            load_directory_config(tmp.path()),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn zero_thumbnail_size_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(
            tmp.path(),
            r#"{"static": {"autoThumbnail": {"img": {"width": 0, "height": 10}}}}"#,
        );
        assert!(matches!(
            load_directory_config(tmp.path()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn escaping_thumbnail_subpath_rejected() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(
            tmp.path(),
            r#"{"static": {"autoThumbnail": {"../secrets": {"width": 5, "height": 5}}}}"#,
        );
        assert!(matches!(
            load_directory_config(tmp.path()),
            Err(ConfigError::Validation { .. })
        ));
    }

    // =========================================================================
    // ConfigCache
    // =========================================================================

    #[test]
    fn cache_first_resolution_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let mut cache = ConfigCache::new();

        assert!(cache.resolve(tmp.path()).unwrap().fresh);
        assert!(!cache.resolve(tmp.path()).unwrap().fresh);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_reread_changed_file() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(tmp.path(), r#"{"a.html": {"template": "first.template"}}"#);
        let mut cache = ConfigCache::new();

        let first = cache.resolve(tmp.path()).unwrap();
        assert_eq!(first.config.page_settings("a.html").template, "first.template");

        // Now unparseable; a re-read would fail
        write_dir_config(tmp.path(), "not json at all");
        let second = cache.resolve(tmp.path()).unwrap();
        assert!(!second.fresh);
        assert_eq!(
            second.config.page_settings("a.html").template,
            "first.template"
        );
    }

    #[test]
    fn cache_shares_default_between_unconfigured_dirs() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let mut cache = ConfigCache::new();

        let ra = cache.resolve(a.path()).unwrap();
        let rb = cache.resolve(b.path()).unwrap();
        assert!(ra.config.is_empty());
        assert!(Arc::ptr_eq(&ra.config, &rb.config));
    }

    #[test]
    fn cache_does_not_inherit_from_parent() {
        let tmp = TempDir::new().unwrap();
        let child = tmp.path().join("child");
        fs::create_dir(&child).unwrap();
        write_dir_config(tmp.path(), r#"{"a.html": {"template": "parent.template"}}"#);

        let mut cache = ConfigCache::new();
        cache.resolve(tmp.path()).unwrap();
        let resolved = cache.resolve(&child).unwrap();
        assert_eq!(
            resolved.config.page_settings("a.html").template,
            DEFAULT_TEMPLATE_NAME
        );
    }

    #[test]
    fn cache_propagates_decode_errors() {
        let tmp = TempDir::new().unwrap();
        write_dir_config(tmp.path(), "[");
        let mut cache = ConfigCache::new();
        assert!(cache.resolve(tmp.path()).is_err());
        assert!(cache.is_empty());
    }
}

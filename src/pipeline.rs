//! The build pipeline: context, progress events, and the [`build`] entry point.
//!
//! A build runs three steps strictly in sequence:
//!
//! ```text
//! 1. Config     siteware.master.json  →  BuildConfig       (validated, no mutation yet)
//! 2. Reconcile  <output>/             →  cleared + static/ mirrored
//! 3. Generate   src/                  →  <output>/         (pages + thumbnails)
//! ```
//!
//! All state a build needs lives in [`BuildContext`]: resolved paths, the
//! build config, the per-build directory config cache and an optional event
//! channel. Nothing is process-global, so independent builds can run side by
//! side (each test builds its own project).
//!
//! ## Events
//!
//! Progress is reported as typed [`BuildEvent`]s sent over an optional
//! `mpsc` channel. The CLI formats them with
//! [`output::format_build_event`](crate::output::format_build_event) and
//! prints from a separate thread; library callers may pass `None`.

use crate::config::{
    self, BuildConfig, ConfigCache, ConfigError, SOURCE_DIR_NAME, STATIC_DIR_NAME,
    TEMPLATE_DIR_NAME,
};
use crate::generate::{self, GenerateStats};
use crate::imaging::{Dimensions, ImageBackend, RustBackend, ThumbnailError};
use crate::reconcile::{self, ReconcileError, ReconcileStats};
use crate::render::RenderError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),
    #[error("output error: {0}")]
    Reconcile(#[from] ReconcileError),
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Absolute locations of everything a build reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub source: PathBuf,
    pub static_dir: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
}

impl BuildPaths {
    pub fn new(root: &Path, config: &BuildConfig) -> Result<Self, BuildError> {
        let root = std::path::absolute(root).map_err(|source| BuildError::Io {
            action: "resolve",
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            source: root.join(SOURCE_DIR_NAME),
            static_dir: root.join(STATIC_DIR_NAME),
            templates: root.join(TEMPLATE_DIR_NAME),
            output: config.output_path(&root),
            root,
        })
    }

    /// Where `static/` is mirrored to.
    pub fn output_static(&self) -> PathBuf {
        self.output.join(STATIC_DIR_NAME)
    }
}

/// Progress reported while a build runs.
///
/// Paths are relative to the project root (sources) or the output directory
/// (everything written).
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// Prior artifacts were removed from the output directory.
    OutputCleared { output: PathBuf, removed: Vec<PathBuf> },
    /// `static/` was mirrored into the output.
    StaticSynced {
        copied: usize,
        removed: usize,
        unchanged: usize,
    },
    /// A directory config declared automatic thumbnails for `subpath`.
    ThumbnailsStarted {
        directory: PathBuf,
        subpath: String,
    },
    ThumbnailWritten {
        output: PathBuf,
        dimensions: Dimensions,
    },
    PageRendered {
        source: PathBuf,
        output: PathBuf,
        template: String,
    },
    /// A source file that is not HTML; nothing was written for it.
    FileSkipped { source: PathBuf },
}

/// Everything one build needs. Created per build, never shared.
pub struct BuildContext {
    pub paths: BuildPaths,
    pub config: BuildConfig,
    pub configs: ConfigCache,
    pub events: Option<Sender<BuildEvent>>,
}

impl BuildContext {
    /// Load and validate the build config for `root`.
    ///
    /// Touches nothing on disk beyond reading the config file.
    pub fn load(root: &Path, events: Option<Sender<BuildEvent>>) -> Result<Self, BuildError> {
        let config = config::load_build_config(root)?;
        let paths = BuildPaths::new(root, &config)?;
        Ok(Self {
            paths,
            config,
            configs: ConfigCache::new(),
            events,
        })
    }

    /// Send `event` if anyone is listening. A closed receiver is ignored.
    pub fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    /// `path` relative to the project root, for display.
    pub fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.paths.root)
            .unwrap_or(path)
            .to_path_buf()
    }

    /// `path` relative to the output directory, for display.
    pub fn relative_to_output(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.paths.output)
            .unwrap_or(path)
            .to_path_buf()
    }
}

/// Totals for a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub reconcile: ReconcileStats,
    pub generate: GenerateStats,
}

/// Run a full build of the project at `root` with the `image`-crate backend.
pub fn build(root: &Path, events: Option<Sender<BuildEvent>>) -> Result<BuildSummary, BuildError> {
    build_with_backend(root, events, &RustBackend::new())
}

/// Run a full build with a caller-supplied image backend.
pub fn build_with_backend(
    root: &Path,
    events: Option<Sender<BuildEvent>>,
    backend: &impl ImageBackend,
) -> Result<BuildSummary, BuildError> {
    let mut ctx = BuildContext::load(root, events)?;
    let reconcile = reconcile::reconcile(&ctx)?;
    let generate = generate::generate_html(&mut ctx, backend)?;
    Ok(BuildSummary {
        reconcile,
        generate,
    })
}

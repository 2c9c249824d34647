//! HTML generation: the source tree walk.
//!
//! Walks `src/` depth-first in file-name order and mirrors it into the
//! output directory:
//!
//! ```text
//! src/                          public/
//! ├── siteware.json             │
//! ├── index.html           →    ├── index.html       (rendered)
//! ├── notes.txt                 │                    (skipped)
//! └── blog/                →    └── blog/            (created, source mode)
//!     └── first.htm        →        └── first.htm    (rendered)
//! ```
//!
//! ## Per-entry steps
//!
//! 1. For every entry, `src/` itself included, the [`DirectoryConfig`] of its
//!    containing directory is resolved through the build's cache. For `src/`
//!    that is the project root's `siteware.json`. The first
//!    time a directory is seen, any `autoThumbnail` specs on its `static`
//!    entry are run, in subpath order, before the entry is handled.
//! 2. Directories are created in the output, copying the source's
//!    permissions when newly created.
//! 3. `.html` / `.htm` files (any case) are rendered through the template
//!    named by their [`FileConfig`](crate::config::FileConfig), or
//!    [`DEFAULT_TEMPLATE_NAME`](crate::config::DEFAULT_TEMPLATE_NAME).
//! 4. Every other file is skipped and reported.
//!
//! The first error of any kind stops the walk.

use crate::config::DirectoryConfig;
use crate::imaging::{self, ImageBackend};
use crate::pipeline::{BuildContext, BuildError, BuildEvent};
use crate::render::TemplateRenderer;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Source extensions that are rendered (matched case-insensitively).
pub const PAGE_EXTENSIONS: &[&str] = &["html", "htm"];

/// What [`generate_html`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    /// Output directories created.
    pub directories: usize,
    pub pages: usize,
    /// Non-HTML source files.
    pub skipped: usize,
    pub thumbnails: usize,
}

/// Whether `path` is a page source by extension.
pub fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Walk `src/` and write the site into the output directory.
pub fn generate_html(
    ctx: &mut BuildContext,
    backend: &impl ImageBackend,
) -> Result<GenerateStats, BuildError> {
    let renderer = TemplateRenderer::new(&ctx.paths.templates, &ctx.paths.root);
    let source_root = ctx.paths.source.clone();
    let mut stats = GenerateStats::default();

    for entry in WalkDir::new(&source_root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&source_root) else {
            continue;
        };
        let dest = ctx.paths.output.join(relative);

        // The root's containing directory is the project root
        let Some(dir) = path.parent() else {
            continue;
        };
        let resolution = ctx.configs.resolve(dir)?;
        if resolution.fresh {
            stats.thumbnails += run_auto_thumbnails(ctx, backend, dir, &resolution.config)?;
        }

        if entry.depth() == 0 {
            continue;
        }
        if entry.file_type().is_dir() {
            if create_dir_like(path, &dest)? {
                stats.directories += 1;
            }
        } else if is_page(path) {
            let name = entry.file_name().to_string_lossy();
            let settings = resolution.config.page_settings(&name);
            renderer.render_file(settings.template, path, settings.data, &dest)?;
            stats.pages += 1;
            ctx.emit(BuildEvent::PageRendered {
                source: ctx.relative_to_root(path),
                output: ctx.relative_to_output(&dest),
                template: TemplateRenderer::template_name(settings.template).to_string(),
            });
        } else {
            stats.skipped += 1;
            ctx.emit(BuildEvent::FileSkipped {
                source: ctx.relative_to_root(path),
            });
        }
    }

    Ok(stats)
}

/// Run every `autoThumbnail` spec of `config`, returning the number written.
fn run_auto_thumbnails(
    ctx: &BuildContext,
    backend: &impl ImageBackend,
    dir: &Path,
    config: &DirectoryConfig,
) -> Result<usize, BuildError> {
    let static_dest = ctx.paths.output_static();
    let mut written = 0;

    for (subpath, spec) in config.auto_thumbnails() {
        ctx.emit(BuildEvent::ThumbnailsStarted {
            directory: ctx.relative_to_root(dir),
            subpath: subpath.to_string(),
        });
        let generated = imaging::generate_thumbnails(
            backend,
            &ctx.paths.static_dir,
            &static_dest,
            subpath,
            spec,
        )?;
        for thumb in &generated {
            ctx.emit(BuildEvent::ThumbnailWritten {
                output: ctx.relative_to_output(&thumb.output),
                dimensions: thumb.dimensions,
            });
        }
        written += generated.len();
    }

    Ok(written)
}

/// Create `dest` with the permissions of `source` if it does not exist yet.
///
/// Returns whether a directory was created.
fn create_dir_like(source: &Path, dest: &Path) -> Result<bool, BuildError> {
    if dest.is_dir() {
        return Ok(false);
    }
    let io_err = |action: &'static str| {
        move |e| BuildError::Io {
            action,
            path: dest.to_path_buf(),
            source: e,
        }
    };
    let permissions = fs::metadata(source)
        .map_err(|e| BuildError::Io {
            action: "stat",
            path: source.to_path_buf(),
            source: e,
        })?
        .permissions();
    fs::create_dir_all(dest).map_err(io_err("create directory"))?;
    fs::set_permissions(dest, permissions).map_err(io_err("set permissions on"))?;
    Ok(true)
}

//! Template rendering.
//!
//! Each HTML source file is rendered through a layout template from
//! `templates/`. Both are loaded into a fresh [Tera](https://keats.github.io/tera/)
//! instance per page:
//!
//! - the layout is registered under its own file name (e.g. `default.template`);
//! - the source file is registered as [`CONTENT_TEMPLATE`], so the layout pulls
//!   it in with `{% include "content" %}`.
//!
//! Both see the same context:
//!
//! | Name | Value |
//! |------|-------|
//! | `data` | the entry's payload from `siteware.json` (`null` when absent) |
//! | `readdir(path=...)` | directory listing, see [`read_dir_listing`] |
//!
//! A minimal layout:
//!
//! ```text
//! <html><head><title>{{ data.title | default(value="") }}</title></head>
//! <body>{% include "content" %}</body></html>
//! ```
//!
//! Interpolated values are HTML-escaped in every template; use `| safe` to
//! emit trusted markup verbatim.

use crate::config::DEFAULT_TEMPLATE_NAME;
use crate::types::{Data, DirEntryInfo};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tera::{Context, Tera};
use thiserror::Error;

/// Name under which the page's own source is registered.
pub const CONTENT_TEMPLATE: &str = "content";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateNotFound(PathBuf),
    #[error("template name \"{0}\" is reserved for the page being rendered")]
    ReservedName(String),
    #[error("failed to parse template {template} (page {source_path}): {message}")]
    Parse {
        template: String,
        source_path: PathBuf,
        message: String,
    },
    #[error("failed to render {source_path} with {template}: {message}")]
    Render {
        template: String,
        source_path: PathBuf,
        message: String,
    },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Flatten a tera error and its causes into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = std::error::Error::source(inner);
    }
    message
}

/// Renders source files through layout templates.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    templates_dir: PathBuf,
    root: PathBuf,
}

impl TemplateRenderer {
    /// `root` is the base against which `readdir` resolves relative paths.
    pub fn new(templates_dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            root: root.into(),
        }
    }

    /// Template file name to use, substituting the default for a blank name.
    pub fn template_name(template: &str) -> &str {
        match template.trim() {
            "" => DEFAULT_TEMPLATE_NAME,
            name => name,
        }
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        self.templates_dir.join(Self::template_name(template))
    }

    fn load(&self, template: &str, source: &Path) -> Result<Tera, RenderError> {
        let name = Self::template_name(template);
        if name == CONTENT_TEMPLATE {
            return Err(RenderError::ReservedName(name.to_string()));
        }
        let template_path = self.template_path(template);
        let layout = match fs::read_to_string(&template_path) {
            Ok(layout) => layout,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RenderError::TemplateNotFound(template_path));
            }
            Err(source) => {
                return Err(RenderError::Io {
                    path: template_path,
                    source,
                });
            }
        };
        let content = fs::read_to_string(source).map_err(|e| RenderError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        let mut tera = Tera::default();
        tera.autoescape_on(vec![""]);
        tera.register_function(
            "readdir",
            ReadDir {
                base: self.root.clone(),
            },
        );
        tera.add_raw_templates(vec![(CONTENT_TEMPLATE, content.as_str()), (name, layout.as_str())])
            .map_err(|e| RenderError::Parse {
                template: name.to_string(),
                source_path: source.to_path_buf(),
                message: describe(&e),
            })?;
        Ok(tera)
    }

    /// Render `source` through `template` with `data`, writing to `writer`.
    pub fn render_to<W: Write>(
        &self,
        template: &str,
        source: &Path,
        data: &Data,
        writer: W,
    ) -> Result<(), RenderError> {
        let tera = self.load(template, source)?;
        execute(&tera, template, source, data, writer)
    }

    /// Render into a new file at `dest`.
    ///
    /// Both templates are parsed before `dest` is created, so a parse error
    /// leaves no partial file behind.
    pub fn render_file(
        &self,
        template: &str,
        source: &Path,
        data: &Data,
        dest: &Path,
    ) -> Result<(), RenderError> {
        let io_err = |source: io::Error| RenderError::Io {
            path: dest.to_path_buf(),
            source,
        };

        let tera = self.load(template, source)?;
        let mut writer = BufWriter::new(File::create(dest).map_err(io_err)?);
        execute(&tera, template, source, data, &mut writer)?;
        writer.flush().map_err(io_err)
    }
}

fn execute<W: Write>(
    tera: &Tera,
    template: &str,
    source: &Path,
    data: &Data,
    writer: W,
) -> Result<(), RenderError> {
    let name = TemplateRenderer::template_name(template);
    let mut context = Context::new();
    context.insert("data", data);
    tera.render_to(name, &context, writer)
        .map_err(|e| RenderError::Render {
            template: name.to_string(),
            source_path: source.to_path_buf(),
            message: describe(&e),
        })
}

// =============================================================================
// readdir host function
// =============================================================================

/// `readdir(path=...)` for templates. Never fails: errors yield `[]`.
struct ReadDir {
    base: PathBuf,
}

impl tera::Function for ReadDir {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let listing = match args.get("path").and_then(|v| v.as_str()) {
            Some(path) => read_dir_listing(&self.base.join(path)),
            None => Vec::new(),
        };
        Ok(tera::to_value(listing).unwrap_or_else(|_| tera::Value::Array(Vec::new())))
    }
}

/// List the entries of `path`, sorted by name.
///
/// The path is made absolute first. Any failure (missing directory,
/// permission error, unreadable entry) yields an empty listing; a page that
/// references an inaccessible directory still renders.
pub fn read_dir_listing(path: &Path) -> Vec<DirEntryInfo> {
    try_read_dir(path).unwrap_or_default()
}

fn try_read_dir(path: &Path) -> io::Result<Vec<DirEntryInfo>> {
    let path = std::path::absolute(path)?;
    let mut listing = Vec::new();
    for entry in fs::read_dir(&path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        listing.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            mode: file_mode(&meta),
            mod_time: meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0),
            is_dir: meta.is_dir(),
        });
    }
    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

//! Output directory reconciliation.
//!
//! Before pages are rendered, the output directory is brought back to a
//! clean slate: every top-level entry is deleted except the ones a deployed
//! site depends on between builds ([`PROTECTED_ENTRIES`]). `static/` is then
//! mirrored from the project, which updates the protected `static/` in place
//! instead of recreating it.
//!
//! The output directory itself must already exist; it is never created.

use crate::pipeline::{BuildContext, BuildEvent};
use crate::sync::{self, SyncError, SyncStats};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level output entries that survive [`clear_output`].
pub const PROTECTED_ENTRIES: &[&str] = &[".git", "static", ".gitignore", "CNAME"];

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("output directory does not exist: {0}")]
    OutputMissing(PathBuf),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// What [`reconcile`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub removed: Vec<PathBuf>,
    pub synced: SyncStats,
}

/// Whether a top-level output entry is kept across builds.
pub fn is_protected(name: &str) -> bool {
    PROTECTED_ENTRIES.contains(&name)
}

/// Remove every top-level entry of `output` not in [`PROTECTED_ENTRIES`].
///
/// Returns the removed paths in name order.
pub fn clear_output(output: &Path) -> Result<Vec<PathBuf>, ReconcileError> {
    if !output.is_dir() {
        return Err(ReconcileError::OutputMissing(output.to_path_buf()));
    }
    let list_err = |source| ReconcileError::Io {
        action: "list",
        path: output.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(output)
        .map_err(list_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(list_err)?;
    entries.sort_by_key(|e| e.file_name());

    let mut removed = Vec::new();
    for entry in entries {
        if entry.file_name().to_str().is_some_and(is_protected) {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| ReconcileError::Io {
            action: "stat",
            path: path.clone(),
            source,
        })?;
        let result = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|source| ReconcileError::Io {
            action: "remove",
            path: path.clone(),
            source,
        })?;
        removed.push(path);
    }

    Ok(removed)
}

/// Clear the output directory, then mirror `static/` into it.
pub fn reconcile(ctx: &BuildContext) -> Result<ReconcileStats, ReconcileError> {
    let removed = clear_output(&ctx.paths.output)?;
    ctx.emit(BuildEvent::OutputCleared {
        output: ctx.relative_to_root(&ctx.paths.output),
        removed: removed.iter().map(|p| ctx.relative_to_output(p)).collect(),
    });

    let synced = sync::mirror(&ctx.paths.static_dir, &ctx.paths.output_static())?;
    ctx.emit(BuildEvent::StaticSynced {
        copied: synced.copied,
        removed: synced.removed,
        unchanged: synced.unchanged,
    });

    Ok(ReconcileStats { removed, synced })
}

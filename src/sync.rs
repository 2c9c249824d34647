//! One-way directory mirroring.
//!
//! [`mirror`] makes `dest` an exact copy of `src`:
//!
//! - files missing from `dest`, or whose contents differ, are copied;
//! - files whose length and bytes already match are left alone, so repeated
//!   runs rewrite nothing;
//! - entries in `dest` that are absent from `src`, or whose type differs
//!   (file in one, directory in the other), are removed.
//!
//! Symlinks in `src` are followed when copying.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("sync source does not exist: {0}")]
    SourceMissing(PathBuf),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_err<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> SyncError + 'a {
    move |source| SyncError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// What [`mirror`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub copied: usize,
    pub removed: usize,
    pub unchanged: usize,
}

/// Make `dest` identical to `src`, creating `dest` if needed.
pub fn mirror(src: &Path, dest: &Path) -> Result<SyncStats, SyncError> {
    if !src.is_dir() {
        return Err(SyncError::SourceMissing(src.to_path_buf()));
    }
    let mut stats = SyncStats::default();

    if dest.exists() && !dest.is_dir() {
        fs::remove_file(dest).map_err(io_err("remove", dest))?;
        stats.removed += 1;
    }
    fs::create_dir_all(dest).map_err(io_err("create directory", dest))?;

    stats.removed += remove_stale(src, dest)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err("create directory", &target))?;
        } else if same_contents(entry.path(), &target)? {
            stats.unchanged += 1;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err("copy", &target))?;
            stats.copied += 1;
        }
    }

    Ok(stats)
}

/// Delete everything under `dest` with no same-typed counterpart in `src`.
///
/// A removed directory is not descended into.
fn remove_stale(src: &Path, dest: &Path) -> Result<usize, SyncError> {
    let mut removed = 0;
    let mut walker = WalkDir::new(dest).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(dest) else {
            continue;
        };
        let counterpart = src.join(relative);
        let dest_is_dir = entry.file_type().is_dir();

        let keep = match fs::metadata(&counterpart) {
            Ok(meta) => meta.is_dir() == dest_is_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(source) => {
                return Err(SyncError::Io {
                    action: "stat",
                    path: counterpart,
                    source,
                });
            }
        };
        if keep {
            continue;
        }

        if dest_is_dir {
            fs::remove_dir_all(entry.path()).map_err(io_err("remove", entry.path()))?;
            walker.skip_current_dir();
        } else {
            fs::remove_file(entry.path()).map_err(io_err("remove", entry.path()))?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Whether `target` exists as a file with exactly the bytes of `source`.
fn same_contents(source: &Path, target: &Path) -> Result<bool, SyncError> {
    let target_meta = match fs::metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(SyncError::Io {
                action: "stat",
                path: target.to_path_buf(),
                source,
            });
        }
    };
    let source_meta = fs::metadata(source).map_err(io_err("stat", source))?;
    if !target_meta.is_file() || target_meta.len() != source_meta.len() {
        return Ok(false);
    }
    let a = fs::read(source).map_err(io_err("read", source))?;
    let b = fs::read(target).map_err(io_err("read", target))?;
    Ok(a == b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{read_file, write_file};
    use tempfile::TempDir;

    #[test]
    fn copies_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("css/site.css"), "body {}");
        write_file(&src.join("robots.txt"), "User-agent: *");
        std::fs::create_dir_all(src.join("empty")).unwrap();
        let dest = tmp.path().join("out/static");

        let stats = mirror(&src, &dest).unwrap();

        assert_eq!(stats.copied, 2);
        assert_eq!(read_file(&dest.join("css/site.css")), "body {}");
        assert_eq!(read_file(&dest.join("robots.txt")), "User-agent: *");
        assert!(dest.join("empty").is_dir());
    }

    #[test]
    fn second_run_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("a.txt"), "a");
        write_file(&src.join("sub/b.txt"), "b");
        let dest = tmp.path().join("dest");

        mirror(&src, &dest).unwrap();
        let stats = mirror(&src, &dest).unwrap();

        assert_eq!(
            stats,
            SyncStats {
                copied: 0,
                removed: 0,
                unchanged: 2
            }
        );
    }

    #[test]
    fn changed_file_is_recopied() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("a.txt"), "one");
        let dest = tmp.path().join("dest");
        mirror(&src, &dest).unwrap();

        // Same length, different bytes
        write_file(&src.join("a.txt"), "two");
        let stats = mirror(&src, &dest).unwrap();

        assert_eq!(stats.copied, 1);
        assert_eq!(read_file(&dest.join("a.txt")), "two");
    }

    #[test]
    fn stale_entries_are_removed() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("keep.txt"), "k");
        let dest = tmp.path().join("dest");
        write_file(&dest.join("old.txt"), "o");
        write_file(&dest.join("olddir/deep/x.txt"), "x");

        let stats = mirror(&src, &dest).unwrap();

        assert_eq!(stats.removed, 2);
        assert!(!dest.join("old.txt").exists());
        assert!(!dest.join("olddir").exists());
        assert!(dest.join("keep.txt").exists());
    }

    #[test]
    fn type_mismatch_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("thing/inner.txt"), "i");
        write_file(&src.join("other"), "file now");
        let dest = tmp.path().join("dest");
        write_file(&dest.join("thing"), "was a file");
        write_file(&dest.join("other/was-dir.txt"), "d");

        mirror(&src, &dest).unwrap();

        assert_eq!(read_file(&dest.join("thing/inner.txt")), "i");
        assert_eq!(read_file(&dest.join("other")), "file now");
    }

    #[test]
    fn dest_file_in_place_of_root_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        write_file(&src.join("a.txt"), "a");
        let dest = tmp.path().join("dest");
        write_file(&dest, "not a directory");

        mirror(&src, &dest).unwrap();
        assert_eq!(read_file(&dest.join("a.txt")), "a");
    }

    #[test]
    fn io_errors_name_the_action_and_path() {
        let path = PathBuf::from("static/a.txt");
        let err = io_err("copy", &path)(io::Error::other("disk full"));
        assert!(matches!(err, SyncError::Io { action: "copy", .. }));
        assert_eq!(err.to_string(), "failed to copy static/a.txt: disk full");
    }

    #[test]
    fn missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = mirror(&tmp.path().join("nope"), &tmp.path().join("dest"));
        assert!(matches!(result, Err(SyncError::SourceMissing(_))));
        assert!(!tmp.path().join("dest").exists());
    }
}

//! Project scaffolding for `siteware init`.

use crate::config::{SOURCE_DIR_NAME, STATIC_DIR_NAME, TEMPLATE_DIR_NAME};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directories every project needs, in creation order.
pub const PROJECT_DIRS: &[&str] = &[STATIC_DIR_NAME, SOURCE_DIR_NAME, TEMPLATE_DIR_NAME];

#[derive(Error, Debug)]
pub enum InitError {
    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create the project directories under `root` with `root`'s permissions.
///
/// Directories that already exist are left untouched. Returns the ones
/// created.
pub fn init_project(root: &Path) -> Result<Vec<PathBuf>, InitError> {
    let meta = fs::metadata(root).map_err(|source| InitError::Io {
        action: "stat",
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(InitError::NotADirectory(root.to_path_buf()));
    }

    let mut created = Vec::new();
    for name in PROJECT_DIRS {
        let dir = root.join(name);
        if dir.is_dir() {
            continue;
        }
        let io_err = |action: &'static str| {
            let path = dir.clone();
            move |source| InitError::Io {
                action,
                path,
                source,
            }
        };
        fs::create_dir(&dir).map_err(io_err("create"))?;
        fs::set_permissions(&dir, meta.permissions()).map_err(io_err("set permissions on"))?;
        created.push(dir);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_all_project_dirs() {
        let tmp = TempDir::new().unwrap();
        let created = init_project(tmp.path()).unwrap();

        assert_eq!(
            created,
            vec![
                tmp.path().join("static"),
                tmp.path().join("src"),
                tmp.path().join("templates"),
            ]
        );
        for name in PROJECT_DIRS {
            assert!(tmp.path().join(name).is_dir());
        }
    }

    #[test]
    fn is_idempotent() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/index.html"), "keep").unwrap();

        let first = init_project(tmp.path()).unwrap();
        let second = init_project(tmp.path()).unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("src/index.html")).unwrap(),
            "keep"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copies_root_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("site");
        std::fs::create_dir(&root).unwrap();
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o751)).unwrap();

        init_project(&root).unwrap();

        let mode = std::fs::metadata(root.join("templates"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o751);
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = init_project(&tmp.path().join("nope"));
        assert!(matches!(result, Err(InitError::Io { action: "stat", .. })));
    }

    #[test]
    fn file_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            init_project(&file),
            Err(InitError::NotADirectory(_))
        ));
    }
}

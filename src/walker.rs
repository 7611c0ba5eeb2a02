use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to walk tree: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ScanError {
    fn from_walk(err: walkdir::Error) -> Self {
        let denied = err
            .io_error()
            .map(|io| io.kind() == std::io::ErrorKind::PermissionDenied)
            .unwrap_or(false);

        match (denied, err.path()) {
            (true, Some(path)) => ScanError::PermissionDenied(path.to_path_buf()),
            _ => ScanError::Walk(err),
        }
    }

    /// Path the error refers to, when known
    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanError::PathNotFound(p) | ScanError::NotADirectory(p) | ScanError::PermissionDenied(p) => {
                Some(p)
            }
            ScanError::Walk(e) => e.path(),
            ScanError::IoError(_) => None,
        }
    }
}

/// A regular file found under the walk root
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: OsString,
}

impl FileEntry {
    /// Directory containing the file
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Check that `target` is an existing directory and return its absolute form.
pub fn resolve_root(target: &Path) -> Result<PathBuf, ScanError> {
    if !target.exists() {
        return Err(ScanError::PathNotFound(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Err(ScanError::NotADirectory(target.to_path_buf()));
    }

    fs::canonicalize(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScanError::PermissionDenied(target.to_path_buf())
        } else {
            ScanError::IoError(e)
        }
    })
}

/// Files the walk must not yield
#[derive(Debug, Clone, Default)]
pub struct WalkFilter {
    /// Base name skipped at any depth (the sidecar history file)
    pub reserved_name: Option<OsString>,
    /// One absolute path skipped exactly (a history database inside the tree)
    pub excluded_path: Option<PathBuf>,
}

impl WalkFilter {
    fn skips(&self, entry: &walkdir::DirEntry) -> bool {
        let reserved = self
            .reserved_name
            .as_deref()
            .is_some_and(|r| r == entry.file_name());
        let excluded = self
            .excluded_path
            .as_deref()
            .is_some_and(|p| p == entry.path());
        reserved || excluded
    }
}

/// Walk `root` depth-first and yield every regular file.
///
/// Siblings are visited in byte order of their names. Directories are entered
/// but not yielded, symlinks are neither followed nor yielded, and files
/// matched by `filter` are skipped. Errors are yielded per entry.
pub fn walk_files(
    root: &Path,
    filter: WalkFilter,
) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
    debug!(path = ?root, "Walking tree");

    WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ScanError::from_walk(e))),
            };

            trace!(entry = ?entry.path(), "Examining entry");

            if !entry.file_type().is_file() {
                trace!(path = ?entry.path(), "Skipping non-file");
                return None;
            }

            if filter.skips(&entry) {
                debug!(path = ?entry.path(), "Skipping history file");
                return None;
            }

            Some(Ok(FileEntry {
                file_name: entry.file_name().to_os_string(),
                path: entry.into_path(),
            }))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(root: &Path, reserved: Option<&str>) -> Vec<String> {
        let filter = WalkFilter {
            reserved_name: reserved.map(OsString::from),
            ..Default::default()
        };
        names_with(root, filter)
    }

    fn names_with(root: &Path, filter: WalkFilter) -> Vec<String> {
        walk_files(root, filter)
            .map(|e| {
                let entry = e.unwrap();
                entry
                    .path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(names(dir.path(), None).is_empty());
    }

    #[test]
    fn test_walk_emits_files_only() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("sub/x.txt"), "x").unwrap();

        assert_eq!(names(dir.path(), None), vec!["a.txt", "sub/x.txt"]);
    }

    #[test]
    fn test_walk_is_depth_first_and_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/inner")).unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b/z.txt"), "").unwrap();
        fs::write(dir.path().join("b/inner/m.txt"), "").unwrap();
        fs::write(dir.path().join("B.txt"), "").unwrap();

        assert_eq!(
            names(dir.path(), None),
            vec!["B.txt", "a.txt", "b/inner/m.txt", "b/z.txt", "c.txt"]
        );
    }

    #[test]
    fn test_walk_order_is_stable() {
        let dir = tempdir().unwrap();
        for name in ["delta", "alpha", "charlie", "bravo"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let first = names(dir.path(), None);
        let second = names(dir.path(), None);
        assert_eq!(first, second);
        assert_eq!(first, vec!["alpha", "bravo", "charlie", "delta"]);
    }

    #[test]
    fn test_walk_skips_reserved_name_at_any_depth() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join(".NameTidy_History"), "{}").unwrap();
        fs::write(dir.path().join("sub/.NameTidy_History"), "{}").unwrap();
        fs::write(dir.path().join("keep.txt"), "").unwrap();

        assert_eq!(
            names(dir.path(), Some(".NameTidy_History")),
            vec!["keep.txt"]
        );
    }

    #[test]
    fn test_walk_skips_excluded_path_only() {
        let dir = tempdir().unwrap();
        let root = resolve_root(dir.path()).unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("h.db"), "").unwrap();
        fs::write(root.join("sub/h.db"), "").unwrap();

        let filter = WalkFilter {
            excluded_path: Some(root.join("h.db")),
            ..Default::default()
        };
        assert_eq!(names_with(&root, filter), vec!["sub/h.db"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_ignores_symlinks() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        assert_eq!(names(dir.path(), None), vec!["real.txt"]);
    }

    #[test]
    fn test_resolve_root_not_found() {
        let result = resolve_root(Path::new("/nonexistent/path"));
        assert!(matches!(result, Err(ScanError::PathNotFound(_))));
    }

    #[test]
    fn test_resolve_root_not_a_directory() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("file.txt");
        fs::write(&file_path, "content").unwrap();

        let result = resolve_root(&file_path);
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_resolve_root_is_absolute() {
        let dir = tempdir().unwrap();
        let root = resolve_root(dir.path()).unwrap();
        assert!(root.is_absolute());
    }
}

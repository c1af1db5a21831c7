//! Filesystem facade
//!
//! The engine touches the filesystem through three narrow operations: stat,
//! list-directory, and attribute-read. Keeping them behind a trait lets the
//! traversal run against any backend (local disk, a network mount wrapper,
//! an in-memory tree in tests) without the visitor knowing which.
//!
//! All operations are synchronous; parallelism comes from running them on
//! executor worker threads, not from the facade.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The entry classification the traversal branches on.
///
/// `is_other` covers entries that are neither regular files, directories,
/// nor symlinks: sockets, fifos, and device nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    pub is_directory: bool,
    pub is_regular_file: bool,
    pub is_symlink: bool,
    pub is_other: bool,
}

impl FileAttributes {
    fn from_file_type(file_type: fs::FileType) -> Self {
        let is_directory = file_type.is_dir();
        let is_regular_file = file_type.is_file();
        let is_symlink = file_type.is_symlink();
        Self {
            is_directory,
            is_regular_file,
            is_symlink,
            is_other: !(is_directory || is_regular_file || is_symlink),
        }
    }
}

/// Synchronous filesystem access used by the glob visitor.
pub trait Filesystem: Send + Sync {
    /// Stat `path`, following symlinks.
    ///
    /// Returns `Ok(None)` when the entry does not exist or its parent chain
    /// cannot be traversed; any other failure propagates.
    fn stat(&self, path: &Path) -> io::Result<Option<FileAttributes>>;

    /// List the immediate children of `dir`, in no particular order.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Read the attributes of `path` without following symlinks, so links
    /// are reported distinctly from their targets.
    fn read_attributes(&self, path: &Path) -> io::Result<FileAttributes>;
}

/// `std::fs`-backed facade for the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn stat(&self, path: &Path) -> io::Result<Option<FileAttributes>> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(FileAttributes::from_file_type(metadata.file_type()))),
            Err(err) if is_absence(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            children.push(entry?.path());
        }
        Ok(children)
    }

    fn read_attributes(&self, path: &Path) -> io::Result<FileAttributes> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(FileAttributes::from_file_type(metadata.file_type()))
    }
}

/// Whether a stat failure means "the entry is absent" rather than a real
/// I/O problem. NotADirectory is the untraversable-parent case
/// (`base/file/child`).
fn is_absence(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput | io::ErrorKind::NotADirectory
    )
}

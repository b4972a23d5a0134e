//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Abstraction over file system operations for testability
///
/// Every pipeline stage reads and mutates the build tree through this trait,
/// so the same code runs against a real standalone build and against
/// [`MockFileSystem`](super::MockFileSystem) in unit tests.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List directory contents (immediate children only, unordered)
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Every regular file below `root`, recursively, in file-name order
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Write a file, creating missing parent directories
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Copy a file byte-for-byte, creating missing parent directories
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Canonicalize a path
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

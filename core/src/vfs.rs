//! Content-addressed virtual file system.
//!
//! Unifies on-disk files and ZIP-archive members under [`FileId`]. Three
//! indexes (by id, by path, by basename) are kept in sync on every insert;
//! removal is not needed by this pipeline (handles are only ever marked
//! historical, never deleted), so the VFS is insert/lookup only.

use crate::file_id::FileId;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable record of a file known to the VFS.
///
/// `exists = false` marks a *historical* handle: carried over from a
/// previous run's persisted state, no longer present in the freshly
/// scanned input tree. Its id is still valid as a lookup key; opening it
/// fails.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHandle {
    pub path: String,
    pub size: u64,
    pub mtime: f64,
    pub parent_zip: Option<FileId>,
    pub exists: bool,
}

impl FileHandle {
    pub fn new(path: impl Into<String>, size: u64, mtime: f64) -> Self {
        Self {
            path: path.into(),
            size,
            mtime,
            parent_zip: None,
            exists: true,
        }
    }

    pub fn with_parent_zip(mut self, parent_zip: FileId) -> Self {
        self.parent_zip = Some(parent_zip);
        self
    }

    pub fn nonexistent(mut self) -> Self {
        self.exists = false;
        self
    }

    pub fn id(&self) -> FileId {
        FileId::create(self.mtime, self.size, &self.path)
    }

    pub fn basename(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    /// Mark this handle absent from the current scan, preserving its identity.
    pub fn as_nonexistent(&self) -> Self {
        Self {
            exists: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("file not found or historical: {0}")]
    NotFound(FileId),
    #[error("io error opening {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("zip error opening {path}: {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Source bytes of an opened file: either a plain file on disk, or a member
/// of a ZIP archive read fully into memory. ZIP central directories are
/// small relative to chat media, so a simple "re-open and re-seek" reader is
/// acceptable (see design notes on VFS "open" over heterogeneous sources).
pub enum OpenedFile {
    Plain(std::fs::File),
    ZipMember(Cursor<Vec<u8>>),
}

impl Read for OpenedFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            OpenedFile::Plain(f) => f.read(buf),
            OpenedFile::ZipMember(c) => c.read(buf),
        }
    }
}

#[derive(Default)]
pub struct Vfs {
    input_root: Option<PathBuf>,
    by_id: HashMap<FileId, Arc<FileHandle>>,
    by_path: HashMap<String, Arc<FileHandle>>,
    by_name: HashMap<String, Vec<Arc<FileHandle>>>,
}

impl Vfs {
    pub fn new(input_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: Some(input_root.into()),
            ..Default::default()
        }
    }

    /// Insert a handle into all three indexes. Idempotent under equal ids:
    /// re-adding a handle with the same id simply replaces the prior entry
    /// everywhere it's indexed.
    pub fn add(&mut self, handle: FileHandle) -> Arc<FileHandle> {
        let id = handle.id();
        let basename = handle.basename().to_string();
        let path = handle.path.clone();
        let handle = Arc::new(handle);

        self.by_id.insert(id, Arc::clone(&handle));
        self.by_path.insert(path, Arc::clone(&handle));
        let bucket = self.by_name.entry(basename).or_default();
        bucket.retain(|h| h.id() != handle.id());
        bucket.push(Arc::clone(&handle));

        handle
    }

    pub fn by_id(&self, id: &FileId) -> Option<Arc<FileHandle>> {
        self.by_id.get(id).cloned()
    }

    pub fn by_path(&self, path: &str) -> Option<Arc<FileHandle>> {
        self.by_path.get(path).cloned()
    }

    /// All handles sharing a basename, sorted by path for reproducible
    /// fallback resolution in the media locator (see design notes: the
    /// original's "arbitrary member" pick is replaced with a deterministic
    /// one).
    pub fn by_name(&self, basename: &str) -> Vec<Arc<FileHandle>> {
        let mut handles = self.by_name.get(basename).cloned().unwrap_or_default();
        handles.sort_by(|a, b| a.path.cmp(&b.path));
        handles
    }

    pub fn exists(&self, id: &FileId) -> bool {
        self.by_id.get(id).map(|h| h.exists).unwrap_or(false)
    }

    pub fn all_handles(&self) -> impl Iterator<Item = &Arc<FileHandle>> {
        self.by_id.values()
    }

    /// Open a handle for reading. Plain files are opened directly relative
    /// to the scan root; ZIP members are extracted from their parent
    /// archive (also resolved relative to the scan root).
    pub fn open(&self, handle: &FileHandle) -> Result<(OpenedFile, u64), VfsError> {
        if !handle.exists {
            return Err(VfsError::NotFound(handle.id()));
        }
        let root = self.input_root.as_deref().unwrap_or_else(|| Path::new("."));

        match &handle.parent_zip {
            None => {
                let full_path = root.join(&handle.path);
                let file = std::fs::File::open(&full_path).map_err(|source| VfsError::Io {
                    path: handle.path.clone(),
                    source,
                })?;
                Ok((OpenedFile::Plain(file), handle.size))
            }
            Some(zip_id) => {
                let zip_handle = self.by_id(zip_id).ok_or_else(|| VfsError::NotFound(zip_id.clone()))?;
                let zip_path = root.join(&zip_handle.path);
                let file = std::fs::File::open(&zip_path).map_err(|source| VfsError::Io {
                    path: zip_handle.path.clone(),
                    source,
                })?;
                let mut archive = zip::ZipArchive::new(file).map_err(|source| VfsError::Zip {
                    path: zip_handle.path.clone(),
                    source,
                })?;
                let mut member = archive.by_name(&handle.path).map_err(|source| VfsError::Zip {
                    path: handle.path.clone(),
                    source,
                })?;
                let mut buf = Vec::with_capacity(handle.size as usize);
                member.read_to_end(&mut buf).map_err(|source| VfsError::Io {
                    path: handle.path.clone(),
                    source,
                })?;
                let size = buf.len() as u64;
                Ok((OpenedFile::ZipMember(Cursor::new(buf)), size))
            }
        }
    }

    /// Read an entire handle's contents as a UTF-8 string.
    pub fn read_to_string(&self, handle: &FileHandle) -> Result<String, VfsError> {
        let (mut reader, _) = self.open(handle)?;
        let mut s = String::new();
        reader.read_to_string(&mut s).map_err(|source| VfsError::Io {
            path: handle.path.clone(),
            source,
        })?;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_indexes_by_id_path_and_name() {
        let mut vfs = Vfs::new(".");
        let handle = FileHandle::new("a/b/_chat.txt", 10, 100.0);
        let id = handle.id();
        vfs.add(handle);

        assert!(vfs.by_id(&id).is_some());
        assert!(vfs.by_path("a/b/_chat.txt").is_some());
        assert_eq!(vfs.by_name("_chat.txt").len(), 1);
    }

    #[test]
    fn exists_false_for_historical_handle() {
        let mut vfs = Vfs::new(".");
        let handle = FileHandle::new("a/_chat.txt", 10, 100.0).nonexistent();
        let id = handle.id();
        vfs.add(handle);
        assert!(!vfs.exists(&id));
    }

    #[test]
    fn by_name_is_sorted_by_path() {
        let mut vfs = Vfs::new(".");
        vfs.add(FileHandle::new("z/img.jpg", 1, 1.0));
        vfs.add(FileHandle::new("a/img.jpg", 1, 1.0));
        let found = vfs.by_name("img.jpg");
        assert_eq!(found[0].path, "a/img.jpg");
        assert_eq!(found[1].path, "z/img.jpg");
    }
}

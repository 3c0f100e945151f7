// CLASSIFICATION: COMMUNITY
// Filename: storage.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Boot volume readers for the legacy NVRAM file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Read-only access to files on the boot volume.
pub trait FileStorage {
    /// Read `path` whole. Files larger than `max_size` are an error.
    fn read_file(&self, path: &str, max_size: usize) -> io::Result<Vec<u8>>;
}

fn too_large(path: &str, max_size: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{path} exceeds {max_size} bytes"),
    )
}

/// Storage rooted at a host directory.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{path} escapes storage root"),
            ));
        }
        Ok(self.root.join(rel))
    }
}

impl FileStorage for DirStorage {
    fn read_file(&self, path: &str, max_size: usize) -> io::Result<Vec<u8>> {
        let file = File::open(self.locate(path)?)?;
        let len = file.metadata()?.len();
        if len > max_size as u64 {
            return Err(too_large(path, max_size));
        }
        let mut buf = Vec::with_capacity(len as usize);
        // Guard against the file growing after the metadata check.
        file.take(max_size as u64 + 1).read_to_end(&mut buf)?;
        if buf.len() > max_size {
            return Err(too_large(path, max_size));
        }
        Ok(buf)
    }
}

/// Storage backed by an in-memory file map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), data.into());
        self
    }
}

impl FileStorage for MemoryStorage {
    fn read_file(&self, path: &str, max_size: usize) -> io::Result<Vec<u8>> {
        let data = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))?;
        if data.len() > max_size {
            return Err(too_large(path, max_size));
        }
        Ok(data.clone())
    }
}

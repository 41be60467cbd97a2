//! Filesystem provider, serving a local directory tree with bucket-key
//! semantics. Used for local development and tests.

use crate::{ObjectStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};

pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<String>) -> io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if let Ok(rel) = path.strip_prefix(&self.root) {
                // Keys always use '/' regardless of platform separator.
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, &mut keys)?;
        // Directory iteration order is platform-dependent; sort so the
        // listing order is as stable as a real bucket's.
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        // Keys are store-internal paths, never filesystem escapes.
        if key.split('/').any(|segment| segment == "..") {
            return Ok(None);
        }

        match std::fs::read(self.root.join(key)) {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crayon_cache::errors::Result;
use crayon_cache::res::prelude::{Resource, ResourceBase, ResourceCache};

/// The whole content of a file.
pub struct BytesResource {
    base: ResourceBase,
    filename: PathBuf,
    data: RwLock<Option<Vec<u8>>>,
}

impl BytesResource {
    /// Creates a bytes resource that reads file `path` directly.
    pub fn new<T1, T2>(id: T1, path: T2) -> Self
    where
        T1: Into<String>,
        T2: AsRef<str>,
    {
        let path = path.as_ref();
        BytesResource {
            base: ResourceBase::new(id, path),
            filename: PathBuf::from(path),
            data: RwLock::new(None),
        }
    }

    /// Creates a bytes resource that reads file `path` relative to the base path of `cache`.
    pub fn from_cache<T1, T2>(cache: &ResourceCache, id: T1, path: T2) -> Self
    where
        T1: Into<String>,
        T2: AsRef<str>,
    {
        let path = path.as_ref();
        BytesResource {
            base: ResourceBase::new(id, path),
            filename: Path::new(&cache.base_path()).join(path),
            data: RwLock::new(None),
        }
    }

    /// Returns the resolved location of the file.
    #[inline]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Returns the length of the content, or None if it's not loaded.
    #[inline]
    pub fn len(&self) -> Option<usize> {
        self.data.read().unwrap().as_ref().map(|v| v.len())
    }

    /// Returns a copy of the content if it's loaded.
    #[inline]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.data.read().unwrap().clone()
    }

    /// Visits the content if it's loaded, without copying.
    #[inline]
    pub fn with_bytes<F: FnOnce(&[u8]) -> T, T>(&self, func: F) -> Option<T> {
        self.data.read().unwrap().as_ref().map(|v| func(v))
    }
}

impl Resource for BytesResource {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn load_payload(&self) -> Result<()> {
        let bytes = fs::read(&self.filename)
            .map_err(|err| format_err!("Could not read {:?}: {}.", self.filename, err))?;

        info!(
            "[BytesResource] loaded {} ({} bytes).",
            self.base.id(),
            bytes.len()
        );

        *self.data.write().unwrap() = Some(bytes);
        Ok(())
    }

    fn unload_payload(&self) {
        *self.data.write().unwrap() = None;
    }
}

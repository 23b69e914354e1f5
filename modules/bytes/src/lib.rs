//! Raw bytes resources. A `BytesResource` holds the whole content of a file, which is read
//! when the resource gets loaded and released when it gets unloaded.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate crayon_cache;

pub mod assets;

pub mod prelude {
    pub use crate::assets::prelude::BytesResource;
}

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crayon_cache::errors::Result;
use crayon_cache::res::prelude::ResourceCache;

use self::assets::prelude::BytesResource;

/// Registers file `path`, which is relative to the base path of `cache`, as a bytes resource.
/// Returns false if the identifier has been taken.
#[inline]
pub fn add_bytes<T1, T2>(cache: &ResourceCache, id: T1, path: T2) -> bool
where
    T1: Into<String>,
    T2: AsRef<str>,
{
    let v = BytesResource::from_cache(cache, id, path);
    cache.add_resource(Arc::new(v))
}

/// Registers every file under directory `dir` (relative to the base path of `cache`) as a
/// bytes resource, named by its path relative to the base path with `/` separators. Files
/// whose names have been taken are skipped. Returns the number of registered resources.
pub fn add_directory<T: AsRef<str>>(cache: &ResourceCache, dir: T) -> Result<usize> {
    let base = cache.base_path();
    let root = Path::new(&base).join(dir.as_ref());
    if !root.is_dir() {
        bail!("{:?} is not a directory.", root);
    }

    let mut num = 0;
    let mut stack = vec![root];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }

            let relative = path.strip_prefix(&base).unwrap_or(&path);
            let id = relative
                .components()
                .map(|v| v.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if add_bytes(cache, id.clone(), &id) {
                num += 1;
            } else {
                debug!("[Bytes] skips {} since the identifier has been taken.", id);
            }
        }
    }

    Ok(num)
}

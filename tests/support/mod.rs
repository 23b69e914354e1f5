#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crayon_cache::errors::Result;
use crayon_cache::prelude::*;

pub fn setup() {
    let _ = env_logger::try_init();
}

/// Calls `update` until `done` returns true, and returns false if it timed out.
pub fn pump<F: FnMut() -> bool>(cache: &ResourceCache, mut done: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        cache.update();
        if done() {
            return true;
        }

        thread::sleep(Duration::from_millis(1));
    }

    false
}

/// A fake texture whose decoding could be delayed or broken on purpose.
pub struct Texture {
    base: ResourceBase,
    pixels: RwLock<Option<Vec<u8>>>,
    delay: Duration,
    pub broken: AtomicBool,
    pub loads: AtomicUsize,
    active: AtomicUsize,
    pub overlapped: AtomicBool,
}

impl Texture {
    pub fn new(id: &str) -> Arc<Self> {
        Texture::slow(id, 0)
    }

    pub fn slow(id: &str, ms: u64) -> Arc<Self> {
        Arc::new(Texture {
            base: ResourceBase::new(id, format!("textures/{}.png", id)),
            pixels: RwLock::new(None),
            delay: Duration::from_millis(ms),
            broken: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            overlapped: AtomicBool::new(false),
        })
    }

    pub fn broken(id: &str) -> Arc<Self> {
        let v = Texture::new(id);
        v.broken.store(true, Ordering::SeqCst);
        v
    }

    pub fn has_pixels(&self) -> bool {
        self.pixels.read().unwrap().is_some()
    }
}

impl Resource for Texture {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn load_payload(&self) -> Result<()> {
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }

        thread::sleep(self.delay);

        let rsp = if self.broken.load(Ordering::SeqCst) {
            Err(format_err!("malformed header in {}", self.path()))
        } else {
            *self.pixels.write().unwrap() = Some(vec![0xff; 16]);
            Ok(())
        };

        self.loads.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
        rsp
    }

    fn unload_payload(&self) {
        *self.pixels.write().unwrap() = None;
    }
}

/// A fake audio clip.
pub struct Clip {
    base: ResourceBase,
    samples: RwLock<Option<Vec<f32>>>,
}

impl Clip {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Clip {
            base: ResourceBase::new(id, format!("audio/{}.ogg", id)),
            samples: RwLock::new(None),
        })
    }
}

impl Resource for Clip {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn load_payload(&self) -> Result<()> {
        *self.samples.write().unwrap() = Some(vec![0.0; 64]);
        Ok(())
    }

    fn unload_payload(&self) {
        *self.samples.write().unwrap() = None;
    }
}

/// A resource that panics while decoding, until it is cured.
pub struct Cursed {
    base: ResourceBase,
    pub cured: AtomicBool,
}

impl Cursed {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Cursed {
            base: ResourceBase::new(id, "cursed.bin"),
            cured: AtomicBool::new(false),
        })
    }
}

impl Resource for Cursed {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn load_payload(&self) -> Result<()> {
        if !self.cured.load(Ordering::SeqCst) {
            panic!("decoder exploded");
        }

        Ok(())
    }

    fn unload_payload(&self) {}
}

/// A tileset that requests its atlas texture from the cache while it is loading.
pub struct Tileset {
    base: ResourceBase,
    cache: Weak<ResourceCache>,
    atlas: String,
    delay: Duration,
}

impl Tileset {
    pub fn new(id: &str, atlas: &str, ms: u64, cache: &Arc<ResourceCache>) -> Arc<Self> {
        Arc::new(Tileset {
            base: ResourceBase::new(id, format!("tilesets/{}.json", id)),
            cache: Arc::downgrade(cache),
            atlas: atlas.to_owned(),
            delay: Duration::from_millis(ms),
        })
    }
}

impl Resource for Tileset {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn load_payload(&self) -> Result<()> {
        thread::sleep(self.delay);

        let cache = match self.cache.upgrade() {
            Some(v) => v,
            None => bail!("cache of {} is gone", self.id()),
        };

        if !cache.load_resource_async(&self.atlas) {
            bail!("atlas {} of {} is not registered", self.atlas, self.id());
        }

        Ok(())
    }

    fn unload_payload(&self) {}
}

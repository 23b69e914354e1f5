//! # What is This?
//!
//! `crayon-cache` is the resource cache of the crayon game framework. It keeps track of every
//! loadable resource (textures, audio clips, tileset backing textures and so on) by a readable
//! identifier, loads them synchronously on the calling thread or asynchronously on a small pool
//! of background workers, and hands the results back to the main thread in `update`.
//!
//! ```rust,ignore
//! use crayon_cache::prelude::*;
//!
//! let cache = ResourceCache::new(CacheParams::default());
//! cache.add_resource(Arc::new(MyTexture::new("tex1", "textures/crate.png")));
//!
//! cache.load_resource_async_with_callback("tex1", |res| {
//!     assert!(res.is_loaded());
//! });
//!
//! loop {
//!     cache.update();
//!     // ...
//! }
//! ```
//!
//! Please read the documents under modules for specific usages.

#[macro_use]
pub extern crate failure;
#[macro_use]
extern crate log;
extern crate serde;
extern crate serde_json;

pub mod errors;
pub mod res;
pub mod sched;

pub mod prelude {
    pub use crate::errors::Result;
    pub use crate::res::prelude::*;
    pub use std::sync::Arc;
}

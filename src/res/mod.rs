//! The resource cache keeps track of loadable resources, loads them on demand and shares
//! them between the systems that use them.
//!
//! # Resource
//!
//! A _resource_ is anything that could be loaded from some source into a usable payload, like
//! textures, audio clips or the backing textures of tilesets. Every resource kind implements the
//! `Resource` trait, which exposes `load`, `unload` and `reload` and a explicit state:
//!
//! ```sh
//! Unloaded -> Loading -> Loaded | Failed
//! Loaded | Failed -> Unloaded
//! ```
//!
//! The cache never inspects the payload of a resource. A failed load is reported through the
//! state of the resource only, so the callers should check `is_loaded` or `is_failed` in their
//! callbacks.
//!
//! # Identifier
//!
//! Resources are registered with a readable identifier, which should be unique in a cache.
//! Adding a resource with a taken identifier fails without touching the cache.
//!
//! # Loading
//!
//! Resources could be loaded synchronously on the calling thread with `load_resource`, or
//! asynchronously with `load_resource_async`. Asynchronous requests are serviced by a fixed
//! number of background workers, and their callbacks are invoked on the main thread when
//! `update` is called:
//!
//! ```rust,ignore
//! cache.load_resource_async_with_callback("tex1", |res| {
//!     if res.is_failed() {
//!         println!("{:?}", res.last_error());
//!     }
//! });
//!
//! // Somewhere in the main loop.
//! cache.update();
//! ```
//!
//! Requests of the same resource are serviced one after another in submission order, while
//! requests of different resources run in parallel without any ordering.
//!
//! ## Ownership & Lifetime
//!
//! The cache and the callers share the ownership of a resource through `Arc`. A reference count
//! is kept besides that, which is maintained by the callers (or by a `ResourceRef` guard) and
//! never unloads anything by itself. Instead, `clear_unused_resources` sweeps all the resources
//! without outstanding references out of the cache when the user asks for it.

pub mod cache;
pub mod handle;
pub mod request;
pub mod resource;
pub mod state;
pub mod table;
pub mod worker;

pub mod prelude {
    pub use super::cache::{CacheStats, ResourceCache};
    pub use super::handle::ResourceRef;
    pub use super::resource::{Resource, ResourceBase};
    pub use super::state::ResourceState;
    pub use super::CacheParams;
}

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// The setup parameters of a `ResourceCache`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheParams {
    /// The directory that resource kinds resolve relative paths against. The cache itself
    /// does not interpret it.
    pub base_path: String,
    /// Loads resources on background workers if true, or on the calling thread otherwise.
    pub async_loading: bool,
    /// The number of background workers.
    pub max_async_loads: usize,
    /// The stack size of background workers, uses the platform default if None.
    pub stack_size: Option<usize>,
}

impl Default for CacheParams {
    fn default() -> Self {
        CacheParams {
            base_path: String::new(),
            async_loading: true,
            max_async_loads: 4,
            stack_size: None,
        }
    }
}

impl CacheParams {
    /// Parses parameters from JSON, missing fields take their default values.
    pub fn from_json<T: AsRef<str>>(json: T) -> Result<Self> {
        let params: CacheParams = serde_json::from_str(json.as_ref()).map_err(Error::from)?;
        Ok(params)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn params() {
        let params = CacheParams::from_json(r#"{ "base_path": "res", "max_async_loads": 2 }"#)
            .unwrap();

        assert_eq!(params.base_path, "res");
        assert_eq!(params.max_async_loads, 2);
        assert!(params.async_loading);
        assert_eq!(params.stack_size, None);

        assert!(CacheParams::from_json("{ max_async_loads: }").is_err());
        assert_eq!(CacheParams::from_json("{}").unwrap(), CacheParams::default());
    }
}

//! The contract every cacheable resource kind implements.
//!
//! A concrete kind embeds a `ResourceBase`, which carries the identifier, the source path, the
//! lifecycle state and the reference count, and implements the two payload hooks. The provided
//! `load`, `unload` and `reload` methods drive the state machine around those hooks:
//!
//! ```rust,ignore
//! struct Clip {
//!     base: ResourceBase,
//!     samples: RwLock<Option<Vec<f32>>>,
//! }
//!
//! impl Resource for Clip {
//!     fn base(&self) -> &ResourceBase {
//!         &self.base
//!     }
//!
//!     fn load_payload(&self) -> Result<()> {
//!         *self.samples.write().unwrap() = Some(decode(self.path())?);
//!         Ok(())
//!     }
//!
//!     fn unload_payload(&self) {
//!         *self.samples.write().unwrap() = None;
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{Error, Result};
use crate::sched::unwind;

use super::state::ResourceState;

/// Type erasure helpers that make `dyn Resource` downcastable to its concrete kind.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A polymorphic unit of cacheable content.
///
/// `load`, `unload` and `reload` may be called from any thread, but never concurrently on the
/// same instance. The cache never dispatches two asynchronous tasks for the same resource at
/// once; mixing synchronous and asynchronous requests on one resource is up to the caller.
pub trait Resource: AsAny {
    /// Returns the shared bookkeeping of this resource.
    fn base(&self) -> &ResourceBase;

    /// Produces the backing payload (decoded bytes, device handles, ...). This is called
    /// while the resource is in `Loading` state.
    fn load_payload(&self) -> Result<()>;

    /// Releases the backing payload. Must not panic.
    fn unload_payload(&self);

    /// Loads the resource, and returns true if the payload is available afterwards.
    ///
    /// A `Loaded` resource returns true immediately. A `Loading` or `Failed` resource returns
    /// false without doing anything, failed resources are retried with `reload`.
    ///
    /// If `load_payload` panics, the resource is marked as `Failed` before the panic goes on.
    fn load(&self) -> bool {
        let base = self.base();
        if !base.begin_load() {
            return base.is_loaded();
        }

        match unwind::halt_unwinding(|| self.load_payload()) {
            Ok(rsp) => base.finish_load(rsp),
            Err(payload) => {
                base.fail(Error::panicked(base.id(), &*payload));
                unwind::resume_unwinding(payload)
            }
        }
    }

    /// Releases the payload and resets the state to `Unloaded`. It's a no-op if the resource
    /// is not loaded.
    fn unload(&self) {
        let base = self.base();
        match base.state() {
            ResourceState::Loaded => {
                self.unload_payload();
                base.finish_unload();
            }
            ResourceState::Failed => base.finish_unload(),
            ResourceState::Unloaded | ResourceState::Loading => {}
        }
    }

    /// Unloads and loads the resource again. Kinds that support partial reloading could
    /// override this.
    fn reload(&self) -> bool {
        self.unload();
        self.load()
    }

    #[inline]
    fn id(&self) -> &str {
        self.base().id()
    }

    #[inline]
    fn path(&self) -> &str {
        self.base().path()
    }

    #[inline]
    fn state(&self) -> ResourceState {
        self.base().state()
    }

    #[inline]
    fn is_loaded(&self) -> bool {
        self.base().is_loaded()
    }

    #[inline]
    fn is_loading(&self) -> bool {
        self.base().state() == ResourceState::Loading
    }

    #[inline]
    fn is_failed(&self) -> bool {
        self.base().state() == ResourceState::Failed
    }

    #[inline]
    fn ref_count(&self) -> usize {
        self.base().ref_count()
    }

    #[inline]
    fn add_reference(&self) {
        self.base().add_reference()
    }

    #[inline]
    fn remove_reference(&self) {
        self.base().remove_reference()
    }

    /// Returns the description of the error which failed the last load, if any.
    #[inline]
    fn last_error(&self) -> Option<String> {
        self.base().last_error()
    }
}

/// Downcasts a type-erased resource into its concrete kind.
#[inline]
pub fn downcast<T: Resource>(resource: Arc<dyn Resource>) -> Option<Arc<T>> {
    <dyn Resource as AsAny>::into_any(resource)
        .downcast::<T>()
        .ok()
}

/// Checks if a type-erased resource is of kind `T`.
#[inline]
pub fn is<T: Resource>(resource: &dyn Resource) -> bool {
    <dyn Resource as AsAny>::as_any(resource).is::<T>()
}

/// The bookkeeping shared by every resource kind.
pub struct ResourceBase {
    id: String,
    path: String,
    state: AtomicU8,
    rc: AtomicUsize,
    error: Mutex<Option<String>>,
}

impl ResourceBase {
    pub fn new<T1, T2>(id: T1, path: T2) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
    {
        ResourceBase {
            id: id.into(),
            path: path.into(),
            state: AtomicU8::new(ResourceState::Unloaded as u8),
            rc: AtomicUsize::new(0),
            error: Mutex::new(None),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn state(&self) -> ResourceState {
        ResourceState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.state() == ResourceState::Loaded
    }

    #[inline]
    pub fn ref_count(&self) -> usize {
        self.rc.load(Ordering::Acquire)
    }

    #[inline]
    pub fn add_reference(&self) {
        self.rc.fetch_add(1, Ordering::AcqRel);
    }

    /// Decreases the reference count. The count saturates at zero.
    #[inline]
    pub fn remove_reference(&self) {
        let _ = self
            .rc
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1));
    }

    #[inline]
    pub fn last_error(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    /// Moves `Unloaded` into `Loading`, and returns true if the caller is now responsible
    /// for producing the payload.
    pub fn begin_load(&self) -> bool {
        let ok = self
            .state
            .compare_exchange(
                ResourceState::Unloaded as u8,
                ResourceState::Loading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if ok {
            *self.error.lock().unwrap() = None;
        }

        ok
    }

    /// Settles a load started with `begin_load`, and returns true if it succeeded.
    pub fn finish_load(&self, rsp: Result<()>) -> bool {
        debug_assert_eq!(self.state(), ResourceState::Loading);

        match rsp {
            Ok(_) => {
                self.state
                    .store(ResourceState::Loaded as u8, Ordering::Release);
                true
            }
            Err(err) => {
                debug!("[Resource] failed to load {}: {}", self.id, err);
                self.fail(err);
                false
            }
        }
    }

    /// Resets the state to `Unloaded` once the payload has been released.
    #[inline]
    pub fn finish_unload(&self) {
        self.state
            .store(ResourceState::Unloaded as u8, Ordering::Release);
    }

    /// Marks the resource as failed with `err`.
    pub(crate) fn fail<T: std::fmt::Display>(&self, err: T) {
        *self.error.lock().unwrap() = Some(err.to_string());
        self.state
            .store(ResourceState::Failed as u8, Ordering::Release);
    }
}

impl std::fmt::Debug for ResourceBase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ResourceBase")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("state", &self.state())
            .field("rc", &self.ref_count())
            .finish()
    }
}

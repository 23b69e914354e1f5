//! Asynchronous loading requests and their completions.

use std::sync::{Arc, Mutex};

use crate::errors::Error;
use crate::sched::unwind;

use super::resource::Resource;

/// The completion callback of a load or reload request. It receives the resource no matter
/// the request succeeded or not, so the callee should inspect `is_loaded` / `is_failed`.
pub type Callback = Box<dyn FnOnce(Arc<dyn Resource>) + Send>;

/// A deferred unit of work that waits for a worker.
pub struct LoadTask {
    pub id: String,
    pub callback: Option<Callback>,
    pub reload: bool,
}

impl LoadTask {
    #[inline]
    pub fn new<T: Into<String>>(id: T, callback: Option<Callback>, reload: bool) -> Self {
        LoadTask {
            id: id.into(),
            callback,
            reload,
        }
    }

    /// Runs this task on the current thread with `resource`, and turns it into a result.
    ///
    /// A panic raised by the resource is caught here, the resource is marked as failed and
    /// the callback is kept, so it still fires.
    pub fn execute(self, resource: Arc<dyn Resource>) -> LoadResult {
        let LoadTask {
            id,
            callback,
            reload,
        } = self;

        let target = resource.clone();
        let rsp = unwind::halt_unwinding(move || {
            if reload {
                target.reload()
            } else {
                target.load()
            }
        });

        let success = match rsp {
            Ok(success) => success,
            Err(payload) => {
                let err = Error::panicked(id.as_str(), &*payload);
                warn!("[LoadTask] {}", err);
                resource.base().fail(err);
                false
            }
        };

        LoadResult {
            id,
            success,
            callback,
            resource,
        }
    }
}

impl std::fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("LoadTask")
            .field("id", &self.id)
            .field("reload", &self.reload)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The outcome of a `LoadTask`, consumed exactly once on the main thread.
pub struct LoadResult {
    pub id: String,
    pub success: bool,
    pub callback: Option<Callback>,
    pub resource: Arc<dyn Resource>,
}

impl LoadResult {
    /// Consumes this result and invokes its callback if any.
    #[inline]
    pub fn dispatch(self) {
        if let Some(func) = self.callback {
            func(self.resource);
        }
    }
}

/// A thread-safe FIFO of completed requests waiting for `update`.
#[derive(Default)]
pub struct ResultQueue {
    results: Mutex<Vec<LoadResult>>,
}

impl ResultQueue {
    pub fn new() -> Self {
        ResultQueue {
            results: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn push(&self, result: LoadResult) {
        self.results.lock().unwrap().push(result);
    }

    /// Takes every completed request out of the queue in completion order. The lock is
    /// released before return, so callbacks could issue new requests freely.
    #[inline]
    pub fn drain(&self) -> Vec<LoadResult> {
        std::mem::replace(&mut *self.results.lock().unwrap(), Vec::new())
    }
}

use std::sync::{Arc, Mutex, RwLock};

use super::handle::ResourceRef;
use super::request::{Callback, LoadTask};
use super::resource::{self, Resource};
use super::state::ResourceState;
use super::table::ResourceTable;
use super::worker::{Shared, WorkerPool};
use super::CacheParams;

/// Counts of the resources in a cache, grouped by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub unloaded: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
    /// Resources with at least one outstanding reference.
    pub referenced: usize,
}

/// The `ResourceCache` owns all the registered resources, and loads them either on the
/// calling thread or on its background workers.
///
/// Callbacks of asynchronous requests are invoked in `update`, which should be called
/// regularly from the main thread.
pub struct ResourceCache {
    shared: Arc<Shared>,
    pool: Mutex<Option<WorkerPool>>,
    params: RwLock<CacheParams>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        ResourceCache::new(CacheParams::default())
    }
}

impl ResourceCache {
    /// Creates a new and empty `ResourceCache`. The worker pool is launched right away if
    /// asynchronous loading is enabled.
    pub fn new(mut params: CacheParams) -> Self {
        params.max_async_loads = params.max_async_loads.max(1);

        let shared = Arc::new(Shared::new(Arc::new(ResourceTable::new())));
        let pool = if params.async_loading {
            Some(WorkerPool::new(
                params.max_async_loads,
                params.stack_size,
                shared.clone(),
            ))
        } else {
            None
        };

        ResourceCache {
            shared,
            pool: Mutex::new(pool),
            params: RwLock::new(params),
        }
    }

    /// Returns the base directory that resource kinds resolve relative paths against.
    #[inline]
    pub fn base_path(&self) -> String {
        self.params.read().unwrap().base_path.clone()
    }

    #[inline]
    pub fn set_base_path<T: Into<String>>(&self, path: T) {
        self.params.write().unwrap().base_path = path.into();
    }

    /// Registers a resource. Returns false and leaves the cache untouched if a resource with
    /// the same identifier exists already.
    pub fn add_resource(&self, resource: Arc<dyn Resource>) -> bool {
        self.shared.table.insert(resource)
    }

    /// Returns the resource with identifier `id`.
    #[inline]
    pub fn resource(&self, id: &str) -> Option<Arc<dyn Resource>> {
        self.shared.table.get(id)
    }

    /// Returns the resource with identifier `id` if it is of kind `T`.
    #[inline]
    pub fn resource_of_type<T: Resource>(&self, id: &str) -> Option<Arc<T>> {
        self.shared.table.get(id).and_then(resource::downcast)
    }

    /// Returns all the resources of kind `T`.
    pub fn resources_of_type<T: Resource>(&self) -> Vec<Arc<T>> {
        self.shared
            .table
            .values()
            .into_iter()
            .filter_map(resource::downcast)
            .collect()
    }

    /// Returns a counted reference to the resource with identifier `id`.
    #[inline]
    pub fn acquire(&self, id: &str) -> Option<ResourceRef<dyn Resource>> {
        self.resource(id).map(ResourceRef::new)
    }

    /// Returns a counted reference to the resource with identifier `id` if it is of kind `T`.
    #[inline]
    pub fn acquire_of_type<T: Resource>(&self, id: &str) -> Option<ResourceRef<T>> {
        self.resource_of_type(id).map(ResourceRef::new)
    }

    #[inline]
    pub fn has_resource(&self, id: &str) -> bool {
        self.shared.table.contains(id)
    }

    /// Returns the number of registered resources.
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.table.is_empty()
    }

    /// Returns the identifiers of all the registered resources, in no particular order.
    #[inline]
    pub fn resource_ids(&self) -> Vec<String> {
        self.shared.table.ids()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for v in self.shared.table.values() {
            stats.total += 1;
            match v.state() {
                ResourceState::Unloaded => stats.unloaded += 1,
                ResourceState::Loading => stats.loading += 1,
                ResourceState::Loaded => stats.loaded += 1,
                ResourceState::Failed => stats.failed += 1,
            }

            if v.ref_count() > 0 {
                stats.referenced += 1;
            }
        }

        stats
    }

    /// Loads resource `id` on current thread. Returns true if the resource is loaded
    /// afterwards, and false if it failed or the identifier is unknown.
    #[inline]
    pub fn load_resource(&self, id: &str) -> bool {
        self.shared
            .table
            .get(id)
            .map(|v| v.load())
            .unwrap_or(false)
    }

    /// Loads resource `id` on current thread, and invokes `func` with the resource once it
    /// finished, no matter it succeeded or not. `func` is not invoked for unknown identifiers.
    pub fn load_resource_with_callback<F>(&self, id: &str, func: F) -> bool
    where
        F: FnOnce(Arc<dyn Resource>),
    {
        self.execute(id, func, false)
    }

    /// Reloads resource `id` on current thread.
    #[inline]
    pub fn reload_resource(&self, id: &str) -> bool {
        self.shared
            .table
            .get(id)
            .map(|v| v.reload())
            .unwrap_or(false)
    }

    /// Reloads resource `id` on current thread, and invokes `func` once it finished.
    pub fn reload_resource_with_callback<F>(&self, id: &str, func: F) -> bool
    where
        F: FnOnce(Arc<dyn Resource>),
    {
        self.execute(id, func, true)
    }

    /// Loads resource `id` asynchronously. Returns false only if the identifier is unknown.
    #[inline]
    pub fn load_resource_async(&self, id: &str) -> bool {
        self.submit(id, None, false)
    }

    /// Loads resource `id` asynchronously, `func` will be invoked in `update` once the loading
    /// finished. If asynchronous loading is disabled, the resource is loaded on the current
    /// thread and `func` is invoked before return. Panics of the resource are caught in both
    /// cases, leaving it `Failed`.
    pub fn load_resource_async_with_callback<F>(&self, id: &str, func: F) -> bool
    where
        F: FnOnce(Arc<dyn Resource>) + Send + 'static,
    {
        self.submit(id, Some(Box::new(func)), false)
    }

    /// Reloads resource `id` asynchronously.
    #[inline]
    pub fn reload_resource_async(&self, id: &str) -> bool {
        self.submit(id, None, true)
    }

    /// Reloads resource `id` asynchronously, `func` will be invoked in `update` once the
    /// reloading finished.
    pub fn reload_resource_async_with_callback<F>(&self, id: &str, func: F) -> bool
    where
        F: FnOnce(Arc<dyn Resource>) + Send + 'static,
    {
        self.submit(id, Some(Box::new(func)), true)
    }

    /// Unloads resource `id` if it is loaded. Returns false if the identifier is unknown.
    pub fn unload_resource(&self, id: &str) -> bool {
        match self.shared.table.get(id) {
            Some(v) => {
                v.unload();
                true
            }
            None => false,
        }
    }

    /// Unloads every loaded resource but keeps them registered, and returns how many were
    /// unloaded.
    pub fn unload_all(&self) -> usize {
        let mut num = 0;
        for v in self.shared.table.values() {
            if v.is_loaded() {
                v.unload();
                num += 1;
            }
        }

        num
    }

    /// Unloads and unregisters resource `id`. Returns false if the identifier is unknown.
    pub fn remove_resource(&self, id: &str) -> bool {
        match self.shared.table.remove(id) {
            Some(v) => {
                v.unload();
                true
            }
            None => false,
        }
    }

    /// Unloads and unregisters every resource without outstanding references, and returns
    /// how many were removed. Pending asynchronous tasks of removed resources are dropped
    /// silently when a worker picks them up.
    pub fn clear_unused_resources(&self) -> usize {
        let removed = self.shared.table.remove_if(|v| v.ref_count() == 0);
        for v in &removed {
            v.unload();
        }

        if !removed.is_empty() {
            debug!("[ResourceCache] cleared {} unused resources.", removed.len());
        }

        removed.len()
    }

    /// Unloads and unregisters every resource, and returns how many were removed.
    pub fn clear_resources(&self) -> usize {
        let removed = self.shared.table.clear();
        for v in &removed {
            v.unload();
        }

        removed.len()
    }

    /// Drains completed asynchronous requests and invokes their callbacks, in the order they
    /// completed. Returns the number of drained requests.
    ///
    /// This never blocks on loading. Requests completed during the callbacks are left for the
    /// next call.
    pub fn update(&self) -> usize {
        let results = self.shared.results.drain();
        let num = results.len();

        for v in results {
            v.dispatch();
        }

        num
    }

    /// Returns the number of asynchronous requests that have been accepted but not
    /// finished by a worker yet.
    #[inline]
    pub fn pending_async_loads(&self) -> usize {
        self.shared.tasks.len()
    }

    #[inline]
    pub fn max_async_loads(&self) -> usize {
        self.params.read().unwrap().max_async_loads
    }

    #[inline]
    pub fn is_async_loading_enabled(&self) -> bool {
        self.params.read().unwrap().async_loading
    }

    /// Sets the number of background workers. The running workers are joined and a new pool
    /// is launched, so this blocks until every in-progress load has finished. Queued requests,
    /// including the ones issued by resources while they are loading, are kept and serviced by
    /// the new pool.
    pub fn set_max_async_loads(&self, num: usize) {
        let num = num.max(1);

        let mut pool = self.pool.lock().unwrap();
        let stack_size = {
            let mut params = self.params.write().unwrap();
            if params.max_async_loads == num {
                return;
            }

            params.max_async_loads = num;
            params.stack_size
        };

        if let Some(mut v) = pool.take() {
            info!("[ResourceCache] restarts workers with {} threads.", num);
            v.terminate();
            *pool = Some(WorkerPool::new(num, stack_size, self.shared.clone()));
        }
    }

    /// Enables or disables asynchronous loading. When disabled, the workers are joined and
    /// the requests still queued are executed on the current thread, their callbacks will be
    /// invoked in the next `update`. Asynchronous requests issued afterwards are executed
    /// synchronously.
    pub fn set_async_loading_enabled(&self, enabled: bool) {
        {
            let mut pool = self.pool.lock().unwrap();
            let (num, stack_size) = {
                let mut params = self.params.write().unwrap();
                if params.async_loading == enabled {
                    return;
                }

                params.async_loading = enabled;
                (params.max_async_loads, params.stack_size)
            };

            if enabled {
                *pool = Some(WorkerPool::new(num, stack_size, self.shared.clone()));
                return;
            }

            if let Some(mut v) = pool.take() {
                v.terminate();
            }
        }

        while let Some(task) = self.shared.tasks.try_pop() {
            self.shared.run(task);
        }
    }

    fn execute<F>(&self, id: &str, func: F, reload: bool) -> bool
    where
        F: FnOnce(Arc<dyn Resource>),
    {
        match self.shared.table.get(id) {
            Some(v) => {
                let success = if reload { v.reload() } else { v.load() };
                func(v);
                success
            }
            None => false,
        }
    }

    fn submit(&self, id: &str, callback: Option<Callback>, reload: bool) -> bool {
        let resource = match self.shared.table.get(id) {
            Some(v) => v,
            None => return false,
        };

        let task = LoadTask::new(id, callback, reload);

        {
            // The read guard keeps `set_async_loading_enabled` from draining the queue
            // until this task is in.
            let params = self.params.read().unwrap();
            if params.async_loading {
                self.shared.tasks.push(task);
                return true;
            }
        }

        task.execute(resource).dispatch();
        true
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        self.shared.tasks.shutdown();

        let discarded = self.shared.tasks.discard();
        if discarded > 0 {
            debug!("[ResourceCache] discards {} queued tasks.", discarded);
        }

        if let Ok(mut pool) = self.pool.lock() {
            if let Some(mut v) = pool.take() {
                v.terminate();
            }
        }
    }
}

use std::ops::Deref;
use std::sync::Arc;

use super::resource::Resource;

/// A counted reference to a cached resource.
///
/// The reference count of the resource is increased when a `ResourceRef` is created or cloned,
/// and decreased when it is dropped. Resources with live references survive
/// `ResourceCache::clear_unused_resources`.
pub struct ResourceRef<T: Resource + ?Sized> {
    inner: Arc<T>,
}

impl<T: Resource + ?Sized> ResourceRef<T> {
    #[inline]
    pub fn new(inner: Arc<T>) -> Self {
        inner.add_reference();
        ResourceRef { inner }
    }

    /// Returns the shared pointer to the underlying resource, which is not counted.
    #[inline]
    pub fn arc(&self) -> &Arc<T> {
        &self.inner
    }
}

impl<T: Resource + ?Sized> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        ResourceRef::new(self.inner.clone())
    }
}

impl<T: Resource + ?Sized> Deref for ResourceRef<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Resource + ?Sized> Drop for ResourceRef<T> {
    fn drop(&mut self) {
        self.inner.remove_reference();
    }
}

impl<T: Resource + ?Sized> std::fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("ResourceRef").field(self.inner.base()).finish()
    }
}

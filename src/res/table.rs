//! The identifier-keyed collection of registered resources.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::resource::Resource;

/// A mutex-protected map from identifiers to resources. Every operation holds the lock only
/// for the duration of the map access; loading and unloading happen outside of it.
#[derive(Default)]
pub struct ResourceTable {
    items: Mutex<HashMap<String, Arc<dyn Resource>>>,
}

impl ResourceTable {
    pub fn new() -> Self {
        ResourceTable {
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `resource`, and returns false if its identifier has been taken already.
    pub fn insert(&self, resource: Arc<dyn Resource>) -> bool {
        let mut items = self.items.lock().unwrap();
        if items.contains_key(resource.id()) {
            return false;
        }

        items.insert(resource.id().to_owned(), resource);
        true
    }

    #[inline]
    pub fn remove(&self, id: &str) -> Option<Arc<dyn Resource>> {
        self.items.lock().unwrap().remove(id)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<Arc<dyn Resource>> {
        self.items.lock().unwrap().get(id).cloned()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.items.lock().unwrap().contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the identifiers of all the registered resources.
    pub fn ids(&self) -> Vec<String> {
        self.items.lock().unwrap().keys().cloned().collect()
    }

    /// Returns a snapshot of all the registered resources.
    pub fn values(&self) -> Vec<Arc<dyn Resource>> {
        self.items.lock().unwrap().values().cloned().collect()
    }

    /// Removes every resource that `func` returns true for, and returns them.
    pub fn remove_if<F>(&self, mut func: F) -> Vec<Arc<dyn Resource>>
    where
        F: FnMut(&dyn Resource) -> bool,
    {
        let mut items = self.items.lock().unwrap();

        let ids: Vec<_> = items
            .iter()
            .filter(|(_, v)| func(&***v))
            .map(|(k, _)| k.clone())
            .collect();

        ids.iter().filter_map(|id| items.remove(id)).collect()
    }

    /// Removes every resource, and returns them.
    pub fn clear(&self) -> Vec<Arc<dyn Resource>> {
        self.items
            .lock()
            .unwrap()
            .drain()
            .map(|(_, v)| v)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::Result;
    use crate::res::resource::ResourceBase;

    struct Blob(ResourceBase);

    impl Resource for Blob {
        fn base(&self) -> &ResourceBase {
            &self.0
        }

        fn load_payload(&self) -> Result<()> {
            Ok(())
        }

        fn unload_payload(&self) {}
    }

    fn blob(id: &str) -> Arc<dyn Resource> {
        Arc::new(Blob(ResourceBase::new(id, id)))
    }

    #[test]
    fn basic() {
        let table = ResourceTable::new();
        assert!(table.is_empty());

        assert!(table.insert(blob("a")));
        assert!(table.insert(blob("b")));
        assert!(!table.insert(blob("a")));
        assert_eq!(table.len(), 2);

        assert!(table.contains("a"));
        assert_eq!(table.get("b").unwrap().id(), "b");
        assert!(table.get("c").is_none());

        let mut ids = table.ids();
        ids.sort();
        assert_eq!(ids, vec!["a".to_owned(), "b".to_owned()]);

        assert_eq!(table.remove("a").unwrap().id(), "a");
        assert!(table.remove("a").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_if() {
        let table = ResourceTable::new();
        for i in 0..8 {
            let v = blob(&format!("{}", i));
            if i % 2 == 0 {
                v.add_reference();
            }

            table.insert(v);
        }

        let removed = table.remove_if(|v| v.ref_count() == 0);
        assert_eq!(removed.len(), 4);
        assert_eq!(table.len(), 4);
        assert!(table.values().iter().all(|v| v.ref_count() == 1));

        assert_eq!(table.clear().len(), 4);
        assert!(table.is_empty());
    }
}

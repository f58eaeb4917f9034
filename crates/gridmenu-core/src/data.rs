use ahash::AHashMap;
use compact_str::CompactString;
use std::any::Any;
use std::sync::Arc;

/// Untyped key/value side data attached to a cell or a view
///
/// Values are shared on clone; a cell copied for rendering sees the same
/// values as its source until either side overwrites a key.
#[derive(Clone, Default)]
pub struct DataRegistry {
    entries: AHashMap<CompactString, Arc<dyn Any + Send + Sync>>,
}

impl DataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<CompactString>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Value under `key` if present and of type `T`
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.entries.get(key)?.downcast_ref::<T>().cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for DataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        let mut data = DataRegistry::new();
        data.set("index", 3usize);
        data.set("owner", CompactString::from("alex"));

        assert_eq!(data.get::<usize>("index"), Some(3));
        assert_eq!(data.get::<u32>("index"), None);
        assert_eq!(data.get::<CompactString>("owner").as_deref(), Some("alex"));
        assert_eq!(data.get::<usize>("missing"), None);
    }

    #[test]
    fn test_clone_is_independent_map() {
        let mut a = DataRegistry::new();
        a.set("k", 1i32);
        let mut b = a.clone();
        b.set("k", 2i32);
        assert_eq!(a.get::<i32>("k"), Some(1));
        assert_eq!(b.get::<i32>("k"), Some(2));
        assert!(b.remove("k"));
        assert!(a.contains("k"));
    }
}

use crate::error::Result;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - models are freed when all pipelines using them drop.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

/// Process-wide registry of loaded models, so pipelines built from the same artifacts share
/// one set of weights.
pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        // Entries are plain weak pointers; a panic elsewhere cannot leave them half-written.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live model stored under `key`, or load, store and return a new one.
    ///
    /// The loader runs outside the lock, so two racing builds may both load; the last one
    /// to finish is the one later callers see.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        {
            let mut cache = self.storage();
            if let Some(boxed) = cache.get(&cache_key) {
                if let Some(strong) = boxed.downcast_ref::<Weak<M>>().and_then(Weak::upgrade) {
                    tracing::debug!(key, "reusing cached model");
                    return Ok(strong);
                }
                cache.remove(&cache_key);
            }
        }

        let model = Arc::new(loader()?);

        self.storage()
            .insert(cache_key, Box::new(Arc::downgrade(&model)));
        tracing::debug!(key, "cached newly loaded model");

        Ok(model)
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Number of entries, including ones whose model has already been dropped.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.storage().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: Lazy<ModelCache> = Lazy::new(ModelCache::new);

pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct TestModel {
        id: String,
    }

    #[test]
    fn returns_same_instance_while_alive() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<TestModel, _>("lstm", || {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let second = cache
            .get_or_create::<TestModel, _>("lstm", || Ok(TestModel { id: "new".into() }))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.id, "original");
    }

    #[test]
    fn reloads_after_all_handles_drop() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "a".into() }))
            .unwrap();
        drop(first);

        let second = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "b".into() }))
            .unwrap();
        assert_eq!(second.id, "b");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_keys_are_independent() {
        let cache = ModelCache::new();
        let a = cache
            .get_or_create::<TestModel, _>("key1", || Ok(TestModel { id: "first".into() }))
            .unwrap();
        let b = cache
            .get_or_create::<TestModel, _>("key2", || {
                Ok(TestModel {
                    id: "second".into(),
                })
            })
            .unwrap();

        assert_eq!(a.id, "first");
        assert_eq!(b.id, "second");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn loader_errors_are_not_cached() {
        let cache = ModelCache::new();
        let result = cache.get_or_create::<TestModel, _>("broken", || {
            Err(PipelineError::Inference("weights missing".into()))
        });
        assert!(matches!(result, Err(PipelineError::Inference(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ModelCache::new();
        let _model = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "x".into() }))
            .unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}

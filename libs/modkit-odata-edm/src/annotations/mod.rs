//! Typed, per-model annotation store.
//!
//! Implementation details:
//! - Key = (model element, annotation type). The type part is `TypeId::of::<T>()`.
//! - Value = `Arc<T>` erased to `Arc<dyn Any + Send + Sync>` (downcast on read).
//! - Reads and writes go through a `DashMap`, so annotations may be read and lazily
//!   materialized from any number of request threads.
//!
//! Notes:
//! - `set` overwrites atomically; `Arc`s already handed out stay valid.
//! - `get_or_insert_with` computes outside the shard lock. When two threads race,
//!   both compute and the first insert wins; every caller receives the stored value.

mod facts;
mod links;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

pub use facts::{
    DynamicPropertyContainer, EnumMemberMap, ModelName, NativePropertyName, NativeTypeAnnotation,
    OperationTitle,
};
pub use links::{
    EntityLinkContext, FeedLinkContext, LinkFactory, LinkTarget, NavigationSourceLinkBuilder,
    OperationLinkBuilder,
};

use crate::model::ElementId;

type Erased = Arc<dyn Any + Send + Sync>;

/// Annotation values keyed by (element, value type).
#[derive(Default)]
pub struct AnnotationStore {
    entries: DashMap<(ElementId, TypeId), Erased>,
}

impl fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl AnnotationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key<T: Any>(element: impl Into<ElementId>) -> (ElementId, TypeId) {
        (element.into(), TypeId::of::<T>())
    }

    /// Annotation of type `T` on `element`, if any.
    pub fn get<T: Any + Send + Sync>(&self, element: impl Into<ElementId>) -> Option<Arc<T>> {
        let erased = Arc::clone(self.entries.get(&Self::key::<T>(element))?.value());
        erased.downcast::<T>().ok()
    }

    /// Store `value`, replacing an existing annotation of the same type.
    pub fn set<T: Any + Send + Sync>(&self, element: impl Into<ElementId>, value: T) {
        self.entries
            .insert(Self::key::<T>(element), Arc::new(value) as Erased);
    }

    /// Existing annotation, or the result of `init` stored under `element`.
    pub fn get_or_insert_with<T, F>(&self, element: impl Into<ElementId>, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let key = Self::key::<T>(element);
        if let Some(existing) = self.entries.get(&key)
            && let Ok(value) = Arc::clone(existing.value()).downcast::<T>()
        {
            return value;
        }

        let value = Arc::new(init());
        match self.entries.entry(key) {
            Entry::Occupied(slot) => Arc::clone(slot.get()).downcast::<T>().unwrap_or(value),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&value) as Erased);
                value
            }
        }
    }

    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self, element: impl Into<ElementId>) -> bool {
        self.entries.contains_key(&Self::key::<T>(element))
    }

    /// Drop the annotation of type `T` on `element`. Returns whether one existed.
    pub fn remove<T: Any + Send + Sync>(&self, element: impl Into<ElementId>) -> bool {
        self.entries.remove(&Self::key::<T>(element)).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);

    #[derive(Debug, PartialEq)]
    struct Weight(u32);

    #[test]
    fn test_values_are_keyed_by_type() {
        let store = AnnotationStore::new();
        store.set(ElementId::Model, Label("a"));
        store.set(ElementId::Model, Weight(3));

        assert_eq!(*store.get::<Label>(ElementId::Model).unwrap(), Label("a"));
        assert_eq!(*store.get::<Weight>(ElementId::Model).unwrap(), Weight(3));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_overwrites() {
        let store = AnnotationStore::new();
        store.set(ElementId::Model, Label("a"));
        let old = store.get::<Label>(ElementId::Model).unwrap();
        store.set(ElementId::Model, Label("b"));

        assert_eq!(*old, Label("a"));
        assert_eq!(*store.get::<Label>(ElementId::Model).unwrap(), Label("b"));
    }

    #[test]
    fn test_get_or_insert_runs_init_once() {
        let store = AnnotationStore::new();
        let calls = AtomicUsize::new(0);
        let init = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Weight(7)
        };

        let first = store.get_or_insert_with(ElementId::Model, init);
        let second = store.get_or_insert_with(ElementId::Model, || Weight(0));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove() {
        let store = AnnotationStore::new();
        store.set(ElementId::Model, Weight(1));
        assert!(store.contains::<Weight>(ElementId::Model));
        assert!(store.remove::<Weight>(ElementId::Model));
        assert!(!store.remove::<Weight>(ElementId::Model));
        assert!(store.is_empty());
    }
}

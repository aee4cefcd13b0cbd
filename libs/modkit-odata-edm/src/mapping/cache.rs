//! Per-model, two-way type-resolution cache.
//!
//! Entries are populated on first miss and never invalidated: the model is
//! immutable, so a resolution stays valid for the model's lifetime. Computation
//! runs outside the map's shard locks; concurrent misses for the same key may
//! compute twice and the last insert wins.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::EdmResult;
use crate::model::{EdmModel, EdmType, EdmTypeRef, ElementId};
use crate::native::NativeType;

/// Canonical native types for one EDM type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativePair {
    pub non_nullable: Option<NativeType>,
    pub nullable: Option<NativeType>,
}

impl NativePair {
    /// Same native type in both slots.
    #[must_use]
    pub fn both(native: NativeType) -> Self {
        Self {
            non_nullable: Some(native.clone()),
            nullable: Some(native),
        }
    }

    #[must_use]
    pub fn pick(&self, nullable: bool) -> Option<&NativeType> {
        if nullable {
            self.nullable.as_ref()
        } else {
            self.non_nullable.as_ref()
        }
    }
}

#[derive(Debug, Default)]
pub struct TypeCache {
    edm_by_native: DashMap<NativeType, Option<EdmTypeRef>>,
    native_by_edm: DashMap<EdmType, NativePair>,
}

impl TypeCache {
    /// Cached EDM type of `native`, computing it on a miss. Unmapped results are cached too.
    ///
    /// # Errors
    /// Propagates the error of `compute`; failures are not cached.
    pub fn get_or_compute_edm<F>(
        &self,
        native: &NativeType,
        compute: F,
    ) -> EdmResult<Option<EdmTypeRef>>
    where
        F: FnOnce() -> EdmResult<Option<EdmTypeRef>>,
    {
        if let Some(hit) = self.edm_by_native.get(native) {
            tracing::trace!(native = %native, "type cache hit");
            return Ok(hit.value().clone());
        }
        tracing::debug!(native = %native, "type cache miss");
        let computed = compute()?;
        self.edm_by_native.insert(native.clone(), computed.clone());
        Ok(computed)
    }

    /// Cached native type of `edm`, computing the canonical pair on a miss.
    ///
    /// # Errors
    /// Propagates the error of `compute`; failures are not cached.
    pub fn get_or_compute_native<F>(
        &self,
        edm: &EdmType,
        nullable: bool,
        compute: F,
    ) -> EdmResult<Option<NativeType>>
    where
        F: FnOnce() -> EdmResult<NativePair>,
    {
        if let Some(hit) = self.native_by_edm.get(edm) {
            tracing::trace!(edm = ?edm, "type cache hit");
            return Ok(hit.value().pick(nullable).cloned());
        }
        tracing::debug!(edm = ?edm, "type cache miss");
        let pair = compute()?;
        let picked = pair.pick(nullable).cloned();
        self.native_by_edm.insert(edm.clone(), pair);
        Ok(picked)
    }

    /// Number of cached (native → EDM, EDM → native) entries.
    #[must_use]
    pub fn entry_counts(&self) -> (usize, usize) {
        (self.edm_by_native.len(), self.native_by_edm.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edm_by_native.is_empty() && self.native_by_edm.is_empty()
    }
}

/// Caches of every mapper used with a model, keyed by mapper id.
///
/// Entries are dropped with the model, not with the mapper.
#[derive(Default)]
struct TypeCaches(DashMap<u64, Arc<TypeCache>>);

/// Cache scoped to (`model`, mapper), created on first use.
pub(super) fn cache_for(model: &EdmModel, mapper_id: u64) -> Arc<TypeCache> {
    let caches = model
        .annotations()
        .get_or_insert_with(ElementId::Model, TypeCaches::default);
    if let Some(cache) = caches.0.get(&mapper_id) {
        return Arc::clone(cache.value());
    }
    Arc::clone(caches.0.entry(mapper_id).or_default().value())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::EdmError;
    use crate::model::EdmPrimitiveKind;
    use crate::native::NativeScalar;

    #[test]
    fn test_edm_miss_is_computed_once() {
        let cache = TypeCache::default();
        let native = NativeType::from(NativeScalar::I32);
        let expected = EdmTypeRef::primitive(EdmPrimitiveKind::Int32, false);

        let first = cache
            .get_or_compute_edm(&native, || Ok(Some(expected.clone())))
            .unwrap();
        let second = cache.get_or_compute_edm(&native, || Ok(None)).unwrap();

        assert_eq!(first, Some(expected.clone()));
        assert_eq!(second, Some(expected));
        assert_eq!(cache.entry_counts(), (1, 0));
    }

    #[test]
    fn test_unmapped_result_is_cached() {
        let cache = TypeCache::default();
        let native = NativeType::class("Acme", "Unknown").build();
        assert!(cache.get_or_compute_edm(&native, || Ok(None)).unwrap().is_none());
        let again = cache
            .get_or_compute_edm(&native, || {
                Ok(Some(EdmTypeRef::primitive(EdmPrimitiveKind::String, true)))
            })
            .unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_failed_edm_computation_is_not_cached() {
        let cache = TypeCache::default();
        let native = NativeType::class("Acme", "Flaky").build();
        let failed = cache.get_or_compute_edm(&native, || Err(EdmError::invalid_model("boom")));
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_native_pair_picks_slot() {
        let cache = TypeCache::default();
        let edm = EdmType::Primitive(EdmPrimitiveKind::Int32);
        let plain = NativeType::from(NativeScalar::I32);
        let pair = NativePair {
            non_nullable: Some(plain.clone()),
            nullable: Some(NativeType::nullable(plain.clone())),
        };

        let picked = cache
            .get_or_compute_native(&edm, false, move || Ok(pair))
            .unwrap();
        assert_eq!(picked, Some(plain));
        let picked = cache
            .get_or_compute_native(&edm, true, || Ok(NativePair::default()))
            .unwrap();
        assert!(picked.unwrap().is_nullable());
    }
}

//! Annotation kinds and the cached facts derived from them.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::EdmResult;
use crate::model::{
    AnnotationValue, EdmModel, EdmProperty, ElementId, NavigationSourceId,
    OPTIMISTIC_CONCURRENCY_TERM, PropertyId, SchemaTypeId,
};
use crate::native::NativeType;

/// Native type explicitly bound to a schema type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeTypeAnnotation(pub NativeType);

/// Native member name of a property when it differs from the EDM name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativePropertyName(pub String);

/// Display name of a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelName(pub String);

/// Title of an operation as advertised in payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationTitle(pub String);

/// Native member that collects the dynamic properties of an open type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicPropertyContainer {
    pub property_name: String,
}

/// Pairs of (native member name, EDM member name) for an enum type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumMemberMap {
    members: Vec<(String, String)>,
}

impl EnumMemberMap {
    #[must_use]
    pub fn new<N: Into<String>, E: Into<String>>(pairs: impl IntoIterator<Item = (N, E)>) -> Self {
        Self {
            members: pairs
                .into_iter()
                .map(|(native, edm)| (native.into(), edm.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn edm_member(&self, native: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|(n, _)| n == native)
            .map(|(_, e)| e.as_str())
    }

    #[must_use]
    pub fn native_member(&self, edm: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, e)| e == edm)
            .map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Per-source cache of concurrency properties, stored on the model element.
#[derive(Default)]
struct ConcurrencyCache(DashMap<NavigationSourceId, Arc<[PropertyId]>>);

impl EdmModel {
    /// Display name of the model; a random UUID is assigned on first access.
    #[must_use]
    pub fn model_name(&self) -> String {
        self.annotations()
            .get_or_insert_with(ElementId::Model, || ModelName(Uuid::new_v4().to_string()))
            .0
            .clone()
    }

    pub fn set_model_name(&self, name: impl Into<String>) {
        self.annotations()
            .set(ElementId::Model, ModelName(name.into()));
    }

    /// Explicit native type of a schema type.
    #[must_use]
    pub fn native_type_annotation(&self, ty: SchemaTypeId) -> Option<NativeType> {
        self.annotations()
            .get::<NativeTypeAnnotation>(ty)
            .map(|a| a.0.clone())
    }

    pub fn set_native_type(&self, ty: SchemaTypeId, native: NativeType) {
        self.annotations().set(ty, NativeTypeAnnotation(native));
    }

    /// Native member name of `property`: the override when present, else the EDM name.
    #[must_use]
    pub fn native_property_name(&self, property: &EdmProperty) -> String {
        self.annotations()
            .get::<NativePropertyName>(property.id())
            .map_or_else(|| property.name().to_owned(), |n| n.0.clone())
    }

    pub fn set_native_property_name(&self, property: PropertyId, name: impl Into<String>) {
        self.annotations()
            .set(property, NativePropertyName(name.into()));
    }

    /// Dynamic-property container of an open type, inherited from base types.
    #[must_use]
    pub fn dynamic_property_container(
        &self,
        ty: SchemaTypeId,
    ) -> Option<Arc<DynamicPropertyContainer>> {
        self.type_and_base_types(ty)
            .find_map(|t| self.annotations().get::<DynamicPropertyContainer>(t.id()))
    }

    pub fn set_dynamic_property_container(
        &self,
        ty: SchemaTypeId,
        property_name: impl Into<String>,
    ) {
        self.annotations().set(
            ty,
            DynamicPropertyContainer {
                property_name: property_name.into(),
            },
        );
    }

    /// Member name map of an enum type. Without an explicit map, native and EDM
    /// member names are identical. `None` when `ty` is not an enum.
    ///
    /// # Errors
    /// [`EdmError::UnknownElement`](crate::EdmError::UnknownElement) for a foreign id.
    pub fn enum_member_map(&self, ty: SchemaTypeId) -> EdmResult<Option<Arc<EnumMemberMap>>> {
        let Some(def) = self.require_type(ty)?.as_enum() else {
            return Ok(None);
        };
        Ok(Some(self.annotations().get_or_insert_with(ty, || {
            EnumMemberMap::new(def.members.iter().map(|m| (m.name.as_str(), m.name.as_str())))
        })))
    }

    pub fn set_enum_member_map(&self, ty: SchemaTypeId, map: EnumMemberMap) {
        self.annotations().set(ty, map);
    }

    /// Structural properties listed by the source's optimistic-concurrency
    /// annotation. Only the first segment of each path is considered.
    ///
    /// # Errors
    /// [`EdmError::UnknownElement`](crate::EdmError::UnknownElement) for a foreign id.
    pub fn concurrency_properties(
        &self,
        source: NavigationSourceId,
    ) -> EdmResult<Arc<[PropertyId]>> {
        let nav_source = self.require_navigation_source(source)?;
        let cache = self
            .annotations()
            .get_or_insert_with(ElementId::Model, ConcurrencyCache::default);
        if let Some(hit) = cache.0.get(&source) {
            return Ok(Arc::clone(hit.value()));
        }

        let entity_type = nav_source.entity_type();
        let paths: &[AnnotationValue] = match self
            .find_vocabulary_annotation(source, OPTIMISTIC_CONCURRENCY_TERM)
            .map(|a| &a.value)
        {
            Some(AnnotationValue::Collection(items)) => items.as_slice(),
            _ => &[][..],
        };
        let properties: Arc<[PropertyId]> = paths
            .iter()
            .filter_map(|item| match item {
                AnnotationValue::Path(segments) => segments.first(),
                _ => None,
            })
            .filter_map(|name| self.find_property(entity_type, name))
            .filter(|p| !p.is_navigation())
            .map(EdmProperty::id)
            .collect();

        tracing::debug!(
            source = nav_source.name(),
            count = properties.len(),
            "concurrency properties computed"
        );
        cache.0.insert(source, Arc::clone(&properties));
        Ok(properties)
    }
}

//! Immutable EDM model: schema types, properties, navigation sources and operations.
//!
//! Elements are addressed by small copyable ids that are only meaningful for the
//! model that issued them. The model itself is read-only after [`EdmModelBuilder::build`];
//! the only mutable part is the [`AnnotationStore`], which is concurrent.

mod builder;
mod property;
mod source;
mod types;
mod vocabulary;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use builder::EdmModelBuilder;
pub use property::{EdmProperty, NavigationDef, PropertyKind};
pub use source::{
    BindingPath, EdmOperation, NavigationBinding, NavigationSource, NavigationSourceKind,
    OperationKind,
};
pub use types::{
    EdmPrimitiveKind, EdmType, EdmTypeRef, ElementId, EnumDef, EnumMember, NavigationSourceId,
    OperationId, PropertyId, SchemaType, SchemaTypeId, SchemaTypeKind, StructuredDef,
};
pub use vocabulary::{AnnotationValue, OPTIMISTIC_CONCURRENCY_TERM, VocabularyAnnotation};

use crate::annotations::AnnotationStore;
use crate::error::{EdmError, EdmResult};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a built model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model-{}", self.0)
    }
}

pub struct EdmModel {
    id: ModelId,
    types: Vec<SchemaType>,
    properties: Vec<EdmProperty>,
    sources: Vec<NavigationSource>,
    operations: Vec<EdmOperation>,
    type_index: HashMap<String, SchemaTypeId>,
    derived: HashMap<SchemaTypeId, Vec<SchemaTypeId>>,
    vocabulary: HashMap<ElementId, Vec<VocabularyAnnotation>>,
    annotations: AnnotationStore,
}

impl fmt::Debug for EdmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdmModel")
            .field("id", &self.id)
            .field("types", &self.types.len())
            .field("properties", &self.properties.len())
            .field("sources", &self.sources.len())
            .field("operations", &self.operations.len())
            .field("annotations", &self.annotations.len())
            .finish_non_exhaustive()
    }
}

impl EdmModel {
    #[must_use]
    pub fn builder() -> EdmModelBuilder {
        EdmModelBuilder::new()
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Per-model annotation store.
    #[must_use]
    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    // --- schema types ---

    #[must_use]
    pub fn schema_types(&self) -> &[SchemaType] {
        &self.types
    }

    #[must_use]
    pub fn schema_type(&self, id: SchemaTypeId) -> Option<&SchemaType> {
        self.types.get(id.index())
    }

    /// Like [`schema_type`](Self::schema_type) but reports a foreign id as an error.
    ///
    /// # Errors
    /// [`EdmError::UnknownElement`] when `id` was not issued by this model.
    pub fn require_type(&self, id: SchemaTypeId) -> EdmResult<&SchemaType> {
        self.schema_type(id)
            .ok_or_else(|| EdmError::unknown("schema type", id))
    }

    /// Lookup by namespace-qualified name, e.g. `Acme.Customer`.
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<&SchemaType> {
        self.type_index
            .get(full_name)
            .and_then(|id| self.schema_type(*id))
    }

    /// The type itself followed by its base types, most derived first.
    pub fn type_and_base_types(&self, id: SchemaTypeId) -> impl Iterator<Item = &SchemaType> {
        std::iter::successors(self.schema_type(id), |ty| {
            ty.base_type().and_then(|base| self.schema_type(base))
        })
    }

    /// Types that name `id` as their direct base, in declaration order.
    #[must_use]
    pub fn direct_derived_types(&self, id: SchemaTypeId) -> &[SchemaTypeId] {
        self.derived.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All transitively derived types, depth-first pre-order.
    #[must_use]
    pub fn all_derived_types(&self, id: SchemaTypeId) -> Vec<SchemaTypeId> {
        let mut out = Vec::new();
        let mut stack: Vec<SchemaTypeId> =
            self.direct_derived_types(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.direct_derived_types(next).iter().rev().copied());
        }
        out
    }

    /// Schema type of a structured type reference; collections resolve to their element.
    #[must_use]
    pub fn structured_type_of(&self, ty: &EdmTypeRef) -> Option<SchemaTypeId> {
        let id = ty.ty.element_type().as_schema()?;
        self.schema_type(id)
            .filter(|schema| schema.is_structured())
            .map(SchemaType::id)
    }

    // --- properties ---

    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<&EdmProperty> {
        self.properties.get(id.index())
    }

    /// # Errors
    /// [`EdmError::UnknownElement`] when `id` was not issued by this model.
    pub fn require_property(&self, id: PropertyId) -> EdmResult<&EdmProperty> {
        self.property(id)
            .ok_or_else(|| EdmError::unknown("property", id))
    }

    /// Properties declared directly on `ty`, in declaration order.
    pub fn declared_properties(&self, ty: SchemaTypeId) -> impl Iterator<Item = &EdmProperty> {
        self.schema_type(ty)
            .and_then(SchemaType::as_structured)
            .map(|def| def.declared.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.property(*id))
    }

    /// Inherited and declared properties, base type's first.
    #[must_use]
    pub fn properties(&self, ty: SchemaTypeId) -> Vec<&EdmProperty> {
        let chain: Vec<SchemaTypeId> = self.type_and_base_types(ty).map(SchemaType::id).collect();
        chain
            .into_iter()
            .rev()
            .flat_map(|id| self.declared_properties(id))
            .collect()
    }

    #[must_use]
    pub fn structural_properties(&self, ty: SchemaTypeId) -> Vec<&EdmProperty> {
        self.properties(ty)
            .into_iter()
            .filter(|p| !p.is_navigation())
            .collect()
    }

    pub fn declared_structural_properties(
        &self,
        ty: SchemaTypeId,
    ) -> impl Iterator<Item = &EdmProperty> {
        self.declared_properties(ty).filter(|p| !p.is_navigation())
    }

    #[must_use]
    pub fn navigation_properties(&self, ty: SchemaTypeId) -> Vec<&EdmProperty> {
        self.properties(ty)
            .into_iter()
            .filter(|p| p.is_navigation())
            .collect()
    }

    /// Property by name, searching the type and then its base types.
    #[must_use]
    pub fn find_property(&self, ty: SchemaTypeId, name: &str) -> Option<&EdmProperty> {
        self.type_and_base_types(ty)
            .find_map(|owner| self.declared_properties(owner.id()).find(|p| p.name() == name))
    }

    /// Key properties; an entity inherits the key of its root type.
    #[must_use]
    pub fn key_properties(&self, ty: SchemaTypeId) -> Vec<&EdmProperty> {
        self.type_and_base_types(ty)
            .filter_map(SchemaType::as_structured)
            .find(|def| !def.key.is_empty())
            .map(|def| def.key.iter().filter_map(|id| self.property(*id)).collect())
            .unwrap_or_default()
    }

    // --- navigation sources ---

    #[must_use]
    pub fn navigation_sources(&self) -> &[NavigationSource] {
        &self.sources
    }

    #[must_use]
    pub fn navigation_source(&self, id: NavigationSourceId) -> Option<&NavigationSource> {
        self.sources.get(id.index())
    }

    /// # Errors
    /// [`EdmError::UnknownElement`] when `id` was not issued by this model.
    pub fn require_navigation_source(
        &self,
        id: NavigationSourceId,
    ) -> EdmResult<&NavigationSource> {
        self.navigation_source(id)
            .ok_or_else(|| EdmError::unknown("navigation source", id))
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn find_navigation_source(&self, name: &str) -> Option<&NavigationSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Resolve a navigation source from a URL identifier.
    ///
    /// An exact match always wins. With `case_insensitive`, a single ASCII
    /// case-insensitive match is accepted.
    ///
    /// # Errors
    /// [`EdmError::AmbiguousNavigationSource`] when several sources differ only by case.
    pub fn resolve_navigation_source(
        &self,
        identifier: &str,
        case_insensitive: bool,
    ) -> EdmResult<Option<&NavigationSource>> {
        if let Some(exact) = self.find_navigation_source(identifier) {
            return Ok(Some(exact));
        }
        if !case_insensitive {
            return Ok(None);
        }
        let matches: Vec<&NavigationSource> = self
            .sources
            .iter()
            .filter(|s| s.name().eq_ignore_ascii_case(identifier))
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => {
                let candidates: Vec<String> = many.iter().map(|s| s.name().to_owned()).collect();
                tracing::warn!(identifier, ?candidates, "ambiguous navigation source");
                Err(EdmError::AmbiguousNavigationSource {
                    identifier: identifier.to_owned(),
                    candidates,
                })
            }
        }
    }

    // --- operations ---

    #[must_use]
    pub fn operations(&self) -> &[EdmOperation] {
        &self.operations
    }

    #[must_use]
    pub fn operation(&self, id: OperationId) -> Option<&EdmOperation> {
        self.operations.get(id.index())
    }

    /// # Errors
    /// [`EdmError::UnknownElement`] when `id` was not issued by this model.
    pub fn require_operation(&self, id: OperationId) -> EdmResult<&EdmOperation> {
        self.operation(id)
            .ok_or_else(|| EdmError::unknown("operation", id))
    }

    /// Resolve operations (overloads included) by full or simple name.
    ///
    /// # Errors
    /// [`EdmError::AmbiguousOperation`] when a case-insensitive lookup matches
    /// operations with different names.
    pub fn resolve_operations(
        &self,
        identifier: &str,
        case_insensitive: bool,
    ) -> EdmResult<Vec<&EdmOperation>> {
        let exact: Vec<&EdmOperation> = self
            .operations
            .iter()
            .filter(|op| op.name() == identifier || op.full_name() == identifier)
            .collect();
        if !exact.is_empty() || !case_insensitive {
            return Ok(exact);
        }

        let matches: Vec<&EdmOperation> = self
            .operations
            .iter()
            .filter(|op| {
                op.name().eq_ignore_ascii_case(identifier)
                    || op.full_name().eq_ignore_ascii_case(identifier)
            })
            .collect();
        let mut seen = HashSet::new();
        let names: Vec<String> = matches
            .iter()
            .map(|op| op.full_name())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        if names.len() > 1 {
            tracing::warn!(identifier, candidates = ?names, "ambiguous operation");
            return Err(EdmError::AmbiguousOperation {
                identifier: identifier.to_owned(),
                candidates: names,
            });
        }
        Ok(matches)
    }

    // --- vocabulary ---

    #[must_use]
    pub fn vocabulary_annotations(&self, target: impl Into<ElementId>) -> &[VocabularyAnnotation] {
        self.vocabulary
            .get(&target.into())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn find_vocabulary_annotation(
        &self,
        target: impl Into<ElementId>,
        term: &str,
    ) -> Option<&VocabularyAnnotation> {
        self.vocabulary_annotations(target)
            .iter()
            .find(|a| a.term == term)
    }
}

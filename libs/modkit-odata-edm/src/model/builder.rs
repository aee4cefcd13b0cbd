use std::any::Any;
use std::collections::{HashMap, HashSet};

use super::property::{EdmProperty, NavigationDef, PropertyKind};
use super::source::{
    BindingPath, EdmOperation, NavigationBinding, NavigationSource, NavigationSourceKind,
    OperationKind,
};
use super::types::{
    EdmPrimitiveKind, EdmTypeRef, ElementId, EnumDef, EnumMember, NavigationSourceId, OperationId,
    PropertyId, SchemaType, SchemaTypeId, SchemaTypeKind, StructuredDef,
};
use super::vocabulary::VocabularyAnnotation;
use super::{EdmModel, ModelId};
use crate::annotations::{AnnotationStore, NativeTypeAnnotation};
use crate::error::{EdmError, EdmResult};
use crate::native::NativeType;
use crate::query::{ModelBoundQuerySettings, QueryableRestrictions};

/// Collects schema elements and configuration annotations, then validates them
/// into an immutable [`EdmModel`].
///
/// Definition mistakes (unknown ids, bad bindings, inheritance cycles) are collected
/// and reported together by [`build`](Self::build).
#[derive(Default)]
pub struct EdmModelBuilder {
    types: Vec<SchemaType>,
    properties: Vec<EdmProperty>,
    sources: Vec<NavigationSource>,
    operations: Vec<EdmOperation>,
    vocabulary: HashMap<ElementId, Vec<VocabularyAnnotation>>,
    query_settings: HashMap<ElementId, ModelBoundQuerySettings>,
    annotations: AnnotationStore,
    problems: Vec<String>,
}

impl EdmModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_type(&mut self, namespace: &str, name: &str, kind: SchemaTypeKind) -> SchemaTypeId {
        let id = SchemaTypeId(index_u32(self.types.len()));
        self.types.push(SchemaType {
            id,
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            kind,
        });
        id
    }

    pub fn entity_type(&mut self, namespace: &str, name: &str) -> SchemaTypeId {
        self.add_type(
            namespace,
            name,
            SchemaTypeKind::Entity(StructuredDef::default()),
        )
    }

    pub fn complex_type(&mut self, namespace: &str, name: &str) -> SchemaTypeId {
        self.add_type(
            namespace,
            name,
            SchemaTypeKind::Complex(StructuredDef::default()),
        )
    }

    /// Enum type backed by `Edm.Int32`.
    pub fn enum_type(
        &mut self,
        namespace: &str,
        name: &str,
        members: &[(&str, i64)],
    ) -> SchemaTypeId {
        let members = members
            .iter()
            .map(|(name, value)| EnumMember {
                name: (*name).to_owned(),
                value: *value,
            })
            .collect();
        self.add_type(
            namespace,
            name,
            SchemaTypeKind::Enum(EnumDef {
                underlying: EdmPrimitiveKind::Int32,
                is_flags: false,
                members,
            }),
        )
    }

    fn structured_mut(&mut self, ty: SchemaTypeId) -> Option<&mut StructuredDef> {
        if !self
            .types
            .get(ty.index())
            .is_some_and(SchemaType::is_structured)
        {
            self.problems
                .push(format!("type {ty} is not a structured type of this model"));
            return None;
        }
        match self.types.get_mut(ty.index()).map(|t| &mut t.kind) {
            Some(SchemaTypeKind::Entity(def) | SchemaTypeKind::Complex(def)) => Some(def),
            _ => None,
        }
    }

    /// Declare `base` as the base type of `derived`. Both must be of the same kind.
    pub fn derive_from(&mut self, derived: SchemaTypeId, base: SchemaTypeId) -> &mut Self {
        let same_kind = match (self.types.get(derived.index()), self.types.get(base.index())) {
            (Some(d), Some(b)) => {
                std::mem::discriminant(&d.kind) == std::mem::discriminant(&b.kind)
                    && d.is_structured()
            }
            _ => false,
        };
        if !same_kind {
            self.problems
                .push(format!("type {derived} cannot derive from {base}"));
            return self;
        }
        if let Some(def) = self.structured_mut(derived) {
            def.base = Some(base);
        }
        self
    }

    pub fn set_abstract(&mut self, ty: SchemaTypeId) -> &mut Self {
        if let Some(def) = self.structured_mut(ty) {
            def.is_abstract = true;
        }
        self
    }

    pub fn set_open(&mut self, ty: SchemaTypeId) -> &mut Self {
        if let Some(def) = self.structured_mut(ty) {
            def.is_open = true;
        }
        self
    }

    fn add_property(&mut self, ty: SchemaTypeId, name: &str, kind: PropertyKind) -> PropertyId {
        let id = PropertyId(index_u32(self.properties.len()));
        self.properties.push(EdmProperty {
            id,
            declaring_type: ty,
            name: name.to_owned(),
            kind,
        });
        if let Some(def) = self.structured_mut(ty) {
            def.declared.push(id);
        }
        id
    }

    pub fn structural_property(
        &mut self,
        ty: SchemaTypeId,
        name: &str,
        ty_ref: EdmTypeRef,
    ) -> PropertyId {
        self.add_property(ty, name, PropertyKind::Structural(ty_ref))
    }

    pub fn navigation_property(
        &mut self,
        ty: SchemaTypeId,
        name: &str,
        navigation: NavigationDef,
    ) -> PropertyId {
        self.add_property(ty, name, PropertyKind::Navigation(navigation))
    }

    /// Append `property` to the key of entity type `ty`.
    pub fn add_key(&mut self, ty: SchemaTypeId, property: PropertyId) -> &mut Self {
        let is_entity = self.types.get(ty.index()).is_some_and(SchemaType::is_entity);
        if !is_entity {
            self.problems
                .push(format!("key declared on non-entity type {ty}"));
            return self;
        }
        if let Some(def) = self.structured_mut(ty) {
            def.key.push(property);
        }
        self
    }

    fn add_source(
        &mut self,
        name: &str,
        kind: NavigationSourceKind,
        entity_type: SchemaTypeId,
    ) -> NavigationSourceId {
        let id = NavigationSourceId(index_u32(self.sources.len()));
        self.sources.push(NavigationSource {
            id,
            name: name.to_owned(),
            kind,
            entity_type,
            bindings: Vec::new(),
        });
        id
    }

    pub fn entity_set(&mut self, name: &str, entity_type: SchemaTypeId) -> NavigationSourceId {
        self.add_source(name, NavigationSourceKind::EntitySet, entity_type)
    }

    pub fn singleton(&mut self, name: &str, entity_type: SchemaTypeId) -> NavigationSourceId {
        self.add_source(name, NavigationSourceKind::Singleton, entity_type)
    }

    /// Bind `navigation_property` reached through `path` (e.g. `Address/Orders`) on
    /// `source` to the navigation source named `target`.
    pub fn bind(
        &mut self,
        source: NavigationSourceId,
        navigation_property: PropertyId,
        path: &str,
        target: &str,
    ) -> &mut Self {
        let Some(parsed) = BindingPath::parse(path) else {
            self.problems.push(format!("invalid binding path '{path}'"));
            return self;
        };
        match self.sources.get_mut(source.index()) {
            Some(src) => src.bindings.push(NavigationBinding {
                navigation_property,
                path: parsed,
                target: target.to_owned(),
            }),
            None => self
                .problems
                .push(format!("binding on unknown navigation source {source}")),
        }
        self
    }

    fn add_operation(
        &mut self,
        namespace: &str,
        name: &str,
        kind: OperationKind,
        binding: Option<EdmTypeRef>,
        parameters: &[&str],
    ) -> OperationId {
        let id = OperationId(index_u32(self.operations.len()));
        self.operations.push(EdmOperation {
            id,
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            kind,
            binding,
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
        });
        id
    }

    /// Action; `binding` is the type of the binding parameter for bound actions.
    pub fn action(
        &mut self,
        namespace: &str,
        name: &str,
        binding: Option<EdmTypeRef>,
        parameters: &[&str],
    ) -> OperationId {
        self.add_operation(namespace, name, OperationKind::Action, binding, parameters)
    }

    pub fn function(
        &mut self,
        namespace: &str,
        name: &str,
        binding: Option<EdmTypeRef>,
        parameters: &[&str],
    ) -> OperationId {
        self.add_operation(namespace, name, OperationKind::Function, binding, parameters)
    }

    pub fn vocabulary_annotation(
        &mut self,
        target: impl Into<ElementId>,
        annotation: VocabularyAnnotation,
    ) -> &mut Self {
        self.vocabulary
            .entry(target.into())
            .or_default()
            .push(annotation);
        self
    }

    /// Attach an arbitrary typed annotation, visible through [`EdmModel::annotations`].
    pub fn annotate<T: Any + Send + Sync>(
        &mut self,
        element: impl Into<ElementId>,
        value: T,
    ) -> &mut Self {
        self.annotations.set(element, value);
        self
    }

    /// Explicit native type for a schema type.
    pub fn native_type(&mut self, ty: SchemaTypeId, native: NativeType) -> &mut Self {
        self.annotate(ty, NativeTypeAnnotation(native))
    }

    /// Model-bound query settings of a type or property, created on first access.
    pub fn query_settings(
        &mut self,
        element: impl Into<ElementId>,
    ) -> &mut ModelBoundQuerySettings {
        self.query_settings.entry(element.into()).or_default()
    }

    pub fn restrictions(
        &mut self,
        property: PropertyId,
        restrictions: QueryableRestrictions,
    ) -> &mut Self {
        self.annotate(property, restrictions)
    }

    /// Validate and freeze the model.
    ///
    /// # Errors
    /// [`EdmError::InvalidModel`] listing every problem found.
    pub fn build(self) -> EdmResult<EdmModel> {
        let mut problems = self.problems;

        let mut type_index = HashMap::with_capacity(self.types.len());
        let mut derived: HashMap<SchemaTypeId, Vec<SchemaTypeId>> = HashMap::new();
        for ty in &self.types {
            if type_index.insert(ty.full_name(), ty.id).is_some() {
                problems.push(format!("duplicate type '{}'", ty.full_name()));
            }
            if let Some(base) = ty.base_type() {
                derived.entry(base).or_default().push(ty.id);
            }
        }

        for ty in &self.types {
            let mut seen = HashSet::from([ty.id]);
            let mut cursor = ty.base_type();
            while let Some(base) = cursor {
                if !seen.insert(base) {
                    problems.push(format!("inheritance cycle through '{}'", ty.full_name()));
                    break;
                }
                cursor = self.types.get(base.index()).and_then(SchemaType::base_type);
            }
        }

        for prop in &self.properties {
            if let PropertyKind::Navigation(nav) = &prop.kind
                && !self.types.get(nav.target.index()).is_some_and(SchemaType::is_entity)
            {
                problems.push(format!(
                    "navigation property '{}' must target an entity type",
                    prop.name
                ));
            }
        }

        let mut source_names: HashSet<&str> = HashSet::new();
        for source in &self.sources {
            if !source_names.insert(source.name.as_str()) {
                problems.push(format!("duplicate navigation source '{}'", source.name));
            }
            if !self
                .types
                .get(source.entity_type.index())
                .is_some_and(SchemaType::is_entity)
            {
                problems.push(format!(
                    "navigation source '{}' must be typed by an entity type",
                    source.name
                ));
            }
            for binding in &source.bindings {
                let valid = self
                    .properties
                    .get(binding.navigation_property.index())
                    .is_some_and(|p| p.is_navigation() && p.name == binding.path.property_name());
                if !valid {
                    problems.push(format!(
                        "binding path '{}' on '{}' does not end with its navigation property",
                        binding.path, source.name
                    ));
                }
            }
        }

        drop(source_names);

        if !problems.is_empty() {
            return Err(EdmError::invalid_model(problems.join("; ")));
        }

        let model = EdmModel {
            id: ModelId::next(),
            types: self.types,
            properties: self.properties,
            sources: self.sources,
            operations: self.operations,
            type_index,
            derived,
            vocabulary: self.vocabulary,
            annotations: self.annotations,
        };
        for (element, settings) in self.query_settings {
            model.set_query_settings(element, settings);
        }
        tracing::debug!(
            model = %model.id,
            types = model.types.len(),
            sources = model.sources.len(),
            "EDM model built"
        );
        Ok(model)
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

//! Native ⇄ EDM type mapping.
//!
//! A [`TypeMapper`] owns an immutable [`PrimitiveTypeMap`] and a
//! [`NativeTypeResolver`]. Primitive lookups are model independent; structured
//! and collection lookups are resolved against an [`EdmModel`] and memoized in a
//! [`TypeCache`] scoped to that (model, mapper) pair.

mod cache;
mod primitives;
mod resolver;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use cache::{NativePair, TypeCache};
pub use primitives::{PrimitiveMapping, PrimitiveTypeMap, PrimitiveTypeMapBuilder};
pub use resolver::{
    NativeTypeRegistration, NativeTypeResolver, RegisteredTypeResolver, StaticTypeResolver,
};

use crate::error::{EdmError, EdmResult};
use crate::model::{EdmModel, EdmPrimitiveKind, EdmType, EdmTypeRef, SchemaType, SchemaTypeId};
use crate::native::{NativeKind, NativeType};

static NEXT_MAPPER_ID: AtomicU64 = AtomicU64::new(1);

/// Resolves native types against EDM models.
///
/// Create one mapper per service at startup and share it. Each mapper owns a
/// cache on every model it touches, and that cache lives as long as the model.
pub struct TypeMapper {
    id: u64,
    primitives: PrimitiveTypeMap,
    resolver: Arc<dyn NativeTypeResolver>,
}

impl fmt::Debug for TypeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMapper")
            .field("id", &self.id)
            .field("primitives", &self.primitives.len())
            .finish_non_exhaustive()
    }
}

impl Default for TypeMapper {
    /// Default primitive table; reverse lookups scan registered native types.
    fn default() -> Self {
        Self::new(PrimitiveTypeMap::default(), Arc::new(RegisteredTypeResolver))
    }
}

impl TypeMapper {
    #[must_use]
    pub fn new(primitives: PrimitiveTypeMap, resolver: Arc<dyn NativeTypeResolver>) -> Self {
        Self {
            id: NEXT_MAPPER_ID.fetch_add(1, Ordering::Relaxed),
            primitives,
            resolver,
        }
    }

    /// Default primitive table with a custom resolver.
    #[must_use]
    pub fn with_resolver(resolver: Arc<dyn NativeTypeResolver>) -> Self {
        Self::new(PrimitiveTypeMap::default(), resolver)
    }

    #[must_use]
    pub fn primitives(&self) -> &PrimitiveTypeMap {
        &self.primitives
    }

    /// Resolution cache of this mapper for `model`.
    #[must_use]
    pub fn cache(&self, model: &EdmModel) -> Arc<TypeCache> {
        cache::cache_for(model, self.id)
    }

    /// EDM primitive of a native type, independent of any model.
    #[must_use]
    pub fn primitive_type(&self, native: &NativeType) -> Option<EdmTypeRef> {
        self.primitives.edm_type(native).cloned()
    }

    /// Canonical native type of an EDM primitive.
    #[must_use]
    pub fn native_primitive(&self, kind: EdmPrimitiveKind, nullable: bool) -> Option<NativeType> {
        self.primitives.native_type(kind, nullable).cloned()
    }

    /// EDM type reference of `native` in `model`; `None` when unmapped.
    ///
    /// # Errors
    /// [`EdmError::AmbiguousSchemaType`] when `native` is annotated on several schema types.
    pub fn edm_type_ref(
        &self,
        model: &EdmModel,
        native: &NativeType,
    ) -> EdmResult<Option<EdmTypeRef>> {
        if let Some(primitive) = self.primitives.edm_type(native) {
            return Ok(Some(primitive.clone()));
        }
        self.cache(model).get_or_compute_edm(native, || {
            Ok(self
                .resolve_edm_type(model, native, true)?
                .map(|ty| EdmTypeRef::new(ty, native.is_nullable())))
        })
    }

    /// # Errors
    /// See [`edm_type_ref`](Self::edm_type_ref).
    pub fn edm_type(&self, model: &EdmModel, native: &NativeType) -> EdmResult<Option<EdmType>> {
        Ok(self.edm_type_ref(model, native)?.map(|r| r.ty))
    }

    fn resolve_edm_type(
        &self,
        model: &EdmModel,
        native: &NativeType,
        test_collections: bool,
    ) -> EdmResult<Option<EdmType>> {
        if let Some(primitive) = self.primitives.edm_type(native) {
            return Ok(Some(primitive.ty.clone()));
        }

        if test_collections && let Some(element) = collection_element(native) {
            let Some(element_ty) = self.resolve_edm_type(model, &element, false)? else {
                return Ok(None);
            };
            return Ok(Some(EdmType::collection(EdmTypeRef::new(
                element_ty,
                element.is_nullable(),
            ))));
        }

        // Nullable enums and value structs resolve like their underlying type.
        let native = native.underlying_or_self();

        let schema = match annotated_schema_type(model, native)? {
            Some(id) => Some(id),
            None => model.find_type(&native.edm_full_name()).map(SchemaType::id),
        };
        if let Some(id) = schema {
            return Ok(Some(EdmType::Schema(id)));
        }
        match native.base_type() {
            Some(base) => self.resolve_edm_type(model, base, test_collections),
            None => Ok(None),
        }
    }

    /// Native type of an EDM type reference in `model`; `None` when unmapped.
    ///
    /// # Errors
    /// - [`EdmError::UnknownElement`] when the reference names a type of another model;
    /// - [`EdmError::AmbiguousNativeType`] when several loaded native types match.
    pub fn native_type(
        &self,
        model: &EdmModel,
        edm: &EdmTypeRef,
    ) -> EdmResult<Option<NativeType>> {
        self.native_type_of(model, &edm.ty, edm.nullable)
    }

    /// Native type of `edm` with the requested nullability.
    ///
    /// # Errors
    /// See [`native_type`](Self::native_type).
    pub fn native_type_of(
        &self,
        model: &EdmModel,
        edm: &EdmType,
        nullable: bool,
    ) -> EdmResult<Option<NativeType>> {
        match edm {
            EdmType::Primitive(kind) => Ok(self.native_primitive(*kind, nullable)),
            EdmType::Collection(element) => Ok(self
                .native_type(model, element)?
                .map(NativeType::enumerable)),
            EdmType::Schema(id) => {
                let schema = model.require_type(*id)?;
                self.cache(model)
                    .get_or_compute_native(edm, nullable, || self.native_pair(model, schema))
            }
        }
    }

    fn native_pair(&self, model: &EdmModel, schema: &SchemaType) -> EdmResult<NativePair> {
        let native = match model.native_type_annotation(schema.id()) {
            Some(native) => Some(native),
            None => self.scan_loaded_types(schema)?,
        };
        Ok(match native {
            None => NativePair::default(),
            Some(native) if native.is_enum() => NativePair {
                nullable: Some(NativeType::nullable(native.clone())),
                non_nullable: Some(native),
            },
            Some(native) => NativePair::both(native),
        })
    }

    fn scan_loaded_types(&self, schema: &SchemaType) -> EdmResult<Option<NativeType>> {
        let full_name = schema.full_name();
        let mut seen = HashSet::new();
        let mut matches: Vec<NativeType> = self
            .resolver
            .loaded_types()
            .into_iter()
            .filter(|ty| ty.is_public() && ty.edm_full_name() == full_name)
            .filter(|ty| seen.insert(ty.clone()))
            .collect();

        if matches.len() > 1 {
            let candidates: Vec<String> = matches.iter().map(NativeType::full_name).collect();
            tracing::warn!(edm_type = %full_name, ?candidates, "ambiguous native type");
            return Err(EdmError::AmbiguousNativeType {
                edm_type: full_name,
                candidates,
            });
        }
        Ok(matches.pop())
    }
}

/// Element type of a delta set or (async) enumerable; projections are unwrapped.
fn collection_element(native: &NativeType) -> Option<NativeType> {
    match native.kind() {
        NativeKind::DeltaSet(element) => Some(element.clone()),
        NativeKind::Enumerable(element) | NativeKind::AsyncEnumerable(element) => {
            if let NativeKind::Projection(entity) = element.kind() {
                Some(entity.clone())
            } else {
                Some(element.clone())
            }
        }
        _ => None,
    }
}

fn annotated_schema_type(
    model: &EdmModel,
    native: &NativeType,
) -> EdmResult<Option<SchemaTypeId>> {
    let matches: Vec<&SchemaType> = model
        .schema_types()
        .iter()
        .filter(|ty| model.native_type_annotation(ty.id()).as_ref() == Some(native))
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single.id())),
        many => {
            let candidates: Vec<String> = many.iter().map(|ty| ty.full_name()).collect();
            tracing::warn!(native = %native, ?candidates, "native type annotated on several types");
            Err(EdmError::AmbiguousSchemaType {
                native: native.full_name(),
                candidates,
            })
        }
    }
}

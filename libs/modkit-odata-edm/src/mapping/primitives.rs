//! Primitive native ⇄ EDM registry.
//!
//! Built once through [`PrimitiveTypeMapBuilder`] and immutable afterwards.
//! Standard entries are bidirectional; non-standard entries only map native
//! types to their nearest EDM primitive and never appear in reverse lookups, so
//! every EDM primitive keeps a single canonical native representation.

use std::collections::HashMap;

use super::cache::NativePair;
use crate::model::{EdmPrimitiveKind, EdmTypeRef};
use crate::native::{NativeScalar, NativeType, SpatialShape};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveMapping {
    pub native: NativeType,
    pub edm: EdmPrimitiveKind,
    /// Participates in reverse (EDM → native) resolution.
    pub standard: bool,
}

/// Ordered registration of primitive mappings. Later entries override earlier
/// ones for the same native type.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveTypeMapBuilder {
    entries: Vec<PrimitiveMapping>,
}

impl PrimitiveTypeMapBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard, spatial and non-standard mappings, in that order.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .standard_mappings()
            .spatial_mappings()
            .non_standard_mappings()
    }

    #[must_use]
    pub fn standard_mappings(self) -> Self {
        use EdmPrimitiveKind as E;
        use NativeScalar as N;

        [
            (N::String, E::String),
            (N::Bool, E::Boolean),
            (N::U8, E::Byte),
            (N::Decimal, E::Decimal),
            (N::F64, E::Double),
            (N::Uuid, E::Guid),
            (N::I16, E::Int16),
            (N::I32, E::Int32),
            (N::I64, E::Int64),
            (N::I8, E::SByte),
            (N::F32, E::Single),
            (N::Bytes, E::Binary),
            (N::Stream, E::Stream),
            (N::DateTimeOffset, E::DateTimeOffset),
            (N::Duration, E::Duration),
            (N::Date, E::Date),
            (N::TimeOfDay, E::TimeOfDay),
        ]
        .into_iter()
        .fold(self, |builder, (native, edm)| builder.standard(native, edm))
    }

    #[must_use]
    pub fn spatial_mappings(self) -> Self {
        SpatialShape::ALL.into_iter().fold(self, |builder, shape| {
            builder
                .standard(
                    NativeScalar::Geography(shape),
                    EdmPrimitiveKind::Geography(shape),
                )
                .standard(
                    NativeScalar::Geometry(shape),
                    EdmPrimitiveKind::Geometry(shape),
                )
        })
    }

    #[must_use]
    pub fn non_standard_mappings(self) -> Self {
        use EdmPrimitiveKind as E;
        use NativeScalar as N;

        [
            (N::U16, E::Int32),
            (N::U32, E::Int64),
            (N::U64, E::Int64),
            (N::Char, E::String),
            (N::CharArray, E::String),
            (N::XmlElement, E::String),
            (N::DateTime, E::DateTimeOffset),
            (N::DateOnly, E::Date),
            (N::TimeOnly, E::TimeOfDay),
        ]
        .into_iter()
        .fold(self, |builder, (native, edm)| builder.non_standard(native, edm))
    }

    /// Bidirectional mapping. A non-nullable value type also registers its
    /// nullable variant, nullable first.
    #[must_use]
    pub fn standard(mut self, native: impl Into<NativeType>, edm: EdmPrimitiveKind) -> Self {
        let native = native.into();
        let nullable = NativeType::nullable(native.clone());
        if nullable != native {
            self.push(nullable, edm, true);
        }
        self.push(native, edm, true);
        self
    }

    /// Native → EDM only.
    #[must_use]
    pub fn non_standard(mut self, native: impl Into<NativeType>, edm: EdmPrimitiveKind) -> Self {
        let native = native.into();
        let nullable = NativeType::nullable(native.clone());
        if nullable != native {
            self.push(nullable, edm, false);
        }
        self.push(native, edm, false);
        self
    }

    fn push(&mut self, native: NativeType, edm: EdmPrimitiveKind, standard: bool) {
        self.entries.push(PrimitiveMapping {
            native,
            edm,
            standard,
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[PrimitiveMapping] {
        &self.entries
    }

    #[must_use]
    pub fn build(self) -> PrimitiveTypeMap {
        let mut forward = HashMap::with_capacity(self.entries.len());
        let mut reverse: HashMap<EdmPrimitiveKind, NativePair> = HashMap::new();

        for entry in self.entries {
            if entry.standard {
                let slot = reverse.entry(entry.edm).or_default();
                let is_nullable_variant = entry.native.underlying_or_self() != &entry.native;
                if !entry.native.is_value_type() {
                    *slot = NativePair::both(entry.native.clone());
                } else if is_nullable_variant {
                    slot.nullable = Some(entry.native.clone());
                } else {
                    slot.non_nullable = Some(entry.native.clone());
                }
            }
            let nullable = entry.native.is_nullable();
            forward.insert(entry.native, EdmTypeRef::primitive(entry.edm, nullable));
        }

        PrimitiveTypeMap { forward, reverse }
    }
}

/// Immutable primitive registry.
#[derive(Clone, Debug)]
pub struct PrimitiveTypeMap {
    forward: HashMap<NativeType, EdmTypeRef>,
    reverse: HashMap<EdmPrimitiveKind, NativePair>,
}

impl Default for PrimitiveTypeMap {
    fn default() -> Self {
        PrimitiveTypeMapBuilder::with_defaults().build()
    }
}

impl PrimitiveTypeMap {
    /// EDM primitive of a native type; `None` when the type is not primitive.
    #[must_use]
    pub fn edm_type(&self, native: &NativeType) -> Option<&EdmTypeRef> {
        self.forward.get(native)
    }

    /// Canonical native type of an EDM primitive.
    #[must_use]
    pub fn native_type(&self, kind: EdmPrimitiveKind, nullable: bool) -> Option<&NativeType> {
        self.reverse.get(&kind).and_then(|pair| pair.pick(nullable))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

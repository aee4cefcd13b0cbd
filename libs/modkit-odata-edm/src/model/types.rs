//! EDM type system: primitive kinds, type references and schema types.

use std::fmt;

use crate::native::SpatialShape;

/// Index of a schema type inside its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaTypeId(pub(crate) u32);

/// Index of a structural or navigation property inside its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub(crate) u32);

/// Index of an entity set or singleton inside its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationSourceId(pub(crate) u32);

/// Index of an action or function inside its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u32);

macro_rules! impl_id_display {
    ($($ty:ident),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl $ty {
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

impl_id_display!(SchemaTypeId, PropertyId, NavigationSourceId, OperationId);

/// Any model element an annotation can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementId {
    Model,
    Type(SchemaTypeId),
    Property(PropertyId),
    NavigationSource(NavigationSourceId),
    Operation(OperationId),
}

impl From<SchemaTypeId> for ElementId {
    fn from(id: SchemaTypeId) -> Self {
        ElementId::Type(id)
    }
}

impl From<PropertyId> for ElementId {
    fn from(id: PropertyId) -> Self {
        ElementId::Property(id)
    }
}

impl From<NavigationSourceId> for ElementId {
    fn from(id: NavigationSourceId) -> Self {
        ElementId::NavigationSource(id)
    }
}

impl From<OperationId> for ElementId {
    fn from(id: OperationId) -> Self {
        ElementId::Operation(id)
    }
}

/// EDM primitive type kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdmPrimitiveKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography(SpatialShape),
    Geometry(SpatialShape),
}

impl fmt::Display for EdmPrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdmPrimitiveKind::Binary => "Binary",
            EdmPrimitiveKind::Boolean => "Boolean",
            EdmPrimitiveKind::Byte => "Byte",
            EdmPrimitiveKind::Date => "Date",
            EdmPrimitiveKind::DateTimeOffset => "DateTimeOffset",
            EdmPrimitiveKind::Decimal => "Decimal",
            EdmPrimitiveKind::Double => "Double",
            EdmPrimitiveKind::Duration => "Duration",
            EdmPrimitiveKind::Guid => "Guid",
            EdmPrimitiveKind::Int16 => "Int16",
            EdmPrimitiveKind::Int32 => "Int32",
            EdmPrimitiveKind::Int64 => "Int64",
            EdmPrimitiveKind::SByte => "SByte",
            EdmPrimitiveKind::Single => "Single",
            EdmPrimitiveKind::Stream => "Stream",
            EdmPrimitiveKind::String => "String",
            EdmPrimitiveKind::TimeOfDay => "TimeOfDay",
            EdmPrimitiveKind::Geography(shape) => {
                return write!(f, "Edm.Geography{}", shape.as_str());
            }
            EdmPrimitiveKind::Geometry(shape) => {
                return write!(f, "Edm.Geometry{}", shape.as_str());
            }
        };
        write!(f, "Edm.{name}")
    }
}

/// An EDM type, without nullability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdmType {
    Primitive(EdmPrimitiveKind),
    /// Entity, complex or enum type declared in the model.
    Schema(SchemaTypeId),
    Collection(Box<EdmTypeRef>),
}

impl EdmType {
    #[must_use]
    pub fn collection(element: EdmTypeRef) -> Self {
        EdmType::Collection(Box::new(element))
    }

    #[must_use]
    pub fn as_schema(&self) -> Option<SchemaTypeId> {
        match self {
            EdmType::Schema(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, EdmType::Collection(_))
    }

    /// Element type of a collection, or `self`.
    #[must_use]
    pub fn element_type(&self) -> &EdmType {
        match self {
            EdmType::Collection(element) => &element.ty,
            other => other,
        }
    }
}

/// An EDM type together with its nullability facet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdmTypeRef {
    pub ty: EdmType,
    pub nullable: bool,
}

impl EdmTypeRef {
    #[must_use]
    pub fn new(ty: EdmType, nullable: bool) -> Self {
        Self { ty, nullable }
    }

    #[must_use]
    pub fn primitive(kind: EdmPrimitiveKind, nullable: bool) -> Self {
        Self::new(EdmType::Primitive(kind), nullable)
    }

    #[must_use]
    pub fn schema(id: SchemaTypeId, nullable: bool) -> Self {
        Self::new(EdmType::Schema(id), nullable)
    }

    /// Collection type references are never nullable themselves.
    #[must_use]
    pub fn collection_of(element: EdmTypeRef) -> Self {
        Self::new(EdmType::collection(element), false)
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<EdmPrimitiveKind> {
        match self.ty {
            EdmType::Primitive(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Declared member of an enum type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Definition shared by entity and complex types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuredDef {
    pub base: Option<SchemaTypeId>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub key: Vec<PropertyId>,
    pub declared: Vec<PropertyId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub underlying: EdmPrimitiveKind,
    pub is_flags: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaTypeKind {
    Entity(StructuredDef),
    Complex(StructuredDef),
    Enum(EnumDef),
}

/// A named type declared in the model's schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaType {
    pub(crate) id: SchemaTypeId,
    pub(crate) namespace: String,
    pub(crate) name: String,
    pub(crate) kind: SchemaTypeKind,
}

impl SchemaType {
    #[must_use]
    pub fn id(&self) -> SchemaTypeId {
        self.id
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    #[must_use]
    pub fn kind(&self) -> &SchemaTypeKind {
        &self.kind
    }

    /// Entity or complex definition; `None` for enums.
    #[must_use]
    pub fn as_structured(&self) -> Option<&StructuredDef> {
        match &self.kind {
            SchemaTypeKind::Entity(def) | SchemaTypeKind::Complex(def) => Some(def),
            SchemaTypeKind::Enum(_) => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumDef> {
        match &self.kind {
            SchemaTypeKind::Enum(def) => Some(def),
            SchemaTypeKind::Entity(_) | SchemaTypeKind::Complex(_) => None,
        }
    }

    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self.kind, SchemaTypeKind::Entity(_))
    }

    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.as_structured().is_some()
    }

    #[must_use]
    pub fn base_type(&self) -> Option<SchemaTypeId> {
        self.as_structured().and_then(|def| def.base)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.as_structured().is_some_and(|def| def.is_open)
    }
}

//! Native type descriptors.
//!
//! A [`NativeType`] is the host-side counterpart of an EDM type: a cheap, cloneable
//! handle describing a scalar, an enum, a class/struct with an optional base type, or
//! one of the wrapper shapes the mapper knows how to see through (nullable,
//! enumerable, async enumerable, delta set, projection wrapper).
//!
//! Equality and hashing are structural, so two independently built descriptors of
//! the same type are interchangeable as cache keys.

use std::fmt;
use std::sync::Arc;

/// Shape of a spatial primitive, shared by the geography and geometry families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpatialShape {
    Point,
    LineString,
    Polygon,
    Collection,
    MultiLineString,
    MultiPoint,
    MultiPolygon,
}

impl SpatialShape {
    pub const ALL: [SpatialShape; 7] = [
        SpatialShape::Point,
        SpatialShape::LineString,
        SpatialShape::Polygon,
        SpatialShape::Collection,
        SpatialShape::MultiLineString,
        SpatialShape::MultiPoint,
        SpatialShape::MultiPolygon,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpatialShape::Point => "Point",
            SpatialShape::LineString => "LineString",
            SpatialShape::Polygon => "Polygon",
            SpatialShape::Collection => "Collection",
            SpatialShape::MultiLineString => "MultiLineString",
            SpatialShape::MultiPoint => "MultiPoint",
            SpatialShape::MultiPolygon => "MultiPolygon",
        }
    }
}

/// Well-known scalar native types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeScalar {
    String,
    Bool,
    U8,
    Decimal,
    F64,
    Uuid,
    I16,
    I32,
    I64,
    I8,
    F32,
    /// Binary blob.
    Bytes,
    Stream,
    DateTimeOffset,
    Duration,
    Date,
    TimeOfDay,
    Geography(SpatialShape),
    Geometry(SpatialShape),
    U16,
    U32,
    U64,
    Char,
    CharArray,
    /// Structured text fragment (XML element).
    XmlElement,
    /// Wall-clock date-time without offset.
    DateTime,
    DateOnly,
    TimeOnly,
}

impl NativeScalar {
    /// Value types get a distinct nullable variant; reference types are nullable already.
    #[must_use]
    pub fn is_value_type(self) -> bool {
        !matches!(
            self,
            NativeScalar::String
                | NativeScalar::Bytes
                | NativeScalar::Stream
                | NativeScalar::CharArray
                | NativeScalar::XmlElement
                | NativeScalar::Geography(_)
                | NativeScalar::Geometry(_)
        )
    }
}

impl fmt::Display for NativeScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeScalar::String => "String",
            NativeScalar::Bool => "bool",
            NativeScalar::U8 => "u8",
            NativeScalar::Decimal => "Decimal",
            NativeScalar::F64 => "f64",
            NativeScalar::Uuid => "Uuid",
            NativeScalar::I16 => "i16",
            NativeScalar::I32 => "i32",
            NativeScalar::I64 => "i64",
            NativeScalar::I8 => "i8",
            NativeScalar::F32 => "f32",
            NativeScalar::Bytes => "Bytes",
            NativeScalar::Stream => "Stream",
            NativeScalar::DateTimeOffset => "DateTimeOffset",
            NativeScalar::Duration => "Duration",
            NativeScalar::Date => "Date",
            NativeScalar::TimeOfDay => "TimeOfDay",
            NativeScalar::Geography(shape) => return write!(f, "Geography{}", shape.as_str()),
            NativeScalar::Geometry(shape) => return write!(f, "Geometry{}", shape.as_str()),
            NativeScalar::U16 => "u16",
            NativeScalar::U32 => "u32",
            NativeScalar::U64 => "u64",
            NativeScalar::Char => "char",
            NativeScalar::CharArray => "CharArray",
            NativeScalar::XmlElement => "XmlElement",
            NativeScalar::DateTime => "DateTime",
            NativeScalar::DateOnly => "DateOnly",
            NativeScalar::TimeOnly => "TimeOnly",
        };
        f.write_str(name)
    }
}

/// What a native type is, including the wrappers the mapper unwraps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Scalar(NativeScalar),
    /// Nullable wrapper around a value type.
    Nullable(NativeType),
    Enum,
    /// Reference type with single inheritance.
    Class { base: Option<NativeType> },
    /// User-defined value type.
    Struct,
    Enumerable(NativeType),
    AsyncEnumerable(NativeType),
    /// Set of changed entities.
    DeltaSet(NativeType),
    /// `$select`/`$expand` projection wrapper around an entity.
    Projection(NativeType),
}

#[derive(PartialEq, Eq, Hash)]
struct Descriptor {
    namespace: Option<String>,
    name: String,
    generic_args: Vec<NativeType>,
    kind: NativeKind,
    public: bool,
}

/// Handle to a native type descriptor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NativeType(Arc<Descriptor>);

impl NativeType {
    fn wrapper(name: &str, inner: NativeType, kind: fn(NativeType) -> NativeKind) -> Self {
        Self(Arc::new(Descriptor {
            namespace: None,
            name: name.to_owned(),
            generic_args: vec![inner.clone()],
            kind: kind(inner),
            public: true,
        }))
    }

    #[must_use]
    pub fn scalar(scalar: NativeScalar) -> Self {
        Self(Arc::new(Descriptor {
            namespace: None,
            name: scalar.to_string(),
            generic_args: Vec::new(),
            kind: NativeKind::Scalar(scalar),
            public: true,
        }))
    }

    /// Nullable variant of a value type. Reference types and already-nullable types
    /// are returned unchanged.
    #[must_use]
    pub fn nullable(inner: NativeType) -> Self {
        if !inner.is_value_type() || matches!(inner.kind(), NativeKind::Nullable(_)) {
            return inner;
        }
        Self::wrapper("Option", inner, NativeKind::Nullable)
    }

    #[must_use]
    pub fn enumerable(element: NativeType) -> Self {
        Self::wrapper("Vec", element, NativeKind::Enumerable)
    }

    #[must_use]
    pub fn async_enumerable(element: NativeType) -> Self {
        Self::wrapper("AsyncStream", element, NativeKind::AsyncEnumerable)
    }

    #[must_use]
    pub fn delta_set(element: NativeType) -> Self {
        Self::wrapper("DeltaSet", element, NativeKind::DeltaSet)
    }

    #[must_use]
    pub fn projection(entity: NativeType) -> Self {
        Self::wrapper("SelectExpandWrapper", entity, NativeKind::Projection)
    }

    /// Public enum type.
    #[must_use]
    pub fn enumeration(namespace: &str, name: &str) -> Self {
        NativeTypeBuilder::new(namespace, name, BuilderKind::Enum).build()
    }

    /// Start describing a reference type.
    #[must_use]
    pub fn class(namespace: &str, name: &str) -> NativeTypeBuilder {
        NativeTypeBuilder::new(namespace, name, BuilderKind::Class)
    }

    /// Start describing a user-defined value type.
    #[must_use]
    pub fn value_struct(namespace: &str, name: &str) -> NativeTypeBuilder {
        NativeTypeBuilder::new(namespace, name, BuilderKind::Struct)
    }

    #[must_use]
    pub fn kind(&self) -> &NativeKind {
        &self.0.kind
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[must_use]
    pub fn generic_args(&self) -> &[NativeType] {
        &self.0.generic_args
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.0.public
    }

    #[must_use]
    pub fn base_type(&self) -> Option<&NativeType> {
        match &self.0.kind {
            NativeKind::Class { base } => base.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<NativeScalar> {
        match self.0.kind {
            NativeKind::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.0.kind, NativeKind::Enum)
    }

    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match &self.0.kind {
            NativeKind::Scalar(s) => s.is_value_type(),
            NativeKind::Nullable(_) | NativeKind::Enum | NativeKind::Struct => true,
            NativeKind::Class { .. }
            | NativeKind::Enumerable(_)
            | NativeKind::AsyncEnumerable(_)
            | NativeKind::DeltaSet(_)
            | NativeKind::Projection(_) => false,
        }
    }

    /// Whether a value of this type may be null.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self.0.kind, NativeKind::Nullable(_)) || !self.is_value_type()
    }

    /// The wrapped type of a nullable, or `self`.
    #[must_use]
    pub fn underlying_or_self(&self) -> &NativeType {
        match &self.0.kind {
            NativeKind::Nullable(inner) => inner,
            _ => self,
        }
    }

    /// Name used to match EDM schema elements: simple name for non-generic types,
    /// `Name_Of_Arg1_Arg2` (recursively mangled) for generic ones.
    #[must_use]
    pub fn edm_name(&self) -> String {
        if self.0.generic_args.is_empty() {
            return self.0.name.clone();
        }
        let args: Vec<String> = self.0.generic_args.iter().map(Self::edm_name).collect();
        format!("{}_Of_{}", self.0.name, args.join("_"))
    }

    /// Namespace-qualified [`edm_name`](Self::edm_name).
    #[must_use]
    pub fn edm_full_name(&self) -> String {
        match &self.0.namespace {
            Some(ns) => format!("{ns}.{}", self.edm_name()),
            None => self.edm_name(),
        }
    }

    /// Human-readable qualified name, e.g. `Acme.Page<Acme.Customer>`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.0.namespace {
            write!(f, "{ns}.")?;
        }
        f.write_str(&self.0.name)?;
        if !self.0.generic_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.0.generic_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeType({self})")
    }
}

impl From<NativeScalar> for NativeType {
    fn from(scalar: NativeScalar) -> Self {
        Self::scalar(scalar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BuilderKind {
    Enum,
    Class,
    Struct,
}

/// Builder for user-defined native types.
#[derive(Debug)]
#[must_use]
pub struct NativeTypeBuilder {
    namespace: String,
    name: String,
    generic_args: Vec<NativeType>,
    base: Option<NativeType>,
    kind: BuilderKind,
    public: bool,
}

impl NativeTypeBuilder {
    fn new(namespace: &str, name: &str, kind: BuilderKind) -> Self {
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            generic_args: Vec::new(),
            base: None,
            kind,
            public: true,
        }
    }

    /// Base class; ignored for value types.
    pub fn base(mut self, base: NativeType) -> Self {
        self.base = Some(base);
        self
    }

    pub fn generic_arg(mut self, arg: NativeType) -> Self {
        self.generic_args.push(arg);
        self
    }

    /// Mark the type as non-public; resolvers skip such types.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    #[must_use]
    pub fn build(self) -> NativeType {
        let kind = match self.kind {
            BuilderKind::Enum => NativeKind::Enum,
            BuilderKind::Class => NativeKind::Class { base: self.base },
            BuilderKind::Struct => NativeKind::Struct,
        };
        NativeType(Arc::new(Descriptor {
            namespace: (!self.namespace.is_empty()).then_some(self.namespace),
            name: self.name,
            generic_args: self.generic_args,
            kind,
            public: self.public,
        }))
    }
}

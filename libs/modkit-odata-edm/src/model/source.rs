//! Navigation sources (entity sets, singletons) and operations.

use std::fmt;

use super::types::{EdmTypeRef, NavigationSourceId, OperationId, PropertyId, SchemaTypeId};

/// Declared route of a navigation-property binding, e.g. `Address/NS.Vip/Orders`.
///
/// The last segment is always the navigation property name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindingPath(Vec<String>);

impl BindingPath {
    /// Parse a `/`-delimited path. Empty segments are rejected.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path.split('/').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self(segments))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Trailing segment: the navigation property name.
    #[must_use]
    pub fn property_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }
}

impl fmt::Display for BindingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationBinding {
    pub navigation_property: PropertyId,
    pub path: BindingPath,
    /// Name of the target entity set or singleton.
    pub target: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationSourceKind {
    EntitySet,
    Singleton,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationSource {
    pub(crate) id: NavigationSourceId,
    pub(crate) name: String,
    pub(crate) kind: NavigationSourceKind,
    pub(crate) entity_type: SchemaTypeId,
    pub(crate) bindings: Vec<NavigationBinding>,
}

impl NavigationSource {
    #[must_use]
    pub fn id(&self) -> NavigationSourceId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> NavigationSourceKind {
        self.kind
    }

    #[must_use]
    pub fn entity_type(&self) -> SchemaTypeId {
        self.entity_type
    }

    #[must_use]
    pub fn bindings(&self) -> &[NavigationBinding] {
        &self.bindings
    }

    /// Bindings declared for one navigation property, in declaration order.
    pub fn bindings_for(&self, property: PropertyId) -> impl Iterator<Item = &NavigationBinding> {
        self.bindings
            .iter()
            .filter(move |b| b.navigation_property == property)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Action,
    Function,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmOperation {
    pub(crate) id: OperationId,
    pub(crate) namespace: String,
    pub(crate) name: String,
    pub(crate) kind: OperationKind,
    /// Type of the binding parameter for bound operations.
    pub(crate) binding: Option<EdmTypeRef>,
    /// Non-binding parameter names, in declaration order.
    pub(crate) parameters: Vec<String>,
}

impl EdmOperation {
    #[must_use]
    pub fn id(&self) -> OperationId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn binding_type(&self) -> Option<&EdmTypeRef> {
        self.binding.as_ref()
    }

    /// Bound to a collection of entities rather than a single one.
    #[must_use]
    pub fn is_bound_to_collection(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| b.ty.is_collection())
    }

    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_binding_path_parse() {
        let path = BindingPath::parse("Address/Acme.Vip/Orders").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.property_name(), "Orders");
        assert_eq!(path.to_string(), "Address/Acme.Vip/Orders");
    }

    #[test]
    fn test_binding_path_rejects_empty_segments() {
        assert!(BindingPath::parse("").is_none());
        assert!(BindingPath::parse("A//B").is_none());
        assert!(BindingPath::parse("/Orders").is_none());
    }
}

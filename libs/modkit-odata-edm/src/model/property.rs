//! Structural and navigation properties.

use super::types::{EdmTypeRef, PropertyId, SchemaTypeId};

/// Navigation-specific facets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationDef {
    pub target: SchemaTypeId,
    pub is_collection: bool,
    pub nullable: bool,
    /// Contained navigation: the target lives under the declaring entity.
    pub contains_target: bool,
    pub partner: Option<String>,
}

impl NavigationDef {
    /// Single-valued, nullable, non-contained navigation.
    #[must_use]
    pub fn one(target: SchemaTypeId) -> Self {
        Self {
            target,
            is_collection: false,
            nullable: true,
            contains_target: false,
            partner: None,
        }
    }

    /// Collection-valued, non-contained navigation.
    #[must_use]
    pub fn many(target: SchemaTypeId) -> Self {
        Self {
            target,
            is_collection: true,
            nullable: false,
            contains_target: false,
            partner: None,
        }
    }

    #[must_use]
    pub fn contained(mut self) -> Self {
        self.contains_target = true;
        self
    }

    #[must_use]
    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Structural(EdmTypeRef),
    Navigation(NavigationDef),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmProperty {
    pub(crate) id: PropertyId,
    pub(crate) declaring_type: SchemaTypeId,
    pub(crate) name: String,
    pub(crate) kind: PropertyKind,
}

impl EdmProperty {
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    #[must_use]
    pub fn declaring_type(&self) -> SchemaTypeId {
        self.declaring_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    #[must_use]
    pub fn is_navigation(&self) -> bool {
        matches!(self.kind, PropertyKind::Navigation(_))
    }

    #[must_use]
    pub fn as_navigation(&self) -> Option<&NavigationDef> {
        match &self.kind {
            PropertyKind::Navigation(nav) => Some(nav),
            PropertyKind::Structural(_) => None,
        }
    }

    #[must_use]
    pub fn structural_type(&self) -> Option<&EdmTypeRef> {
        match &self.kind {
            PropertyKind::Structural(ty) => Some(ty),
            PropertyKind::Navigation(_) => None,
        }
    }
}

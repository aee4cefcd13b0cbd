//! Properties and navigations included in a response without being requested.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use super::settings::{ModelBoundQuerySettings, SelectExpandType};
use crate::model::{EdmModel, EdmProperty, PropertyId, SchemaTypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelPathSegment {
    TypeCast(SchemaTypeId),
    Property(PropertyId),
}

fn render(model: &EdmModel, segments: &[ModelPathSegment]) -> String {
    let parts: Vec<Cow<'_, str>> = segments
        .iter()
        .map(|segment| match segment {
            ModelPathSegment::TypeCast(ty) => model
                .schema_type(*ty)
                .map_or(Cow::Borrowed("?"), |t| Cow::Owned(t.full_name())),
            ModelPathSegment::Property(prop) => model
                .property(*prop)
                .map_or(Cow::Borrowed("?"), |p| Cow::Borrowed(p.name())),
        })
        .collect();
    parts.join("/")
}

/// A property to select, preceded by a cast when it is declared on a derived type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectModelPath {
    segments: Vec<ModelPathSegment>,
}

impl SelectModelPath {
    #[must_use]
    pub fn segments(&self) -> &[ModelPathSegment] {
        &self.segments
    }

    /// Selected property.
    #[must_use]
    pub fn property(&self) -> Option<PropertyId> {
        match self.segments.last() {
            Some(ModelPathSegment::Property(id)) => Some(*id),
            _ => None,
        }
    }

    /// `Name` or `Ns.Derived/Name`.
    #[must_use]
    pub fn to_path_string(&self, model: &EdmModel) -> String {
        render(model, &self.segments)
    }
}

/// Segment stack from the root type down to an auto-expanded navigation property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpandModelPath {
    segments: Vec<ModelPathSegment>,
}

impl ExpandModelPath {
    #[must_use]
    pub fn segments(&self) -> &[ModelPathSegment] {
        &self.segments
    }

    /// The navigation property the path ends with.
    #[must_use]
    pub fn navigation_property(&self) -> Option<PropertyId> {
        match self.segments.last() {
            Some(ModelPathSegment::Property(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_path_string(&self, model: &EdmModel) -> String {
        render(model, &self.segments)
    }
}

impl fmt::Display for ModelPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeCast(ty) => write!(f, "cast({ty})"),
            Self::Property(prop) => write!(f, "property({prop})"),
        }
    }
}

fn settings_at<'s>(
    model: &EdmModel,
    provided: Option<&'s ModelBoundQuerySettings>,
    path_property: Option<&EdmProperty>,
    ty: SchemaTypeId,
) -> Cow<'s, ModelBoundQuerySettings> {
    provided.map_or_else(
        || Cow::Owned(model.effective_query_settings(path_property, Some(ty), None)),
        Cow::Borrowed,
    )
}

/// Structural properties of `ty` and its derived types marked for automatic
/// selection.
///
/// Only the target level is inspected: complex properties are not descended
/// into. `settings` replaces the model-bound settings when given.
#[must_use]
pub fn auto_select_paths(
    model: &EdmModel,
    ty: SchemaTypeId,
    path_property: Option<&EdmProperty>,
    settings: Option<&ModelBoundQuerySettings>,
) -> Vec<SelectModelPath> {
    let mut paths = Vec::new();

    let base_settings = settings_at(model, settings, path_property, ty);
    for property in model.structural_properties(ty) {
        if base_settings.is_automatic_select(property.name()) {
            paths.push(SelectModelPath {
                segments: vec![ModelPathSegment::Property(property.id())],
            });
        }
    }

    for derived in model.all_derived_types(ty) {
        let derived_settings = settings_at(model, settings, path_property, derived);
        for property in model.declared_structural_properties(derived) {
            if derived_settings.is_automatic_select(property.name()) {
                paths.push(SelectModelPath {
                    segments: vec![
                        ModelPathSegment::TypeCast(derived),
                        ModelPathSegment::Property(property.id()),
                    ],
                });
            }
        }
    }

    debug!(schema_type = %ty, count = paths.len(), "computed auto-select paths");
    paths
}

/// Navigation paths expanded automatically from `ty`.
///
/// Complex properties are walked through; each structured type is visited at
/// most once, so cyclic navigation graphs terminate.
#[must_use]
pub fn auto_expand_paths(
    model: &EdmModel,
    ty: SchemaTypeId,
    path_property: Option<&EdmProperty>,
    is_select_present: bool,
    settings: Option<&ModelBoundQuerySettings>,
) -> Vec<ExpandModelPath> {
    let mut walk = ExpandWalk {
        model,
        is_select_present,
        settings,
        visited: HashSet::new(),
        stack: Vec::new(),
        found: Vec::new(),
    };
    walk.visit(ty, path_property);
    debug!(schema_type = %ty, count = walk.found.len(), "computed auto-expand paths");
    walk.found
}

struct ExpandWalk<'m, 's> {
    model: &'m EdmModel,
    is_select_present: bool,
    settings: Option<&'s ModelBoundQuerySettings>,
    visited: HashSet<SchemaTypeId>,
    stack: Vec<ModelPathSegment>,
    found: Vec<ExpandModelPath>,
}

impl<'m> ExpandWalk<'m, '_> {
    fn visit(&mut self, current: SchemaTypeId, path_property: Option<&'m EdmProperty>) {
        if !self.visited.insert(current) {
            return;
        }

        let model = self.model;
        self.visit_properties(current, model.properties(current), path_property);

        for derived in model.all_derived_types(current) {
            self.stack.push(ModelPathSegment::TypeCast(derived));
            let declared: Vec<&EdmProperty> = model.declared_properties(derived).collect();
            self.visit_properties(derived, declared, path_property);
            self.stack.pop();
        }
    }

    fn visit_properties(
        &mut self,
        owner: SchemaTypeId,
        properties: Vec<&'m EdmProperty>,
        path_property: Option<&'m EdmProperty>,
    ) {
        let model = self.model;
        let settings = settings_at(model, self.settings, path_property, owner);

        for property in properties {
            if property.is_navigation() {
                if self.auto_expands(property, &settings) {
                    self.stack.push(ModelPathSegment::Property(property.id()));
                    self.found.push(ExpandModelPath {
                        segments: self.stack.clone(),
                    });
                    self.stack.pop();
                }
            } else if let Some(complex) = property
                .structural_type()
                .and_then(|ty| model.structured_type_of(ty))
                && self.walkable(property, &settings)
            {
                self.stack.push(ModelPathSegment::Property(property.id()));
                self.visit(complex, Some(property));
                self.stack.pop();
            }
        }
    }

    fn auto_expands(&self, property: &EdmProperty, settings: &ModelBoundQuerySettings) -> bool {
        match self.model.query_restrictions(property.id()) {
            Some(restrictions) if restrictions.auto_expand => {
                restrictions.auto_expands(self.is_select_present)
            }
            _ => settings.is_automatic_expand(property.name()),
        }
    }

    fn walkable(&self, property: &EdmProperty, settings: &ModelBoundQuerySettings) -> bool {
        let restricted = self
            .model
            .query_restrictions(property.id())
            .is_some_and(|r| r.not_expandable);
        let disabled = settings
            .expand_configuration(property.name())
            .is_some_and(|c| c.expand_type == SelectExpandType::Disabled);
        !restricted && !disabled
    }
}

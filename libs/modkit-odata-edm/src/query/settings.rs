//! Model-bound query settings of types and properties.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{EdmModel, EdmProperty, ElementId, SchemaTypeId};

/// Default maximum `$expand` depth of an expandable navigation property.
pub const DEFAULT_MAX_EXPAND_DEPTH: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectExpandType {
    #[default]
    Allowed,
    /// Applied even when the request does not ask for it.
    Automatic,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExpandConfiguration {
    pub expand_type: SelectExpandType,
    /// `0` means unlimited.
    pub max_depth: u32,
}

impl Default for ExpandConfiguration {
    fn default() -> Self {
        Self {
            expand_type: SelectExpandType::Allowed,
            max_depth: DEFAULT_MAX_EXPAND_DEPTH,
        }
    }
}

impl ExpandConfiguration {
    #[must_use]
    pub fn new(expand_type: SelectExpandType, max_depth: u32) -> Self {
        Self {
            expand_type,
            max_depth,
        }
    }
}

/// Query options allowed on a type, or on a property (then overriding the
/// settings of the property's target type).
///
/// Per-property maps are keyed by property name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ModelBoundQuerySettings {
    pub page_size: Option<u32>,
    pub max_top: Option<u32>,
    pub countable: Option<bool>,
    pub filter: HashMap<String, bool>,
    pub default_enable_filter: Option<bool>,
    pub order_by: HashMap<String, bool>,
    pub default_enable_order_by: Option<bool>,
    pub select: HashMap<String, SelectExpandType>,
    pub default_select_type: Option<SelectExpandType>,
    pub expand: HashMap<String, ExpandConfiguration>,
    pub default_expand_type: Option<SelectExpandType>,
    pub default_max_depth: u32,
}

impl Default for ModelBoundQuerySettings {
    fn default() -> Self {
        Self {
            page_size: None,
            max_top: None,
            countable: None,
            filter: HashMap::new(),
            default_enable_filter: None,
            order_by: HashMap::new(),
            default_enable_order_by: None,
            select: HashMap::new(),
            default_select_type: None,
            expand: HashMap::new(),
            default_expand_type: None,
            default_max_depth: DEFAULT_MAX_EXPAND_DEPTH,
        }
    }
}

impl ModelBoundQuerySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_max_top(mut self, max_top: u32) -> Self {
        self.max_top = Some(max_top);
        self
    }

    #[must_use]
    pub fn with_countable(mut self, countable: bool) -> Self {
        self.countable = Some(countable);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, property: &str, enabled: bool) -> Self {
        self.filter.insert(property.to_owned(), enabled);
        self
    }

    #[must_use]
    pub fn with_default_filter(mut self, enabled: bool) -> Self {
        self.default_enable_filter = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, property: &str, enabled: bool) -> Self {
        self.order_by.insert(property.to_owned(), enabled);
        self
    }

    #[must_use]
    pub fn with_default_order_by(mut self, enabled: bool) -> Self {
        self.default_enable_order_by = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_select(mut self, property: &str, select_type: SelectExpandType) -> Self {
        self.select.insert(property.to_owned(), select_type);
        self
    }

    #[must_use]
    pub fn with_default_select(mut self, select_type: SelectExpandType) -> Self {
        self.default_select_type = Some(select_type);
        self
    }

    #[must_use]
    pub fn with_expand(
        mut self,
        property: &str,
        expand_type: SelectExpandType,
        max_depth: u32,
    ) -> Self {
        self.expand.insert(
            property.to_owned(),
            ExpandConfiguration::new(expand_type, max_depth),
        );
        self
    }

    #[must_use]
    pub fn with_default_expand(mut self, expand_type: SelectExpandType, max_depth: u32) -> Self {
        self.default_expand_type = Some(expand_type);
        self.default_max_depth = max_depth;
        self
    }

    /// Explicit entry, else the default flag; unset means not filterable.
    #[must_use]
    pub fn filterable(&self, property: &str) -> bool {
        self.filter
            .get(property)
            .copied()
            .unwrap_or(self.default_enable_filter == Some(true))
    }

    #[must_use]
    pub fn sortable(&self, property: &str) -> bool {
        self.order_by
            .get(property)
            .copied()
            .unwrap_or(self.default_enable_order_by == Some(true))
    }

    /// Explicit entry not disabled, else a default select type that is not disabled.
    #[must_use]
    pub fn selectable(&self, property: &str) -> bool {
        match self.select.get(property) {
            Some(select_type) => *select_type != SelectExpandType::Disabled,
            None => self
                .default_select_type
                .is_some_and(|t| t != SelectExpandType::Disabled),
        }
    }

    #[must_use]
    pub fn is_automatic_select(&self, property: &str) -> bool {
        match self.select.get(property) {
            Some(select_type) => *select_type == SelectExpandType::Automatic,
            None => self.default_select_type == Some(SelectExpandType::Automatic),
        }
    }

    /// Explicit entry, else the default expand type with the default depth.
    #[must_use]
    pub fn expand_configuration(&self, property: &str) -> Option<ExpandConfiguration> {
        self.expand.get(property).copied().or_else(|| {
            self.default_expand_type
                .map(|t| ExpandConfiguration::new(t, self.default_max_depth))
        })
    }

    #[must_use]
    pub fn is_automatic_expand(&self, property: &str) -> bool {
        self.expand_configuration(property)
            .is_some_and(|c| c.expand_type == SelectExpandType::Automatic)
    }

    /// Property-level settings (`self`) over type-level `fallback`.
    ///
    /// Page size, max top and countable fall back field by field. Each option map
    /// falls back together with its default flag, and only when the property
    /// configures neither.
    #[must_use]
    pub fn merged_over(&self, fallback: &Self) -> Self {
        let mut merged = self.clone();
        merged.page_size = merged.page_size.or(fallback.page_size);
        merged.max_top = merged.max_top.or(fallback.max_top);
        merged.countable = merged.countable.or(fallback.countable);

        if merged.filter.is_empty() && merged.default_enable_filter.is_none() {
            merged.filter.clone_from(&fallback.filter);
            merged.default_enable_filter = fallback.default_enable_filter;
        }
        if merged.order_by.is_empty() && merged.default_enable_order_by.is_none() {
            merged.order_by.clone_from(&fallback.order_by);
            merged.default_enable_order_by = fallback.default_enable_order_by;
        }
        if merged.select.is_empty() && merged.default_select_type.is_none() {
            merged.select.clone_from(&fallback.select);
            merged.default_select_type = fallback.default_select_type;
        }
        if merged.expand.is_empty() && merged.default_expand_type.is_none() {
            merged.expand.clone_from(&fallback.expand);
            merged.default_expand_type = fallback.default_expand_type;
            merged.default_max_depth = fallback.default_max_depth;
        }
        merged
    }
}

impl EdmModel {
    /// Settings configured directly on a type or property.
    #[must_use]
    pub fn query_settings(
        &self,
        element: impl Into<ElementId>,
    ) -> Option<Arc<ModelBoundQuerySettings>> {
        self.annotations().get(element)
    }

    pub fn set_query_settings(
        &self,
        element: impl Into<ElementId>,
        settings: ModelBoundQuerySettings,
    ) {
        self.annotations().set(element, settings);
    }

    /// Settings in effect for properties of `path_type` reached through
    /// `path_property`: the property's settings merged over the type's.
    ///
    /// Unconfigured levels contribute empty settings carrying `default_max_top`.
    #[must_use]
    pub fn effective_query_settings(
        &self,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        default_max_top: Option<u32>,
    ) -> ModelBoundQuerySettings {
        let unconfigured = || ModelBoundQuerySettings {
            max_top: default_max_top.filter(|top| *top > 0),
            ..ModelBoundQuerySettings::default()
        };
        let type_settings = path_type
            .and_then(|ty| self.query_settings(ty))
            .map_or_else(unconfigured, |s| (*s).clone());
        match path_property {
            None => type_settings,
            Some(property) => self
                .query_settings(property.id())
                .map_or_else(unconfigured, |s| (*s).clone())
                .merged_over(&type_settings),
        }
    }
}

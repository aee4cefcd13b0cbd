//! Capability decisions for query options on a property.
//!
//! Legacy [`QueryableRestrictions`](super::QueryableRestrictions) always win.
//! Otherwise the property's name is looked up in the settings in effect for
//! its path: the path property's model-bound settings merged over the path
//! type's. Without an explicit path type, a property is judged by its
//! declaring type and a collection by its element type.
//!
//! A query option is enabled for the request when the caller's flag or the
//! matching `DefaultQueryConfig::enable_*` flag is set.

use tracing::trace;

use super::restrictions::QueryableRestrictions;
use super::settings::{ExpandConfiguration, ModelBoundQuerySettings, SelectExpandType};
use crate::config::DefaultQueryConfig;
use crate::model::{EdmModel, EdmProperty, SchemaTypeId};

/// Answers capability questions against one model and one set of request defaults.
#[derive(Clone, Copy, Debug)]
pub struct QueryCapabilities<'a> {
    model: &'a EdmModel,
    defaults: &'a DefaultQueryConfig,
}

impl<'a> QueryCapabilities<'a> {
    #[must_use]
    pub fn new(model: &'a EdmModel, defaults: &'a DefaultQueryConfig) -> Self {
        Self { model, defaults }
    }

    #[must_use]
    pub fn model(&self) -> &'a EdmModel {
        self.model
    }

    /// Settings in effect at `path_property` / `path_type`.
    #[must_use]
    pub fn settings(
        &self,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
    ) -> ModelBoundQuerySettings {
        self.model
            .effective_query_settings(path_property, path_type, self.defaults.max_top)
    }

    /// Whether `$filter` may reference `property`.
    ///
    /// With the request flag off, only an explicit allow (or a default-enable of
    /// `true`) permits it; with the flag on, only an explicit disallow (or a
    /// default-enable of `false`) denies it.
    #[must_use]
    pub fn is_filterable(
        &self,
        property: &EdmProperty,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> bool {
        if self.restricted(property, |r| r.not_filterable) {
            return false;
        }
        let settings = self.settings(path_property, path_type.or(Some(property.declaring_type())));
        let allowed = decide(
            settings.filter.get(property.name()).copied(),
            settings.default_enable_filter,
            enabled || self.defaults.enable_filter,
        );
        trace!(property = property.name(), allowed, "filter capability");
        allowed
    }

    /// Whether `$orderby` may reference `property`.
    #[must_use]
    pub fn is_sortable(
        &self,
        property: &EdmProperty,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> bool {
        if self.restricted(property, |r| r.not_sortable) {
            return false;
        }
        let settings = self.settings(path_property, path_type.or(Some(property.declaring_type())));
        let allowed = decide(
            settings.order_by.get(property.name()).copied(),
            settings.default_enable_order_by,
            enabled || self.defaults.enable_order_by,
        );
        trace!(property = property.name(), allowed, "order-by capability");
        allowed
    }

    #[must_use]
    pub fn is_selectable(
        &self,
        property: &EdmProperty,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> bool {
        let settings = self.settings(path_property, path_type.or(Some(property.declaring_type())));
        let explicit = settings
            .select
            .get(property.name())
            .map(|t| *t != SelectExpandType::Disabled);
        let default = settings
            .default_select_type
            .map(|t| t != SelectExpandType::Disabled);
        decide(explicit, default, enabled || self.defaults.enable_select)
    }

    #[must_use]
    pub fn is_navigable(&self, property: &EdmProperty) -> bool {
        !self.restricted(property, |r| r.not_navigable)
    }

    /// Expand configuration of a navigation property, `None` when it cannot be
    /// expanded.
    ///
    /// Without model-bound configuration, the request flag decides and the
    /// configured maximum expansion depth applies.
    #[must_use]
    pub fn expand_configuration(
        &self,
        property: &EdmProperty,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> Option<ExpandConfiguration> {
        if self.restricted(property, |r| r.not_expandable) {
            return None;
        }
        let settings = self.settings(path_property, path_type.or(Some(property.declaring_type())));
        let enabled = enabled || self.defaults.enable_expand;
        let config = settings.expand_configuration(property.name()).or_else(|| {
            enabled.then(|| {
                ExpandConfiguration::new(
                    SelectExpandType::Allowed,
                    self.defaults.max_expansion_depth,
                )
            })
        })?;
        (config.expand_type != SelectExpandType::Disabled).then_some(config)
    }

    #[must_use]
    pub fn is_expandable(
        &self,
        property: &EdmProperty,
        path_property: Option<&EdmProperty>,
        path_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> bool {
        self.expand_configuration(property, path_property, path_type, enabled)
            .is_some()
    }

    /// Whether `$count` applies to a collection reached through `property`
    /// (or to `structured_type` itself).
    #[must_use]
    pub fn is_countable(
        &self,
        property: Option<&EdmProperty>,
        structured_type: Option<SchemaTypeId>,
        enabled: bool,
    ) -> bool {
        if let Some(property) = property {
            if self.restricted(property, |r| r.not_countable) {
                return false;
            }
            let own = self.model.query_settings(property.id());
            if own.is_some_and(|s| s.countable == Some(false)) {
                return false;
            }
        }
        self.settings(property, self.element_type(property, structured_type))
            .countable
            .unwrap_or(enabled || self.defaults.enable_count)
    }

    /// Smallest positive max-top among the property's own settings, the
    /// type's settings and the configured default.
    #[must_use]
    pub fn effective_max_top(
        &self,
        property: Option<&EdmProperty>,
        structured_type: Option<SchemaTypeId>,
    ) -> Option<u32> {
        let own = property
            .and_then(|p| self.model.query_settings(p.id()))
            .and_then(|s| s.max_top);
        let of_type = self
            .element_type(property, structured_type)
            .and_then(|ty| self.model.query_settings(ty))
            .and_then(|s| s.max_top);
        [own, of_type, self.defaults.max_top]
            .into_iter()
            .flatten()
            .filter(|top| *top > 0)
            .min()
    }

    /// The violated limit when `top` exceeds the effective max-top.
    #[must_use]
    pub fn top_limit_exceeded(
        &self,
        property: Option<&EdmProperty>,
        structured_type: Option<SchemaTypeId>,
        top: u32,
    ) -> Option<u32> {
        self.effective_max_top(property, structured_type)
            .filter(|limit| top > *limit)
    }

    /// Server-driven page size in effect.
    #[must_use]
    pub fn page_size(
        &self,
        property: Option<&EdmProperty>,
        structured_type: Option<SchemaTypeId>,
    ) -> Option<u32> {
        self.settings(property, self.element_type(property, structured_type))
            .page_size
            .filter(|size| *size > 0)
    }

    /// The violated limit when `depth` exceeds the configuration's max depth.
    #[must_use]
    pub fn expansion_depth_exceeded(config: ExpandConfiguration, depth: u32) -> Option<u32> {
        (config.max_depth > 0 && depth > config.max_depth).then_some(config.max_depth)
    }

    /// `structured_type`, else the element type reached through `property`.
    fn element_type(
        &self,
        property: Option<&EdmProperty>,
        structured_type: Option<SchemaTypeId>,
    ) -> Option<SchemaTypeId> {
        structured_type.or_else(|| {
            let property = property?;
            match property.as_navigation() {
                Some(navigation) => Some(navigation.target),
                None => self.model.structured_type_of(property.structural_type()?),
            }
        })
    }

    fn restricted(&self, property: &EdmProperty, flag: fn(&QueryableRestrictions) -> bool) -> bool {
        self.model
            .query_restrictions(property.id())
            .is_some_and(|r| flag(r.as_ref()))
    }
}

fn decide(explicit: Option<bool>, default_enabled: Option<bool>, enabled: bool) -> bool {
    match explicit {
        Some(allowed) => allowed,
        None if enabled => default_enabled != Some(false),
        None => default_enabled == Some(true),
    }
}

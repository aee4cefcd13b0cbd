//! Typed configuration of the EDM layer.
//!
//! Loading is lenient: a missing `odata` section yields defaults, while a
//! present but malformed section is an error.

use std::collections::HashMap;

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{EdmError, EdmResult};
use crate::model::EdmModel;
use crate::query::{DEFAULT_MAX_EXPAND_DEPTH, ModelBoundQuerySettings};

/// Query options enabled for every request unless model-bound settings say otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DefaultQueryConfig {
    pub enable_filter: bool,
    pub enable_order_by: bool,
    pub enable_select: bool,
    pub enable_expand: bool,
    pub enable_count: bool,
    /// Upper bound for `$top`; `None` or `0` means unlimited.
    pub max_top: Option<u32>,
    pub max_expansion_depth: u32,
}

impl Default for DefaultQueryConfig {
    fn default() -> Self {
        Self {
            enable_filter: false,
            enable_order_by: false,
            enable_select: false,
            enable_expand: false,
            enable_count: false,
            max_top: None,
            max_expansion_depth: DEFAULT_MAX_EXPAND_DEPTH,
        }
    }
}

impl DefaultQueryConfig {
    /// Every query option enabled, no `$top` limit.
    #[must_use]
    pub fn all_enabled() -> Self {
        Self {
            enable_filter: true,
            enable_order_by: true,
            enable_select: true,
            enable_expand: true,
            enable_count: true,
            ..Self::default()
        }
    }
}

/// Model-bound settings keyed by `Ns.Type` and `Ns.Type/Property`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct QuerySettingsConfig {
    pub types: HashMap<String, ModelBoundQuerySettings>,
    pub properties: HashMap<String, ModelBoundQuerySettings>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EdmConfig {
    pub query: DefaultQueryConfig,
    /// Resolve navigation sources and operations ignoring case.
    pub case_insensitive: bool,
    pub query_settings: QuerySettingsConfig,
}

impl EdmConfig {
    pub const SECTION: &'static str = "odata";

    /// Extract the `odata` section, falling back to defaults when it is absent.
    ///
    /// # Errors
    /// [`EdmError::Config`] when the section exists but cannot be deserialized.
    pub fn from_figment(figment: &Figment) -> EdmResult<Self> {
        if !figment.contains(Self::SECTION) {
            tracing::debug!(section = Self::SECTION, "no OData configuration, using defaults");
            return Ok(Self::default());
        }
        figment
            .extract_inner(Self::SECTION)
            .map_err(|e| EdmError::Config(e.to_string()))
    }

    /// Attach the configured model-bound settings to `model`.
    ///
    /// # Errors
    /// - [`EdmError::UnknownElement`] when a type or property does not exist;
    /// - [`EdmError::Config`] when a property key is not `Ns.Type/Property`.
    pub fn apply_query_settings(&self, model: &EdmModel) -> EdmResult<()> {
        for (type_name, settings) in &self.query_settings.types {
            let ty = model
                .find_type(type_name)
                .ok_or_else(|| EdmError::unknown("schema type", type_name))?;
            model.set_query_settings(ty.id(), settings.clone());
        }

        for (key, settings) in &self.query_settings.properties {
            let Some((type_name, property_name)) = key.split_once('/') else {
                return Err(EdmError::Config(format!(
                    "property settings key '{key}' must have the form 'Ns.Type/Property'"
                )));
            };
            let ty = model
                .find_type(type_name)
                .ok_or_else(|| EdmError::unknown("schema type", type_name))?;
            let property = model
                .find_property(ty.id(), property_name)
                .ok_or_else(|| EdmError::unknown("property", key))?;
            model.set_query_settings(property.id(), settings.clone());
        }

        tracing::debug!(
            model = %model.id(),
            types = self.query_settings.types.len(),
            properties = self.query_settings.properties.len(),
            "applied configured query settings"
        );
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DefaultQueryConfig::default();
        assert!(!config.enable_filter);
        assert_eq!(config.max_expansion_depth, DEFAULT_MAX_EXPAND_DEPTH);
        assert!(DefaultQueryConfig::all_enabled().enable_count);
    }

    #[test]
    fn test_missing_section_yields_defaults() {
        let config = EdmConfig::from_figment(&Figment::new()).unwrap();
        assert_eq!(config, EdmConfig::default());
    }
}

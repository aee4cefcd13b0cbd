use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{EdmModel, PropertyId};

/// Per-property restrictions that take precedence over model-bound settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
#[allow(clippy::struct_excessive_bools)]
pub struct QueryableRestrictions {
    pub not_filterable: bool,
    pub not_sortable: bool,
    pub not_navigable: bool,
    pub not_expandable: bool,
    pub not_countable: bool,
    pub auto_expand: bool,
    /// Suppress `auto_expand` when the request carries `$select`.
    pub disable_auto_expand_when_select_present: bool,
}

impl QueryableRestrictions {
    /// Whether a navigation property is expanded automatically for a request.
    #[must_use]
    pub fn auto_expands(&self, is_select_present: bool) -> bool {
        self.auto_expand && !(is_select_present && self.disable_auto_expand_when_select_present)
    }
}

impl EdmModel {
    #[must_use]
    pub fn query_restrictions(&self, property: PropertyId) -> Option<Arc<QueryableRestrictions>> {
        self.annotations().get(property)
    }

    pub fn set_query_restrictions(
        &self,
        property: PropertyId,
        restrictions: QueryableRestrictions,
    ) {
        self.annotations().set(property, restrictions);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_auto_expand_respects_select() {
        let restrictions = QueryableRestrictions {
            auto_expand: true,
            disable_auto_expand_when_select_present: true,
            ..QueryableRestrictions::default()
        };
        assert!(restrictions.auto_expands(false));
        assert!(!restrictions.auto_expands(true));
        assert!(!QueryableRestrictions::default().auto_expands(false));
    }
}

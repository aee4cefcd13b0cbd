#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Capability decisions: legacy restrictions, model-bound settings and request defaults.

mod common;

use common::shop;
use modkit_odata_edm::DefaultQueryConfig;
use modkit_odata_edm::query::{
    ExpandConfiguration, ModelBoundQuerySettings, QueryCapabilities, QueryableRestrictions,
    SelectExpandType,
};

#[test]
fn test_legacy_restriction_wins_over_settings() {
    let shop = shop();
    let defaults = DefaultQueryConfig::all_enabled();
    shop.model.set_query_settings(
        shop.customer,
        ModelBoundQuerySettings::new().with_filter("Name", true),
    );
    shop.model.set_query_restrictions(
        shop.customer_name,
        QueryableRestrictions {
            not_filterable: true,
            ..QueryableRestrictions::default()
        },
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let name = shop.property(shop.customer_name);

    assert!(!caps.is_filterable(name, None, Some(shop.customer), true));
}

#[test]
fn test_explicit_allow_under_disabled_default() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(
        shop.customer,
        ModelBoundQuerySettings::new()
            .with_filter("Name", true)
            .with_default_filter(false),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);

    let name = shop.property(shop.customer_name);
    let id = shop.property(shop.customer_id);
    assert!(caps.is_filterable(name, None, Some(shop.customer), false));
    assert!(caps.is_filterable(name, None, Some(shop.customer), true));
    assert!(!caps.is_filterable(id, None, Some(shop.customer), false));
    assert!(!caps.is_filterable(id, None, Some(shop.customer), true));
}

#[test]
fn test_request_flag_applies_without_settings() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let total = shop.property(shop.order_total);

    assert!(caps.is_sortable(total, None, Some(shop.order), true));
    assert!(!caps.is_sortable(total, None, Some(shop.order), false));
    assert!(caps.is_selectable(total, None, Some(shop.order), true));
    assert!(caps.is_navigable(shop.property(shop.order_customer)));
}

#[test]
fn test_explicit_disallow_under_enabled_default() {
    let shop = shop();
    let defaults = DefaultQueryConfig::all_enabled();
    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new()
            .with_order_by("Total", false)
            .with_default_order_by(true),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    assert!(!caps.is_sortable(shop.property(shop.order_total), None, Some(shop.order), true));
}

#[test]
fn test_path_property_settings_override_type_settings() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new().with_filter("Total", true),
    );
    shop.model.set_query_settings(
        shop.customer_orders,
        ModelBoundQuerySettings::new().with_filter("Total", false),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let total = shop.property(shop.order_total);
    let orders = shop.property(shop.customer_orders);

    assert!(caps.is_filterable(total, None, Some(shop.order), false));
    assert!(!caps.is_filterable(total, Some(orders), Some(shop.order), false));
}

#[test]
fn test_navigable_only_consults_restrictions() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_restrictions(
        shop.customer_orders,
        QueryableRestrictions {
            not_navigable: true,
            ..QueryableRestrictions::default()
        },
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    assert!(!caps.is_navigable(shop.property(shop.customer_orders)));
}

#[test]
fn test_expand_configuration() {
    let shop = shop();
    let defaults = DefaultQueryConfig {
        max_expansion_depth: 4,
        ..DefaultQueryConfig::default()
    };
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let orders = shop.property(shop.customer_orders);
    let customer = shop.property(shop.order_customer);

    // configured on the Customer type
    assert_eq!(
        caps.expand_configuration(orders, None, Some(shop.customer), false),
        Some(ExpandConfiguration::new(SelectExpandType::Automatic, 2))
    );
    // unconfigured: the request flag decides
    assert_eq!(caps.expand_configuration(customer, None, Some(shop.order), false), None);
    assert_eq!(
        caps.expand_configuration(customer, None, Some(shop.order), true),
        Some(ExpandConfiguration::new(SelectExpandType::Allowed, 4))
    );

    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new().with_expand("Customer", SelectExpandType::Disabled, 0),
    );
    assert!(!caps.is_expandable(customer, None, Some(shop.order), true));

    shop.model.set_query_restrictions(
        shop.customer_orders,
        QueryableRestrictions {
            not_expandable: true,
            ..QueryableRestrictions::default()
        },
    );
    assert!(!caps.is_expandable(orders, None, Some(shop.customer), true));
}

#[test]
fn test_countable_precedence() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let orders = shop.property(shop.customer_orders);

    assert!(caps.is_countable(Some(orders), Some(shop.order), true));
    assert!(!caps.is_countable(Some(orders), Some(shop.order), false));

    shop.model.set_query_settings(shop.order, ModelBoundQuerySettings::new().with_countable(true));
    assert!(caps.is_countable(Some(orders), Some(shop.order), false));

    // the property's own flag short-circuits before the merge
    shop.model.set_query_settings(
        shop.customer_orders,
        ModelBoundQuerySettings::new().with_countable(false),
    );
    assert!(!caps.is_countable(Some(orders), Some(shop.order), true));
    assert!(caps.is_countable(None, Some(shop.order), false));
}

#[test]
fn test_max_top_is_smallest_limit() {
    let shop = shop();
    let defaults = DefaultQueryConfig {
        max_top: Some(100),
        ..DefaultQueryConfig::default()
    };
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let orders = shop.property(shop.customer_orders);

    assert_eq!(caps.effective_max_top(Some(orders), Some(shop.order)), Some(100));

    shop.model.set_query_settings(shop.order, ModelBoundQuerySettings::new().with_max_top(50));
    shop.model.set_query_settings(
        shop.customer_orders,
        ModelBoundQuerySettings::new().with_max_top(20),
    );
    assert_eq!(caps.effective_max_top(Some(orders), Some(shop.order)), Some(20));
    assert_eq!(caps.effective_max_top(None, Some(shop.order)), Some(50));

    assert_eq!(caps.top_limit_exceeded(Some(orders), Some(shop.order), 20), None);
    assert_eq!(caps.top_limit_exceeded(Some(orders), Some(shop.order), 21), Some(20));
}

#[test]
fn test_unlimited_top_without_limits() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    assert_eq!(caps.effective_max_top(None, Some(shop.order)), None);
    assert_eq!(caps.top_limit_exceeded(None, Some(shop.order), u32::MAX), None);
}

#[test]
fn test_page_size_falls_back_to_type() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(shop.order, ModelBoundQuerySettings::new().with_page_size(25));
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let orders = shop.property(shop.customer_orders);

    assert_eq!(caps.page_size(Some(orders), Some(shop.order)), Some(25));
    shop.model.set_query_settings(
        shop.customer_orders,
        ModelBoundQuerySettings::new().with_page_size(10),
    );
    assert_eq!(caps.page_size(Some(orders), Some(shop.order)), Some(10));
}

#[test]
fn test_declaring_type_settings_apply_without_path_type() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new()
            .with_filter("Total", true)
            .with_order_by("Total", true)
            .with_expand("Customer", SelectExpandType::Allowed, 3),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let total = shop.property(shop.order_total);
    let customer = shop.property(shop.order_customer);

    assert_eq!(
        caps.is_filterable(total, None, None, false),
        caps.is_filterable(total, None, Some(shop.order), false)
    );
    assert!(caps.is_filterable(total, None, None, false));
    assert!(caps.is_sortable(total, None, None, false));
    assert_eq!(
        caps.expand_configuration(customer, None, None, false),
        Some(ExpandConfiguration::new(SelectExpandType::Allowed, 3))
    );
}

#[test]
fn test_own_property_settings_merge_over_declaring_type() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(
        shop.customer,
        ModelBoundQuerySettings::new().with_default_filter(true),
    );
    // settings on Customer.Orders govern properties of the orders it reaches
    shop.model.set_query_settings(
        shop.customer_orders,
        ModelBoundQuerySettings::new().with_filter("Total", true),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let name = shop.property(shop.customer_name);
    let total = shop.property(shop.order_total);
    let orders = shop.property(shop.customer_orders);

    assert!(caps.is_filterable(name, None, None, false));
    assert!(caps.is_filterable(total, Some(orders), None, false));
    assert!(!caps.is_filterable(total, None, None, false));
}

#[test]
fn test_collection_limits_default_to_element_type() {
    let shop = shop();
    let defaults = DefaultQueryConfig::default();
    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new()
            .with_page_size(25)
            .with_max_top(40)
            .with_countable(false),
    );
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let orders = shop.property(shop.customer_orders);

    assert_eq!(caps.page_size(Some(orders), None), Some(25));
    assert_eq!(caps.effective_max_top(Some(orders), None), Some(40));
    assert!(!caps.is_countable(Some(orders), None, true));
}

#[test]
fn test_countable_without_property_or_type() {
    let shop = shop();
    let disabled = DefaultQueryConfig::default();
    let caps = QueryCapabilities::new(&shop.model, &disabled);
    assert!(caps.is_countable(None, None, true));
    assert!(!caps.is_countable(None, None, false));

    let enabled = DefaultQueryConfig {
        enable_count: true,
        ..DefaultQueryConfig::default()
    };
    let caps = QueryCapabilities::new(&shop.model, &enabled);
    assert!(caps.is_countable(None, None, false));
}

#[test]
fn test_configured_enable_flags_apply_to_requests() {
    let shop = shop();
    let defaults = DefaultQueryConfig::all_enabled();
    let caps = QueryCapabilities::new(&shop.model, &defaults);
    let total = shop.property(shop.order_total);
    let customer = shop.property(shop.order_customer);

    assert!(caps.is_filterable(total, None, Some(shop.order), false));
    assert!(caps.is_sortable(total, None, Some(shop.order), false));
    assert!(caps.is_selectable(total, None, Some(shop.order), false));
    assert!(caps.is_expandable(customer, None, Some(shop.order), false));
    assert!(caps.is_countable(None, Some(shop.order), false));

    // an explicit disallow still wins over the configured flag
    shop.model.set_query_settings(
        shop.order,
        ModelBoundQuerySettings::new().with_filter("Total", false),
    );
    assert!(!caps.is_filterable(total, None, Some(shop.order), false));
}

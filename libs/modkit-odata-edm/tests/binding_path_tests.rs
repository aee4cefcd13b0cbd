#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Navigation binding selection from resolved route segments.

mod common;

use common::{NS, shop};
use modkit_odata_edm::model::{BindingPath, EdmModel, EdmTypeRef, NavigationDef};
use modkit_odata_edm::routing::{
    NavigationTarget, RouteSegment, find_navigation_target, match_binding_path,
};

fn entity_set(name: &str) -> RouteSegment {
    RouteSegment::EntitySet(name.to_owned())
}

fn property(name: &str) -> RouteSegment {
    RouteSegment::Property(name.to_owned())
}

#[test]
fn test_single_segment_matches_any_route() {
    let path = BindingPath::parse("Orders").unwrap();
    let routes: [&[RouteSegment]; 3] = [
        &[],
        &[entity_set("Customers"), RouteSegment::Key],
        &[
            RouteSegment::Singleton("Me".to_owned()),
            RouteSegment::navigation("Friends", false),
            RouteSegment::Key,
        ],
    ];
    for route in routes {
        assert!(match_binding_path(&path, route));
    }
}

#[test]
fn test_containment_chain() {
    let path = BindingPath::parse("Accounts/Settings/Owner").unwrap();
    let route = [
        entity_set("Tenants"),
        RouteSegment::Key,
        RouteSegment::navigation("Accounts", true),
        RouteSegment::Key,
        property("Settings"),
    ];
    assert!(match_binding_path(&path, &route));

    let mut renamed = route.clone();
    renamed[2] = RouteSegment::navigation("Archive", true);
    assert!(!match_binding_path(&path, &renamed));

    let mut renamed = route.clone();
    renamed[4] = property("Preferences");
    assert!(!match_binding_path(&path, &renamed));
}

#[test]
fn test_route_shorter_than_path_fails() {
    let path = BindingPath::parse("Accounts/Settings/Owner").unwrap();
    let route = [entity_set("Tenants"), RouteSegment::Key, property("Settings")];
    assert!(!match_binding_path(&path, &route));
}

#[test]
fn test_bound_navigation_follows_binding() {
    let shop = shop();
    let customers = shop.model.navigation_source(shop.customers).unwrap();
    let orders = shop.property(shop.customer_orders);

    let target = find_navigation_target(
        &shop.model,
        customers,
        orders,
        &[entity_set("Customers"), RouteSegment::Key],
    )
    .unwrap()
    .unwrap();
    assert_eq!(target.source().name(), "Orders");
    assert!(matches!(target, NavigationTarget::Bound { .. }));
}

#[test]
fn test_binding_selected_by_route() {
    let mut b = EdmModel::builder();
    let customer = b.entity_type(NS, "Customer");
    let address = b.complex_type(NS, "Address");
    let city = b.entity_type(NS, "City");
    b.structural_property(customer, "Home", EdmTypeRef::schema(address, true));
    b.structural_property(customer, "Billing", EdmTypeRef::schema(address, true));
    let city_nav = b.navigation_property(address, "City", NavigationDef::one(city));
    let customers = b.entity_set("Customers", customer);
    b.entity_set("HomeCities", city);
    b.entity_set("BillingCities", city);
    b.bind(customers, city_nav, "Home/City", "HomeCities");
    b.bind(customers, city_nav, "Billing/City", "BillingCities");
    let model = b.build().unwrap();

    let source = model.navigation_source(customers).unwrap();
    let nav = model.property(city_nav).unwrap();
    let via = |prop: &str| {
        find_navigation_target(
            &model,
            source,
            nav,
            &[entity_set("Customers"), RouteSegment::Key, property(prop)],
        )
        .unwrap()
        .map(|t| t.source().name().to_owned())
    };

    assert_eq!(via("Home").as_deref(), Some("HomeCities"));
    assert_eq!(via("Billing").as_deref(), Some("BillingCities"));
    assert_eq!(via("Shipping"), None);
}

#[test]
fn test_contained_navigation_stays_in_parent() {
    let mut b = EdmModel::builder();
    let customer = b.entity_type(NS, "Customer");
    let profile = b.entity_type(NS, "Profile");
    let profiles = b.navigation_property(
        customer,
        "Profiles",
        NavigationDef::many(profile).contained(),
    );
    let customers = b.entity_set("Customers", customer);
    let model = b.build().unwrap();

    let source = model.navigation_source(customers).unwrap();
    let target = find_navigation_target(&model, source, model.property(profiles).unwrap(), &[])
        .unwrap()
        .unwrap();
    match target {
        NavigationTarget::Contained { parent, property } => {
            assert_eq!(parent.name(), "Customers");
            assert_eq!(property, profiles);
        }
        NavigationTarget::Bound { .. } => panic!("contained navigation resolved to a binding"),
    }
}

#[test]
fn test_structural_property_is_rejected() {
    let shop = shop();
    let customers = shop.model.navigation_source(shop.customers).unwrap();
    let name = shop.property(shop.customer_name);
    assert!(find_navigation_target(&shop.model, customers, name, &[]).is_err());
}

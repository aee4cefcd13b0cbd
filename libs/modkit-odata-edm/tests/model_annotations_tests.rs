#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Annotation side-tables of built models.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use common::{NS, shop};
use modkit_odata_edm::annotations::{
    EntityLinkContext, FeedLinkContext, LinkTarget, NavigationSourceLinkBuilder,
    OperationLinkBuilder,
};
use modkit_odata_edm::model::{EdmPrimitiveKind, EdmTypeRef, ElementId, VocabularyAnnotation};
use modkit_odata_edm::{EdmError, EdmModel};

#[derive(Debug, PartialEq, Eq)]
struct Fingerprint(u64);

#[test]
fn test_models_do_not_share_annotations() {
    let a = shop();
    let b = shop();
    a.model.annotations().set(ElementId::Model, Fingerprint(7));

    assert_eq!(
        a.model.annotations().get::<Fingerprint>(ElementId::Model).as_deref(),
        Some(&Fingerprint(7))
    );
    assert!(b.model.annotations().get::<Fingerprint>(ElementId::Model).is_none());
    assert_ne!(a.model.model_name(), b.model.model_name());
}

#[test]
fn test_concurrent_lazy_facts_converge() {
    let shop = shop();
    let calls = AtomicUsize::new(0);

    let values: Vec<Arc<Fingerprint>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    shop.model.annotations().get_or_insert_with(shop.customer, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Fingerprint(1)
                    })
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(calls.load(Ordering::SeqCst) >= 1);
    let first = &values[0];
    assert!(values.iter().all(|v| Arc::ptr_eq(v, first)));
}

#[test]
fn test_model_name_is_shared_across_threads() {
    let shop = shop();
    let names: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| shop.model.model_name())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(names.iter().all(|n| *n == names[0]));
}

#[test]
fn test_concurrency_properties_of_entity_set() {
    let mut b = EdmModel::builder();
    let order = b.entity_type(NS, "Order");
    let etag = b.structural_property(
        order,
        "ETag",
        EdmTypeRef::primitive(EdmPrimitiveKind::String, false),
    );
    let orders = b.entity_set("Orders", order);
    b.vocabulary_annotation(orders, VocabularyAnnotation::optimistic_concurrency(["ETag"]));
    let model = b.build().unwrap();

    assert_eq!(&*model.concurrency_properties(orders).unwrap(), &[etag]);
}

#[test]
fn test_native_property_name_defaults_to_edm_name() {
    let shop = shop();
    let name = shop.property(shop.customer_name);
    assert_eq!(shop.model.native_property_name(name), "Name");
    shop.model.set_native_property_name(shop.customer_name, "full_name");
    assert_eq!(shop.model.native_property_name(name), "full_name");
}

#[test]
fn test_navigation_source_links() {
    let shop = shop();
    let builder = shop.model.navigation_source_link_builder(shop.customers).unwrap();
    let ctx = EntityLinkContext {
        service_root: "https://svc/odata/",
        source: "Customers",
        key: "42",
        type_cast: Some("Acme.VipCustomer"),
    };

    assert_eq!(builder.id_link(&ctx), "https://svc/odata/Customers(42)");
    assert_eq!(builder.edit_link(&ctx), "https://svc/odata/Customers(42)/Acme.VipCustomer");
    assert_eq!(
        builder.navigation_link(&ctx, "Orders"),
        "https://svc/odata/Customers(42)/Acme.VipCustomer/Orders"
    );

    shop.model.set_navigation_source_link_builder(
        shop.customers,
        NavigationSourceLinkBuilder::key_as_segment(),
    );
    let builder = shop.model.navigation_source_link_builder(shop.customers).unwrap();
    assert_eq!(builder.id_link(&ctx), "https://svc/odata/Customers/42");
}

#[test]
fn test_operation_links_and_titles() {
    let mut b = EdmModel::builder();
    let customer = b.entity_type(NS, "Customer");
    let entity = EdmTypeRef::schema(customer, false);
    let promote = b.action(NS, "Promote", Some(entity.clone()), &[]);
    let top = b.function(NS, "Top", Some(EdmTypeRef::collection_of(entity)), &["count"]);
    let reset = b.action(NS, "Reset", None, &[]);
    b.entity_set("Customers", customer);
    let model = b.build().unwrap();

    let entity_ctx = EntityLinkContext {
        service_root: "http://svc",
        source: "Customers",
        key: "1",
        type_cast: None,
    };
    let feed_ctx = FeedLinkContext {
        service_root: "http://svc",
        source: "Customers",
        type_cast: None,
    };

    let promote_link = model.operation_link_builder(promote).unwrap().unwrap();
    assert_eq!(promote_link.target(), LinkTarget::Entity);
    assert_eq!(
        promote_link.build_for_entity(&entity_ctx).as_deref(),
        Some("http://svc/Customers(1)/Acme.Promote")
    );

    let top_link = model.operation_link_builder(top).unwrap().unwrap();
    assert_eq!(
        top_link.build_for_feed(&feed_ctx).as_deref(),
        Some("http://svc/Customers/Acme.Top(count=@count)")
    );
    assert!(top_link.build_for_entity(&entity_ctx).is_none());

    assert!(model.operation_link_builder(reset).unwrap().is_none());
    let factory = Arc::new(|base: &str| Some(format!("{base}/reset")));
    model.set_operation_link_builder(
        reset,
        OperationLinkBuilder::custom(LinkTarget::Feed, factory),
    );
    let custom = model.operation_link_builder(reset).unwrap().unwrap();
    assert!(!custom.follows_conventions());
    assert_eq!(
        custom.build_for_feed(&feed_ctx).as_deref(),
        Some("http://svc/Customers/reset")
    );

    assert_eq!(model.operation_title(promote).unwrap(), "Promote");
    model.set_operation_title(promote, "Promote to VIP");
    assert_eq!(model.operation_title(promote).unwrap(), "Promote to VIP");
}

#[test]
fn test_foreign_ids_are_rejected() {
    let shop = shop();
    let empty = EdmModel::builder().build().unwrap();
    let err = empty.navigation_source_link_builder(shop.customers).unwrap_err();
    assert!(matches!(err, EdmError::UnknownElement { kind: "navigation source", .. }));
    assert!(empty.concurrency_properties(shop.orders).is_err());
}

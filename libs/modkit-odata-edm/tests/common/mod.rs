#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use modkit_odata_edm::model::{
    EdmModel, EdmPrimitiveKind, EdmTypeRef, NavigationDef, NavigationSourceId, PropertyId,
    SchemaTypeId,
};
use modkit_odata_edm::query::{ModelBoundQuerySettings, SelectExpandType};

pub const NS: &str = "Acme";

/// Customer/Order model used across integration tests.
///
/// - `Customer { Id (key), Name, Address: Address, Orders: [Order] }`
/// - `VipCustomer: Customer { Tier }`
/// - `Order { Id (key), Total, Customer: Customer }`
/// - `Address { Street, City }` (complex)
///
/// `Customer.Name` is auto-selected and `Customer.Orders` auto-expanded through
/// type-level settings on `Customer`.
pub struct Shop {
    pub model: EdmModel,
    pub customer: SchemaTypeId,
    pub vip: SchemaTypeId,
    pub order: SchemaTypeId,
    pub address: SchemaTypeId,
    pub customer_id: PropertyId,
    pub customer_name: PropertyId,
    pub customer_address: PropertyId,
    pub customer_orders: PropertyId,
    pub vip_tier: PropertyId,
    pub order_total: PropertyId,
    pub order_customer: PropertyId,
    pub customers: NavigationSourceId,
    pub orders: NavigationSourceId,
}

fn string() -> EdmTypeRef {
    EdmTypeRef::primitive(EdmPrimitiveKind::String, true)
}

fn int32() -> EdmTypeRef {
    EdmTypeRef::primitive(EdmPrimitiveKind::Int32, false)
}

#[must_use]
pub fn shop() -> Shop {
    let mut b = EdmModel::builder();

    let customer = b.entity_type(NS, "Customer");
    let vip = b.entity_type(NS, "VipCustomer");
    let order = b.entity_type(NS, "Order");
    let address = b.complex_type(NS, "Address");
    b.derive_from(vip, customer);

    let customer_id = b.structural_property(customer, "Id", int32());
    let customer_name = b.structural_property(customer, "Name", string());
    let customer_address =
        b.structural_property(customer, "Address", EdmTypeRef::schema(address, true));
    let customer_orders = b.navigation_property(customer, "Orders", NavigationDef::many(order));
    b.add_key(customer, customer_id);

    let vip_tier = b.structural_property(vip, "Tier", int32());

    let order_id = b.structural_property(order, "Id", int32());
    let order_total = b.structural_property(
        order,
        "Total",
        EdmTypeRef::primitive(EdmPrimitiveKind::Decimal, false),
    );
    let order_customer = b.navigation_property(
        order,
        "Customer",
        NavigationDef::one(customer).with_partner("Orders"),
    );
    b.add_key(order, order_id);

    b.structural_property(address, "Street", string());
    b.structural_property(address, "City", string());

    let customers = b.entity_set("Customers", customer);
    let orders = b.entity_set("Orders", order);
    b.bind(customers, customer_orders, "Orders", "Orders");
    b.bind(orders, order_customer, "Customer", "Customers");

    *b.query_settings(customer) = ModelBoundQuerySettings::new()
        .with_select("Name", SelectExpandType::Automatic)
        .with_expand("Orders", SelectExpandType::Automatic, 2);

    Shop {
        model: b.build().unwrap(),
        customer,
        vip,
        order,
        address,
        customer_id,
        customer_name,
        customer_address,
        customer_orders,
        vip_tier,
        order_total,
        order_customer,
        customers,
        orders,
    }
}

impl Shop {
    #[must_use]
    pub fn property(&self, id: PropertyId) -> &modkit_odata_edm::model::EdmProperty {
        self.model.property(id).unwrap()
    }
}

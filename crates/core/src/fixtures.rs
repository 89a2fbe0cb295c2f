//! Test fixtures

use serde_json::Value;

use crate::{
    api::RestaurantId,
    checkout::SubmissionTicket,
    fulfillment::{FulfillmentMethod, FulfillmentSettings},
    menu::{Category, CategoryId, Menu, MenuItem, MenuItemId},
    money::Amount,
    orders::{OrderConfirmation, OrderId, OrderResult, OrderTotals},
};

/// Menu item id from a plain number.
pub(crate) fn item_id(id: u64) -> MenuItemId {
    MenuItemId::new(id)
}

/// Restaurant id from a plain number.
pub(crate) fn restaurant_id(id: u64) -> RestaurantId {
    RestaurantId::new(id)
}

/// Visible item with no photo or nutrition facts.
pub(crate) fn dish(id: u64, name: &str, price: Amount) -> MenuItem {
    MenuItem {
        id: item_id(id),
        name: name.to_string(),
        price,
        photo: None,
        view: true,
        placenum: 0,
        nutrition: Default::default(),
    }
}

/// Menu with a single category holding `items`.
pub(crate) fn menu_of(items: impl IntoIterator<Item = MenuItem>) -> Menu {
    Menu::new(vec![Category {
        id: CategoryId::new(1),
        name: "Mains".to_string(),
        items: items.into_iter().collect(),
    }])
}

/// Settings resolved from a raw record.
pub(crate) fn settings_from(raw: &Value) -> FulfillmentSettings {
    FulfillmentSettings::resolve(Some(raw))
}

/// Default settings, except pickup only takes scheduled orders.
pub(crate) fn pickup_scheduled_only() -> FulfillmentSettings {
    settings_from(&serde_json::json!({ "pickup": { "allow_asap": false } }))
}

/// First submission ticket a wizard hands out.
pub(crate) fn ticket() -> SubmissionTicket {
    SubmissionTicket::new(1)
}

/// Delivery confirmation for order `number`.
pub(crate) fn confirmation(number: &str, payable: Amount) -> OrderConfirmation {
    OrderConfirmation {
        order: OrderResult {
            order_id: OrderId::new(1),
            order_number: number.to_string(),
        },
        totals: OrderTotals {
            subtotal: payable,
            discount: 0,
            payable,
        },
        method: FulfillmentMethod::Delivery,
        timing_label: "As soon as possible".to_string(),
        item_count: 1,
    }
}

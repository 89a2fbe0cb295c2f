//! Storefront
//!
//! Storefront is the order composition and checkout core of a multi-tenant restaurant
//! storefront: a cart keyed by menu item, a fulfillment configuration resolver, a checkout
//! wizard state machine and the gateway that turns all of it into a single order request.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod fulfillment;
pub mod ids;
pub mod menu;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

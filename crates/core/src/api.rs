//! Storefront API
//!
//! The remote surface the storefront talks to. Implementations live outside this crate (an
//! HTTP client in the app); tests use the generated [`MockStorefrontApi`].

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    ids::TypedId,
    menu::Menu,
    orders::{OrderRequest, OrderResult},
};

/// Restaurant id
pub type RestaurantId = TypedId<Restaurant>;

/// Restaurant record as published by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant id
    pub id: RestaurantId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Subdomain the storefront is served under
    #[serde(default)]
    pub subdomain: Option<String>,

    /// ISO currency code of menu prices
    #[serde(default)]
    pub currency: Option<String>,

    /// Raw fulfillment settings: an object, a string holding JSON, or absent
    #[serde(default)]
    pub delivery_settings: Option<Value>,
}

/// Failure talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response: connection, TLS, timeout
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success status, with the `detail` field of the body when present
    #[error("backend responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,

        /// Human-readable explanation from the backend
        detail: Option<String>,
    },

    /// Response body did not have the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Backend operations the storefront needs.
#[automock]
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Fetch the menu of a restaurant.
    async fn get_menu(&self, restaurant: RestaurantId) -> Result<Menu, ApiError>;

    /// Fetch a restaurant record, including its fulfillment settings.
    async fn get_restaurant(&self, restaurant: RestaurantId) -> Result<Restaurant, ApiError>;

    /// Create an order.
    async fn create_order(
        &self,
        restaurant: RestaurantId,
        order: OrderRequest,
    ) -> Result<OrderResult, ApiError>;
}

//! Orders
//!
//! Builds the wire-format order from a validated cart snapshot and draft, sends it through
//! the [`OrderGateway`], and turns the outcome into an [`OrderConfirmation`] or a
//! [`SubmissionError`] carrying a message fit for the guest.

use std::{fmt, sync::Arc};

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiError, RestaurantId, StorefrontApi},
    cart::CartSnapshot,
    checkout::{CheckoutDraft, SubmissionTicket},
    fulfillment::{FulfillmentConfig, FulfillmentMethod, PaymentMethod, TimingMode},
    ids::TypedId,
    menu::MenuItemId,
    money::{Amount, format_amount, percent_of},
};

/// Order id assigned by the backend
pub type OrderId = TypedId<OrderResult>;

/// Wire value of `delivery_time` for ASAP orders.
pub const ASAP_DELIVERY_TIME: &str = "ASAP";

/// One line of an order as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineRequest {
    /// Menu item id
    pub id: MenuItemId,

    /// Item name
    pub name: String,

    /// Quantity
    pub quantity: u32,

    /// Unit price at submission time
    pub price: Amount,
}

/// Order as sent to `POST /restaurants/{id}/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Customer name
    pub customer_name: String,

    /// Customer phone
    pub customer_phone: String,

    /// `delivery` or `pickup`
    pub delivery_method: FulfillmentMethod,

    /// Single-line address, absent for pickup
    pub delivery_address: Option<String>,

    /// Delivery zone; zones are not modelled, always absent
    pub delivery_zone: Option<String>,

    /// `ASAP` or the desired time as typed
    pub delivery_time: String,

    /// `cash`, `card` or `transfer`
    pub payment_method: PaymentMethod,

    /// Ordered lines
    pub items: Vec<OrderLineRequest>,

    /// Guest comment followed by generated fulfillment notes
    pub comment: String,
}

/// Backend answer to a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Order id
    pub order_id: OrderId,

    /// Human-facing order number
    pub order_number: String,
}

/// Amounts of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: Amount,

    /// Pickup discount, zero for delivery
    pub discount: Amount,

    /// What the guest pays
    pub payable: Amount,
}

impl OrderTotals {
    /// Apply the method's discount to `subtotal`.
    pub fn compute(subtotal: Amount, config: &FulfillmentConfig) -> Self {
        let discount = percent_of(subtotal, config.discount_percent()).min(subtotal);

        Self {
            subtotal,
            discount,
            payable: subtotal - discount,
        }
    }
}

/// What the guest sees after a successful order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Backend answer
    pub order: OrderResult,

    /// Amounts
    pub totals: OrderTotals,

    /// Method the order was placed with
    pub method: FulfillmentMethod,

    /// Timing label, e.g. "As soon as possible (20 min)" or "19:30"
    pub timing_label: String,

    /// Number of units ordered
    pub item_count: u64,
}

/// Why a submission did not produce an order.
///
/// `Display` is the message shown to the guest; the detail is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The backend could not be reached
    #[error("could not reach the restaurant, check your connection and try again")]
    Network {
        /// Transport detail
        detail: String,
    },

    /// The backend refused the order with an explanation
    #[error("{message}")]
    Rejected {
        /// Message from the backend
        message: String,
    },

    /// Anything else
    #[error("something went wrong while placing your order, please try again")]
    Unexpected {
        /// Detail for logs
        detail: String,
    },
}

impl From<ApiError> for SubmissionError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(detail) => Self::Network { detail },
            ApiError::Status {
                detail: Some(message),
                ..
            } if !message.trim().is_empty() => Self::Rejected {
                message: message.trim().to_string(),
            },
            other @ (ApiError::Status { .. } | ApiError::Decode(_)) => Self::Unexpected {
                detail: other.to_string(),
            },
        }
    }
}

fn fulfillment_notes(
    draft: &CheckoutDraft,
    config: &FulfillmentConfig,
    totals: &OrderTotals,
    currency: &'static Currency,
) -> Vec<String> {
    let mut notes = Vec::new();

    if draft.method == FulfillmentMethod::Delivery
        && let Some(cost_info) = config.cost_info()
    {
        notes.push(format!("Delivery: {cost_info}"));
    }

    if draft.method == FulfillmentMethod::Pickup && totals.discount > 0 {
        notes.push(format!(
            "Pickup discount: {}% ({})",
            config.discount_percent(),
            format_amount(totals.discount, currency)
        ));
    }

    match draft.timing {
        TimingMode::Asap => notes.push(match config.asap_time_hint() {
            Some(hint) => format!("Ready: as soon as possible ({hint})"),
            None => "Ready: as soon as possible".to_string(),
        }),
        TimingMode::Scheduled if !draft.desired_time.trim().is_empty() => {
            notes.push(format!("Ready: {}", draft.desired_time.trim()));
        }
        TimingMode::Scheduled => {}
    }

    notes
}

impl OrderRequest {
    /// Build the wire order from a snapshot and draft that passed the submit guard.
    pub fn build(
        cart: &CartSnapshot,
        draft: &CheckoutDraft,
        config: &FulfillmentConfig,
        currency: &'static Currency,
    ) -> (Self, OrderTotals) {
        let totals = OrderTotals::compute(cart.total, config);

        let items = cart
            .lines
            .iter()
            .filter(|line| !line.unavailable)
            .map(|line| OrderLineRequest {
                id: line.item,
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        let notes = fulfillment_notes(draft, config, &totals, currency).join("; ");
        let comment = [draft.comment.trim(), notes.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let delivery_address = match draft.method {
            FulfillmentMethod::Delivery => Some(draft.address.to_line()),
            FulfillmentMethod::Pickup => None,
        };

        let delivery_time = match draft.timing {
            TimingMode::Asap => ASAP_DELIVERY_TIME.to_string(),
            TimingMode::Scheduled => draft.desired_time.trim().to_string(),
        };

        let request = Self {
            customer_name: draft.customer_name.trim().to_string(),
            customer_phone: draft.phone.trim().to_string(),
            delivery_method: draft.method,
            delivery_address,
            delivery_zone: None,
            delivery_time,
            payment_method: draft.payment,
            items,
            comment,
        };

        (request, totals)
    }
}

/// Sends orders for one restaurant.
#[derive(Clone)]
pub struct OrderGateway {
    api: Arc<dyn StorefrontApi>,
    restaurant: RestaurantId,
}

impl fmt::Debug for OrderGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderGateway")
            .field("restaurant", &self.restaurant)
            .finish_non_exhaustive()
    }
}

impl OrderGateway {
    /// Gateway for `restaurant` over `api`.
    pub fn new(api: Arc<dyn StorefrontApi>, restaurant: RestaurantId) -> Self {
        Self { api, restaurant }
    }

    /// Restaurant orders go to.
    pub fn restaurant(&self) -> RestaurantId {
        self.restaurant
    }

    pub(crate) fn api(&self) -> Arc<dyn StorefrontApi> {
        Arc::clone(&self.api)
    }

    /// Send one order.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] when the backend cannot be reached or does not accept
    /// the order.
    pub async fn submit(&self, request: OrderRequest) -> Result<OrderResult, SubmissionError> {
        debug!(
            restaurant = %self.restaurant,
            lines = request.items.len(),
            method = %request.delivery_method,
            "submitting order"
        );

        match self.api.create_order(self.restaurant, request).await {
            Ok(result) => {
                info!(
                    restaurant = %self.restaurant,
                    order_id = %result.order_id,
                    order_number = %result.order_number,
                    "order accepted"
                );

                Ok(result)
            }
            Err(error) => {
                warn!(restaurant = %self.restaurant, %error, "order rejected");

                Err(error.into())
            }
        }
    }
}

/// A validated order waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    ticket: SubmissionTicket,
    request: OrderRequest,
    totals: OrderTotals,
    timing_label: String,
    item_count: u64,
}

/// Answer to a [`PendingSubmission`], to be handed back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Attempt this answers
    pub ticket: SubmissionTicket,

    /// Confirmation or error
    pub result: Result<OrderConfirmation, SubmissionError>,
}

impl PendingSubmission {
    /// Prepare an order from a snapshot and draft that passed the submit guard.
    pub fn prepare(
        ticket: SubmissionTicket,
        cart: &CartSnapshot,
        draft: &CheckoutDraft,
        config: &FulfillmentConfig,
        currency: &'static Currency,
    ) -> Self {
        let (request, totals) = OrderRequest::build(cart, draft, config, currency);

        Self {
            ticket,
            request,
            totals,
            timing_label: draft.timing_label(config),
            item_count: cart.item_count,
        }
    }

    /// Attempt this belongs to.
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    /// Wire order.
    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    /// Amounts.
    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    /// Send the order and wrap the answer.
    ///
    /// Does not touch any session state, so it can run detached from the checkout.
    pub async fn send(self, gateway: &OrderGateway) -> SubmissionOutcome {
        let method = self.request.delivery_method;

        let result = gateway
            .submit(self.request)
            .await
            .map(|order| OrderConfirmation {
                order,
                totals: self.totals,
                method,
                timing_label: self.timing_label,
                item_count: self.item_count,
            });

        SubmissionOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

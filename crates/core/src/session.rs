//! Storefront Session
//!
//! One guest session against one restaurant: the menu and fulfillment settings loaded from
//! the backend, the cart, and the checkout wizard. Every cart change is published on a
//! [`watch`] channel so a header badge can follow the item count and total without polling.

use std::sync::Arc;

use rusty_money::iso::Currency;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiError, RestaurantId, StorefrontApi},
    cart::{Cart, CartSnapshot, RefreshReport},
    checkout::{
        CheckoutDraft, CheckoutWizard, GuardFailure, Reconciliation, Transition, WizardEvent,
        WizardStep,
    },
    fulfillment::{FulfillmentMethod, FulfillmentSettings, PaymentMethod, TimingMode},
    menu::{Menu, MenuItemId},
    money::{Amount, currency_or_default},
    orders::{
        OrderConfirmation, OrderGateway, PendingSubmission, SubmissionError, SubmissionOutcome,
    },
};

/// Live cart readout for the storefront header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of quantities
    pub item_count: u64,

    /// Total at current menu prices
    pub total: Amount,
}

/// Session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The menu could not be loaded; there is nothing to order from
    #[error("failed to load the menu")]
    Menu(#[source] ApiError),
}

/// Failure of [`Storefront::submit`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A guard refused the submission
    #[error("the order cannot be placed yet")]
    Blocked(Vec<GuardFailure>),

    /// The gateway did not produce an order
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The answer did not match the pending submission
    #[error("the order answer arrived for a submission that is no longer pending")]
    Stale,
}

/// How a [`SubmissionOutcome`] was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Order placed; cart and draft were cleared
    Confirmed(OrderConfirmation),

    /// Order not placed; cart and draft are untouched
    Failed(SubmissionError),

    /// Not the pending submission; nothing changed
    Stale,
}

/// A guest's storefront session for one restaurant.
#[derive(Debug)]
pub struct Storefront {
    restaurant_name: String,
    currency: &'static Currency,
    menu: Menu,
    settings: FulfillmentSettings,
    cart: Cart,
    wizard: CheckoutWizard,
    checkout_open: bool,
    gateway: OrderGateway,
    summary: watch::Sender<CartSummary>,
}

impl Storefront {
    /// Session over already-loaded data.
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        restaurant: RestaurantId,
        menu: Menu,
        settings: FulfillmentSettings,
        currency: &'static Currency,
    ) -> Self {
        let (summary, _) = watch::channel(CartSummary::default());

        Self {
            restaurant_name: String::new(),
            currency,
            menu,
            wizard: CheckoutWizard::new(&settings),
            settings,
            cart: Cart::new(),
            checkout_open: false,
            gateway: OrderGateway::new(api, restaurant),
            summary,
        }
    }

    /// Load the menu and restaurant record and start a session.
    ///
    /// A restaurant record that cannot be fetched leaves the session on default fulfillment
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Menu`] when the menu cannot be fetched.
    pub async fn load(
        api: Arc<dyn StorefrontApi>,
        restaurant: RestaurantId,
    ) -> Result<Self, SessionError> {
        let (record, menu) = tokio::join!(api.get_restaurant(restaurant), api.get_menu(restaurant));

        let menu = menu.map_err(SessionError::Menu)?;

        let (name, currency, settings) = match record {
            Ok(record) => (
                record.name,
                currency_or_default(record.currency.as_deref()),
                FulfillmentSettings::resolve(record.delivery_settings.as_ref()),
            ),
            Err(error) => {
                warn!(
                    %restaurant,
                    %error,
                    "restaurant unavailable, using default fulfillment settings"
                );

                (String::new(), currency_or_default(None), FulfillmentSettings::default())
            }
        };

        info!(%restaurant, items = menu.len(), "storefront loaded");

        let mut session = Self::new(api, restaurant, menu, settings, currency);
        session.restaurant_name = name;

        Ok(session)
    }

    /// Restaurant id.
    pub fn restaurant(&self) -> RestaurantId {
        self.gateway.restaurant()
    }

    /// Restaurant display name; empty when the record was unavailable.
    pub fn restaurant_name(&self) -> &str {
        &self.restaurant_name
    }

    /// Currency prices are shown in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Current menu.
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Resolved fulfillment settings.
    pub fn settings(&self) -> &FulfillmentSettings {
        &self.settings
    }

    /// Cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Cart joined against the current menu.
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot(&self.menu)
    }

    /// Current cart readout.
    pub fn summary(&self) -> CartSummary {
        *self.summary.borrow()
    }

    /// Follow the cart readout.
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.summary.subscribe()
    }

    /// Checkout wizard.
    pub fn wizard(&self) -> &CheckoutWizard {
        &self.wizard
    }

    fn publish(&self) {
        let next = CartSummary {
            item_count: self.cart.item_count(),
            total: self.cart.total(&self.menu),
        };

        self.summary.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
    }

    /// Change the quantity of `item` by `delta`.
    pub fn add_item(&mut self, item: MenuItemId, delta: i64) {
        self.cart.add_item(&self.menu, item, delta);
        self.publish();
    }

    /// Add one unit of `item`.
    pub fn add(&mut self, item: MenuItemId) {
        self.add_item(item, 1);
    }

    /// Remove the line for `item`.
    pub fn remove_item(&mut self, item: MenuItemId) -> bool {
        let removed = self.cart.remove_item(item);
        self.publish();

        removed
    }

    /// Empty the cart and start the checkout over.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.wizard.reset(&self.settings);
        self.publish();
    }

    /// Drop unavailable lines and accept current prices.
    pub fn refresh_cart(&mut self) -> RefreshReport {
        let report = self.cart.refresh(&self.menu);
        self.publish();

        report
    }

    /// Replace the menu, e.g. after the restaurant edited it.
    pub fn replace_menu(&mut self, menu: Menu) {
        self.menu = menu;
        self.publish();
    }

    /// Fetch the menu again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Menu`] when the menu cannot be fetched; the current menu is
    /// kept.
    pub async fn reload_menu(&mut self) -> Result<(), SessionError> {
        let api = self.gateway.api();
        let menu = api
            .get_menu(self.restaurant())
            .await
            .map_err(SessionError::Menu)?;

        self.replace_menu(menu);

        Ok(())
    }

    /// Open the checkout; it always starts at the list.
    pub fn open_checkout(&mut self) -> WizardStep {
        self.wizard.rewind();
        self.checkout_open = true;

        self.wizard.step()
    }

    /// Close the checkout, keeping the draft for next time.
    pub fn close_checkout(&mut self) {
        self.checkout_open = false;
        self.wizard.rewind();
    }

    /// Check if the checkout is open.
    pub fn is_checkout_open(&self) -> bool {
        self.checkout_open
    }

    fn dispatch(&mut self, event: WizardEvent) -> Transition {
        let snapshot = self.cart.snapshot(&self.menu);

        self.wizard.handle(event, &snapshot, &self.settings)
    }

    /// List → Fulfillment.
    pub fn proceed(&mut self) -> Transition {
        self.dispatch(WizardEvent::Proceed)
    }

    /// Fulfillment → Details.
    pub fn continue_to_details(&mut self) -> Transition {
        self.dispatch(WizardEvent::Continue)
    }

    /// One step back.
    pub fn back(&mut self) -> Transition {
        self.dispatch(WizardEvent::Back)
    }

    /// Confirmation → List with an empty cart and a fresh draft.
    pub fn new_order(&mut self) -> Transition {
        let outcome = self.dispatch(WizardEvent::NewOrder);

        if matches!(outcome, Transition::Moved(_)) {
            self.cart.clear();
            self.publish();
        }

        outcome
    }

    /// Select a fulfillment method.
    pub fn select_method(&mut self, method: FulfillmentMethod) -> Reconciliation {
        self.wizard.select_method(method, &self.settings)
    }

    /// Select a timing mode.
    pub fn select_timing(&mut self, timing: TimingMode) -> Reconciliation {
        self.wizard.select_timing(timing, &self.settings)
    }

    /// Select a payment method.
    pub fn select_payment(&mut self, payment: PaymentMethod) -> Reconciliation {
        self.wizard.select_payment(payment, &self.settings)
    }

    /// Free-text fields of the draft.
    pub fn draft_mut(&mut self) -> &mut CheckoutDraft {
        self.wizard.draft_mut()
    }

    /// Validate and prepare the order for sending.
    ///
    /// The returned submission does not borrow the session; send it with
    /// [`PendingSubmission::send`] and hand the outcome to
    /// [`Storefront::complete_submission`]. Until then further attempts are refused.
    ///
    /// # Errors
    ///
    /// Returns every guard failure when the order may not be placed.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, Vec<GuardFailure>> {
        let snapshot = self.cart.snapshot(&self.menu);
        let ticket = self.wizard.begin_submission(&snapshot, &self.settings)?;
        let draft = self.wizard.draft();

        Ok(PendingSubmission::prepare(
            ticket,
            &snapshot,
            draft,
            self.settings.get(draft.method),
            self.currency,
        ))
    }

    /// Gateway orders are sent through.
    pub fn gateway(&self) -> OrderGateway {
        self.gateway.clone()
    }

    /// Apply the answer to a submission.
    ///
    /// On success the cart is emptied and the draft reset, even when the checkout was closed
    /// in the meantime. On failure nothing but the error message changes.
    pub fn complete_submission(&mut self, outcome: SubmissionOutcome) -> SubmissionStatus {
        match outcome.result {
            Ok(confirmation) => {
                if !self.wizard.submission_succeeded(
                    outcome.ticket,
                    confirmation.clone(),
                    &self.settings,
                ) {
                    return SubmissionStatus::Stale;
                }

                if !self.checkout_open {
                    debug!(
                        order = %confirmation.order.order_number,
                        "order confirmed after checkout was closed"
                    );
                }

                self.cart.clear();
                self.publish();

                SubmissionStatus::Confirmed(confirmation)
            }
            Err(error) => {
                if self.wizard.submission_failed(outcome.ticket, error.clone()) {
                    SubmissionStatus::Failed(error)
                } else {
                    SubmissionStatus::Stale
                }
            }
        }
    }

    /// Validate, send and apply in one go.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Blocked`] when a guard refuses, and
    /// [`CheckoutError::Submission`] when the backend does not accept the order.
    pub async fn submit(&mut self) -> Result<OrderConfirmation, CheckoutError> {
        let pending = self.begin_submission().map_err(CheckoutError::Blocked)?;
        let gateway = self.gateway();
        let outcome = pending.send(&gateway).await;

        match self.complete_submission(outcome) {
            SubmissionStatus::Confirmed(confirmation) => Ok(confirmation),
            SubmissionStatus::Failed(error) => Err(error.into()),
            SubmissionStatus::Stale => Err(CheckoutError::Stale),
        }
    }
}

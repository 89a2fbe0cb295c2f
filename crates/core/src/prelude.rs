//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiError, Restaurant, RestaurantId, StorefrontApi},
    cart::{Cart, CartLine, CartSnapshot, RefreshReport, SnapshotLine},
    checkout::{
        Address, AddressField, CheckoutDraft, CheckoutWizard, DraftField, GuardFailure,
        Reconciliation, Transition, WizardEvent, WizardStep,
    },
    fulfillment::{
        FulfillmentConfig, FulfillmentMethod, FulfillmentSettings, PaymentMethod, TimingMode,
    },
    menu::{Category, Menu, MenuItem, MenuItemId},
    money::{Amount, format_amount},
    orders::{
        OrderConfirmation, OrderGateway, OrderRequest, OrderResult, OrderTotals,
        PendingSubmission, SubmissionError, SubmissionOutcome,
    },
    session::{CartSummary, CheckoutError, SessionError, Storefront, SubmissionStatus},
};

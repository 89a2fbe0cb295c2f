//! Guards
//!
//! Each forward step of the wizard is gated by a guard that inspects the cart snapshot, the
//! draft and the resolved fulfillment settings. Guards never mutate anything; they return
//! every failure they find so a form can mark all offending fields at once.

use thiserror::Error;

use crate::{
    cart::CartSnapshot,
    checkout::{
        draft::{AddressField, CheckoutDraft},
        step::WizardStep,
    },
    fulfillment::{FulfillmentMethod, FulfillmentSettings, PaymentMethod, TimingMode},
    menu::MenuItemId,
};

/// Outcome of a guard: every failure found, in field order.
pub type GuardResult = Result<(), Vec<GuardFailure>>;

/// Part of the checkout a guard failure points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// Cart contents
    Cart,

    /// Fulfillment method
    Method,

    /// Timing mode
    Timing,

    /// Desired time
    DesiredTime,

    /// Customer name
    Name,

    /// Customer phone
    Phone,

    /// One part of the address
    Address(AddressField),

    /// Payment method
    Payment,
}

/// Reason a wizard step refuses to advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardFailure {
    /// Nothing to order
    #[error("your cart is empty")]
    EmptyCart,

    /// Some lines reference items that are gone or hidden
    #[error("some items are no longer available, update your cart")]
    UnavailableItems(Vec<MenuItemId>),

    /// Some lines were recorded at a different price
    #[error("prices have changed, update your cart")]
    PricesChanged(Vec<MenuItemId>),

    /// The restaurant switched the method off
    #[error("{0} is not offered by this restaurant")]
    MethodDisabled(FulfillmentMethod),

    /// The method is enabled but allows no timing mode
    #[error("{0} is temporarily unavailable")]
    MethodUnavailable(FulfillmentMethod),

    /// The selected timing mode is not allowed for the method
    #[error("{timing} is not available for {method}")]
    TimingNotAllowed {
        /// Method
        method: FulfillmentMethod,

        /// Rejected timing mode
        timing: TimingMode,
    },

    /// Customer name is blank
    #[error("enter your name")]
    MissingName,

    /// Customer phone is blank
    #[error("enter your phone number")]
    MissingPhone,

    /// A required part of the delivery address is blank
    #[error("enter the delivery {0}")]
    MissingAddress(AddressField),

    /// Scheduled timing without a desired time
    #[error("choose a time")]
    MissingDesiredTime,

    /// The selected payment method is not accepted for the method
    #[error("{payment} payment is not accepted for {method}")]
    PaymentNotAllowed {
        /// Method
        method: FulfillmentMethod,

        /// Rejected payment method
        payment: PaymentMethod,
    },

    /// An earlier submission has not been answered yet
    #[error("your order is already being placed")]
    SubmissionInFlight,

    /// The event does not apply at the current step
    #[error("cannot do that from the {0} step")]
    WrongStep(WizardStep),
}

impl GuardFailure {
    /// Field to highlight, if the failure points at one.
    pub fn field(&self) -> Option<DraftField> {
        match self {
            Self::EmptyCart | Self::UnavailableItems(_) | Self::PricesChanged(_) => {
                Some(DraftField::Cart)
            }
            Self::MethodDisabled(_) | Self::MethodUnavailable(_) => Some(DraftField::Method),
            Self::TimingNotAllowed { .. } => Some(DraftField::Timing),
            Self::MissingName => Some(DraftField::Name),
            Self::MissingPhone => Some(DraftField::Phone),
            Self::MissingAddress(part) => Some(DraftField::Address(*part)),
            Self::MissingDesiredTime => Some(DraftField::DesiredTime),
            Self::PaymentNotAllowed { .. } => Some(DraftField::Payment),
            Self::SubmissionInFlight | Self::WrongStep(_) => None,
        }
    }
}

fn finish(failures: Vec<GuardFailure>) -> GuardResult {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

fn cart_failures(cart: &CartSnapshot, failures: &mut Vec<GuardFailure>) {
    if cart.is_empty() {
        failures.push(GuardFailure::EmptyCart);
        return;
    }

    let unavailable = cart.unavailable_items();

    if !unavailable.is_empty() {
        failures.push(GuardFailure::UnavailableItems(unavailable));
    }

    let repriced = cart.repriced_items();

    if !repriced.is_empty() {
        failures.push(GuardFailure::PricesChanged(repriced));
    }
}

fn method_failures(
    draft: &CheckoutDraft,
    settings: &FulfillmentSettings,
    failures: &mut Vec<GuardFailure>,
) {
    let config = settings.get(draft.method);

    if !config.enabled {
        failures.push(GuardFailure::MethodDisabled(draft.method));
    } else if config.legal_timing_modes().is_empty() {
        failures.push(GuardFailure::MethodUnavailable(draft.method));
    } else if !config.allows_timing(draft.timing) {
        failures.push(GuardFailure::TimingNotAllowed {
            method: draft.method,
            timing: draft.timing,
        });
    }
}

/// List → Fulfillment: the cart must be orderable as it stands.
///
/// Beyond a non-empty cart this also refuses unavailable or repriced lines, so the guest
/// refreshes the cart before filling in details rather than at "place order". The submit guard
/// checks the same again.
pub fn check_proceed(cart: &CartSnapshot) -> GuardResult {
    let mut failures = Vec::new();

    cart_failures(cart, &mut failures);

    finish(failures)
}

/// Fulfillment → Details: the method must be enabled and the timing mode legal for it.
pub fn check_continue(draft: &CheckoutDraft, settings: &FulfillmentSettings) -> GuardResult {
    let mut failures = Vec::new();

    method_failures(draft, settings, &mut failures);

    finish(failures)
}

/// Details → submission: everything above, plus the customer fields.
pub fn check_submit(
    cart: &CartSnapshot,
    draft: &CheckoutDraft,
    settings: &FulfillmentSettings,
) -> GuardResult {
    let mut failures = Vec::new();

    cart_failures(cart, &mut failures);
    method_failures(draft, settings, &mut failures);

    if draft.customer_name.trim().is_empty() {
        failures.push(GuardFailure::MissingName);
    }

    if draft.phone.trim().is_empty() {
        failures.push(GuardFailure::MissingPhone);
    }

    if draft.method == FulfillmentMethod::Delivery {
        failures.extend(
            draft
                .address
                .missing_fields()
                .into_iter()
                .map(GuardFailure::MissingAddress),
        );
    }

    if draft.timing == TimingMode::Scheduled && draft.desired_time.trim().is_empty() {
        failures.push(GuardFailure::MissingDesiredTime);
    }

    if !settings
        .get(draft.method)
        .legal_payment_methods()
        .contains(&draft.payment)
    {
        failures.push(GuardFailure::PaymentNotAllowed {
            method: draft.method,
            payment: draft.payment,
        });
    }

    finish(failures)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        fixtures::{dish, item_id, menu_of, settings_from},
    };

    use super::*;

    fn filled_draft(settings: &FulfillmentSettings) -> CheckoutDraft {
        let mut draft = CheckoutDraft::new(settings);
        draft.customer_name = "Ivan".to_string();
        draft.phone = "+7 900 000-00-00".to_string();
        draft.address.city = "Kazan".to_string();
        draft.address.street = "Baumana".to_string();
        draft.address.house = "5".to_string();

        draft
    }

    #[test]
    fn empty_cart_cannot_proceed() {
        assert_eq!(
            check_proceed(&CartSnapshot::default()),
            Err(vec![GuardFailure::EmptyCart])
        );
    }

    #[test]
    fn repriced_and_missing_items_block_proceed() -> TestResult {
        let mut cart = Cart::new();
        cart.add(&menu_of([dish(1, "Plov", 400), dish(2, "Lagman", 350)]), item_id(1));
        cart.add(&menu_of([dish(1, "Plov", 400), dish(2, "Lagman", 350)]), item_id(2));

        let changed = menu_of([dish(1, "Plov", 450)]);
        let failures = check_proceed(&cart.snapshot(&changed))
            .err()
            .ok_or("guard should fail")?;

        assert_eq!(
            failures,
            [
                GuardFailure::UnavailableItems(vec![item_id(2)]),
                GuardFailure::PricesChanged(vec![item_id(1)]),
            ]
        );
        assert!(failures.iter().all(|f| f.field() == Some(DraftField::Cart)));

        Ok(())
    }

    #[test]
    fn disabled_method_blocks_continue() {
        let settings = settings_from(&json!({ "delivery": { "enabled": false } }));
        let mut draft = CheckoutDraft::new(&settings);
        draft.method = FulfillmentMethod::Delivery;

        assert_eq!(
            check_continue(&draft, &settings),
            Err(vec![GuardFailure::MethodDisabled(FulfillmentMethod::Delivery)])
        );
    }

    #[test]
    fn method_without_timing_is_unavailable() {
        let settings = settings_from(&json!({
            "delivery": { "allow_asap": false, "allow_scheduled": false }
        }));
        let draft = CheckoutDraft::new(&settings);

        assert_eq!(
            check_continue(&draft, &settings),
            Err(vec![GuardFailure::MethodUnavailable(FulfillmentMethod::Delivery)])
        );
    }

    #[test]
    fn illegal_timing_blocks_continue() {
        let settings = settings_from(&json!({ "delivery": { "allow_asap": false } }));
        let mut draft = CheckoutDraft::new(&settings);
        draft.timing = TimingMode::Asap;

        assert_eq!(
            check_continue(&draft, &settings),
            Err(vec![GuardFailure::TimingNotAllowed {
                method: FulfillmentMethod::Delivery,
                timing: TimingMode::Asap,
            }])
        );
    }

    #[test]
    fn submit_reports_every_missing_field() -> TestResult {
        let menu = menu_of([dish(1, "Plov", 400)]);
        let mut cart = Cart::new();
        cart.add(&menu, item_id(1));

        let settings = FulfillmentSettings::default();
        let mut draft = CheckoutDraft::new(&settings);
        draft.select_timing(TimingMode::Scheduled, &settings);

        let failures = check_submit(&cart.snapshot(&menu), &draft, &settings)
            .err()
            .ok_or("guard should fail")?;

        assert_eq!(
            failures,
            [
                GuardFailure::MissingName,
                GuardFailure::MissingPhone,
                GuardFailure::MissingAddress(AddressField::City),
                GuardFailure::MissingAddress(AddressField::Street),
                GuardFailure::MissingAddress(AddressField::House),
                GuardFailure::MissingDesiredTime,
            ]
        );
        assert_eq!(
            failures.get(2).and_then(GuardFailure::field),
            Some(DraftField::Address(AddressField::City))
        );

        Ok(())
    }

    #[test]
    fn pickup_does_not_need_an_address() {
        let menu = menu_of([dish(1, "Plov", 400)]);
        let mut cart = Cart::new();
        cart.add(&menu, item_id(1));

        let settings = FulfillmentSettings::default();
        let mut draft = filled_draft(&settings);
        draft.address = Default::default();
        draft.select_method(FulfillmentMethod::Pickup, &settings);

        assert_eq!(check_submit(&cart.snapshot(&menu), &draft, &settings), Ok(()));
    }

    #[test]
    fn payment_outside_the_allowed_list_blocks_submit() {
        let menu = menu_of([dish(1, "Plov", 400)]);
        let mut cart = Cart::new();
        cart.add(&menu, item_id(1));

        let settings = settings_from(&json!({ "delivery": { "payment_methods": ["cash"] } }));
        let mut draft = filled_draft(&settings);
        draft.payment = PaymentMethod::Transfer;

        assert_eq!(
            check_submit(&cart.snapshot(&menu), &draft, &settings),
            Err(vec![GuardFailure::PaymentNotAllowed {
                method: FulfillmentMethod::Delivery,
                payment: PaymentMethod::Transfer,
            }])
        );
    }
}

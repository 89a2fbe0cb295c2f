//! Checkout Wizard

use tracing::{debug, info, warn};

use crate::{
    cart::CartSnapshot,
    checkout::{
        draft::{CheckoutDraft, Reconciliation},
        guards::{self, GuardFailure},
        step::WizardStep,
    },
    fulfillment::{FulfillmentMethod, FulfillmentSettings, PaymentMethod, TimingMode},
    orders::{OrderConfirmation, SubmissionError},
};

/// Something the guest (or the order gateway) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    /// "Checkout" from the cart list
    Proceed,

    /// "Continue" from fulfillment selection
    Continue,

    /// "Place order" from the details form
    Submit,

    /// One step back
    Back,

    /// Start over after a confirmation
    NewOrder,

    /// The gateway accepted the order; applied through
    /// [`CheckoutWizard::submission_succeeded`]
    SubmissionSucceeded,

    /// The gateway failed; applied through [`CheckoutWizard::submission_failed`]
    SubmissionFailed,
}

/// Everything the guard table reads.
#[derive(Debug, Clone, Copy)]
pub struct GuardInputs<'a> {
    /// Cart joined against the live menu
    pub cart: &'a CartSnapshot,

    /// Current draft
    pub draft: &'a CheckoutDraft,

    /// Resolved fulfillment settings
    pub settings: &'a FulfillmentSettings,

    /// Whether a submission is awaiting its answer
    pub submission_in_flight: bool,
}

/// Result of feeding one event to [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Advance (or go back) to the given step
    Moved(WizardStep),

    /// The event does not apply here; nothing changes
    Stayed,

    /// A guard refused
    Blocked(Vec<GuardFailure>),

    /// Guards passed, the order may be sent
    BeginSubmission,
}

/// Pure step function of the wizard.
///
/// A success moves to the confirmation from any open step while a submission is in flight;
/// at the list the checkout has been closed and the step stays put. A failure never moves.
pub fn transition(step: WizardStep, event: WizardEvent, inputs: &GuardInputs<'_>) -> Transition {
    use WizardEvent as E;
    use WizardStep as S;

    let guarded = |result: guards::GuardResult, next: Transition| match result {
        Ok(()) => next,
        Err(failures) => Transition::Blocked(failures),
    };

    match (step, event) {
        (S::List, E::Proceed) => guarded(
            guards::check_proceed(inputs.cart),
            Transition::Moved(S::Fulfillment),
        ),
        (S::Fulfillment, E::Continue) => guarded(
            guards::check_continue(inputs.draft, inputs.settings),
            Transition::Moved(S::Details),
        ),
        (S::Details, E::Submit) if inputs.submission_in_flight => {
            Transition::Blocked(vec![GuardFailure::SubmissionInFlight])
        }
        (S::Details, E::Submit) => guarded(
            guards::check_submit(inputs.cart, inputs.draft, inputs.settings),
            Transition::BeginSubmission,
        ),
        (S::Fulfillment | S::Details, E::SubmissionSucceeded) if inputs.submission_in_flight => {
            Transition::Moved(S::Confirmation)
        }
        (S::Fulfillment | S::Details | S::Confirmation, E::Back) => {
            Transition::Moved(step.previous())
        }
        (S::Confirmation, E::NewOrder) => Transition::Moved(S::List),
        (_, E::Submit) => Transition::Blocked(vec![GuardFailure::WrongStep(step)]),
        _ => Transition::Stayed,
    }
}

/// Identifies one submission attempt, so a late answer can be matched to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

impl SubmissionTicket {
    pub(crate) fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Sequence number of the attempt.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Stateful checkout wizard: current step, draft, and submission bookkeeping.
#[derive(Debug, Clone)]
pub struct CheckoutWizard {
    step: WizardStep,
    draft: CheckoutDraft,
    in_flight: Option<SubmissionTicket>,
    issued: u64,
    confirmation: Option<OrderConfirmation>,
    failures: Vec<GuardFailure>,
    submission_error: Option<SubmissionError>,
}

impl CheckoutWizard {
    /// Wizard at the list step with a fresh draft.
    pub fn new(settings: &FulfillmentSettings) -> Self {
        Self {
            step: WizardStep::List,
            draft: CheckoutDraft::new(settings),
            in_flight: None,
            issued: 0,
            confirmation: None,
            failures: Vec::new(),
            submission_error: None,
        }
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Current draft.
    pub fn draft(&self) -> &CheckoutDraft {
        &self.draft
    }

    /// Mutable access to the free-text fields of the draft.
    ///
    /// Method, timing and payment changes should go through the `select_*` methods so the
    /// draft is reconciled.
    pub fn draft_mut(&mut self) -> &mut CheckoutDraft {
        &mut self.draft
    }

    /// Failures from the last blocked event.
    pub fn failures(&self) -> &[GuardFailure] {
        &self.failures
    }

    /// Error from the last failed submission.
    pub fn submission_error(&self) -> Option<&SubmissionError> {
        self.submission_error.as_ref()
    }

    /// The most recent confirmed order.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Check if a submission is awaiting its answer.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Notice to show at the fulfillment step, if the selected method cannot be used.
    pub fn method_notice(&self, settings: &FulfillmentSettings) -> Option<GuardFailure> {
        guards::check_continue(&self.draft, settings)
            .err()
            .and_then(|failures| failures.into_iter().next())
            .filter(|failure| {
                matches!(
                    failure,
                    GuardFailure::MethodDisabled(_) | GuardFailure::MethodUnavailable(_)
                )
            })
    }

    /// Select a fulfillment method.
    pub fn select_method(
        &mut self,
        method: FulfillmentMethod,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.draft.select_method(method, settings)
    }

    /// Select a timing mode.
    pub fn select_timing(
        &mut self,
        timing: TimingMode,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.draft.select_timing(timing, settings)
    }

    /// Select a payment method.
    pub fn select_payment(
        &mut self,
        payment: PaymentMethod,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.draft.select_payment(payment, settings)
    }

    /// Feed an event through the guard table and apply the result.
    ///
    /// The draft is reconciled against `settings` first, so guards always see a draft that
    /// has had its chance to auto-correct. A [`Transition::BeginSubmission`] marks a
    /// submission in flight; use [`CheckoutWizard::begin_submission`] to obtain its ticket.
    ///
    /// Gateway outcomes carry a ticket and are ignored here; see
    /// [`CheckoutWizard::submission_succeeded`] and [`CheckoutWizard::submission_failed`].
    pub fn handle(
        &mut self,
        event: WizardEvent,
        cart: &CartSnapshot,
        settings: &FulfillmentSettings,
    ) -> Transition {
        if matches!(
            event,
            WizardEvent::SubmissionSucceeded | WizardEvent::SubmissionFailed
        ) {
            debug!(?event, "submission outcome without a ticket ignored");
            return Transition::Stayed;
        }

        self.draft.reconcile(settings);

        let inputs = GuardInputs {
            cart,
            draft: &self.draft,
            settings,
            submission_in_flight: self.in_flight.is_some(),
        };

        let outcome = transition(self.step, event, &inputs);

        match &outcome {
            Transition::Moved(next) => {
                debug!(from = %self.step, to = %next, ?event, "checkout step changed");

                if self.step == WizardStep::Confirmation {
                    self.confirmation = None;
                }

                if event == WizardEvent::NewOrder {
                    self.draft = CheckoutDraft::new(settings);
                }

                self.step = *next;
                self.failures.clear();
            }
            Transition::Blocked(failures) => {
                debug!(step = %self.step, ?event, ?failures, "checkout step blocked");

                self.failures.clone_from(failures);
            }
            Transition::BeginSubmission => {
                self.issued += 1;
                self.in_flight = Some(SubmissionTicket::new(self.issued));
                self.failures.clear();
                self.submission_error = None;
            }
            Transition::Stayed => {}
        }

        outcome
    }

    /// Run the submit guard and, when it passes, mark a submission in flight.
    ///
    /// # Errors
    ///
    /// Returns every guard failure when the order may not be sent, including
    /// [`GuardFailure::SubmissionInFlight`] while an earlier attempt is pending.
    pub fn begin_submission(
        &mut self,
        cart: &CartSnapshot,
        settings: &FulfillmentSettings,
    ) -> Result<SubmissionTicket, Vec<GuardFailure>> {
        match self.handle(WizardEvent::Submit, cart, settings) {
            Transition::BeginSubmission => self
                .in_flight
                .ok_or_else(|| vec![GuardFailure::SubmissionInFlight]),
            Transition::Blocked(failures) => Err(failures),
            Transition::Moved(_) | Transition::Stayed => {
                Err(vec![GuardFailure::WrongStep(self.step)])
            }
        }
    }

    /// Record a confirmed order.
    ///
    /// Resets the draft and moves to the confirmation while the checkout is open, even if the
    /// guest stepped back during the flight. A confirmation arriving after the checkout was
    /// closed is still recorded. Returns `false` when `ticket` is not the pending submission.
    pub fn submission_succeeded(
        &mut self,
        ticket: SubmissionTicket,
        confirmation: OrderConfirmation,
        settings: &FulfillmentSettings,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            warn!(ticket = ticket.get(), "ignoring confirmation for a stale submission");
            return false;
        }

        let unused_cart = CartSnapshot::default();
        let inputs = GuardInputs {
            cart: &unused_cart,
            draft: &self.draft,
            settings,
            submission_in_flight: true,
        };

        if let Transition::Moved(next) =
            transition(self.step, WizardEvent::SubmissionSucceeded, &inputs)
        {
            debug!(from = %self.step, to = %next, "checkout step changed");
            self.step = next;
        }

        self.in_flight = None;

        info!(
            order = %confirmation.order.order_number,
            total = confirmation.totals.payable,
            "order confirmed"
        );

        self.draft = CheckoutDraft::new(settings);
        self.confirmation = Some(confirmation);
        self.failures.clear();
        self.submission_error = None;

        true
    }

    /// Record a failed submission; the step and draft stay as they are.
    ///
    /// Returns `false` when `ticket` is not the pending submission.
    pub fn submission_failed(&mut self, ticket: SubmissionTicket, error: SubmissionError) -> bool {
        if self.in_flight != Some(ticket) {
            warn!(ticket = ticket.get(), %error, "ignoring failure for a stale submission");
            return false;
        }

        self.in_flight = None;

        warn!(%error, "order submission failed");

        self.submission_error = Some(error);

        true
    }

    /// Return to the list without touching the draft, as when the checkout is closed.
    pub fn rewind(&mut self) {
        self.step = WizardStep::List;
        self.failures.clear();
    }

    /// Start over with a fresh draft at the list step.
    ///
    /// A pending submission stays pending.
    pub fn reset(&mut self, settings: &FulfillmentSettings) {
        self.step = WizardStep::List;
        self.draft = CheckoutDraft::new(settings);
        self.confirmation = None;
        self.failures.clear();
        self.submission_error = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        fixtures::{confirmation, dish, item_id, menu_of, pickup_scheduled_only, settings_from},
        menu::Menu,
    };

    use super::*;

    fn one_item_cart() -> (Menu, CartSnapshot) {
        let menu = menu_of([dish(1, "Khachapuri", 600)]);
        let mut cart = Cart::new();
        cart.add(&menu, item_id(1));
        let snapshot = cart.snapshot(&menu);

        (menu, snapshot)
    }

    fn ready_wizard(settings: &FulfillmentSettings, cart: &CartSnapshot) -> CheckoutWizard {
        let mut wizard = CheckoutWizard::new(settings);
        wizard.handle(WizardEvent::Proceed, cart, settings);
        wizard.handle(WizardEvent::Continue, cart, settings);

        let draft = wizard.draft_mut();
        draft.customer_name = "Nino".to_string();
        draft.phone = "+995 555 000".to_string();
        draft.address.city = "Tbilisi".to_string();
        draft.address.street = "Rustaveli".to_string();
        draft.address.house = "1".to_string();

        wizard
    }

    #[test]
    fn events_outside_their_step_change_nothing() {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let draft = CheckoutDraft::new(&settings);
        let inputs = GuardInputs {
            cart: &cart,
            draft: &draft,
            settings: &settings,
            submission_in_flight: false,
        };

        assert_eq!(
            transition(WizardStep::List, WizardEvent::Continue, &inputs),
            Transition::Stayed
        );
        assert_eq!(
            transition(WizardStep::Fulfillment, WizardEvent::NewOrder, &inputs),
            Transition::Stayed
        );
        assert_eq!(
            transition(WizardStep::List, WizardEvent::SubmissionSucceeded, &inputs),
            Transition::Stayed
        );
        assert_eq!(
            transition(WizardStep::List, WizardEvent::Back, &inputs),
            Transition::Stayed
        );
    }

    #[test]
    fn empty_cart_blocks_proceed() {
        let settings = FulfillmentSettings::default();
        let mut wizard = CheckoutWizard::new(&settings);

        let outcome = wizard.handle(WizardEvent::Proceed, &CartSnapshot::default(), &settings);

        assert_eq!(outcome, Transition::Blocked(vec![GuardFailure::EmptyCart]));
        assert_eq!(wizard.step(), WizardStep::List);
        assert_eq!(wizard.failures(), [GuardFailure::EmptyCart]);
    }

    #[test]
    fn continue_reconciles_before_guarding() {
        let settings = pickup_scheduled_only();
        let (_, cart) = one_item_cart();
        let mut wizard = CheckoutWizard::new(&settings);
        wizard.handle(WizardEvent::Proceed, &cart, &settings);

        wizard.draft_mut().method = FulfillmentMethod::Pickup;

        let outcome = wizard.handle(WizardEvent::Continue, &cart, &settings);

        assert_eq!(outcome, Transition::Moved(WizardStep::Details));
        assert_eq!(wizard.draft().timing, TimingMode::Scheduled);
    }

    #[test]
    fn back_keeps_the_draft() {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);

        wizard.handle(WizardEvent::Back, &cart, &settings);
        assert_eq!(wizard.step(), WizardStep::Fulfillment);

        wizard.handle(WizardEvent::Back, &cart, &settings);
        assert_eq!(wizard.step(), WizardStep::List);
        assert_eq!(wizard.draft().customer_name, "Nino");
    }

    #[test]
    fn second_submit_is_debounced() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);

        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        assert!(wizard.is_submitting());
        assert_eq!(
            wizard.begin_submission(&cart, &settings),
            Err(vec![GuardFailure::SubmissionInFlight])
        );
        assert_eq!(ticket.get(), 1);

        Ok(())
    }

    #[test]
    fn success_moves_to_confirmation_and_resets_draft() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        assert!(wizard.submission_succeeded(ticket, confirmation("A-17", 600), &settings));

        assert_eq!(wizard.step(), WizardStep::Confirmation);
        assert!(!wizard.is_submitting());
        assert!(wizard.draft().customer_name.is_empty());
        assert_eq!(
            wizard.confirmation().map(|c| c.order.order_number.as_str()),
            Some("A-17")
        );

        wizard.handle(WizardEvent::NewOrder, &cart, &settings);

        assert_eq!(wizard.step(), WizardStep::List);
        assert!(wizard.confirmation().is_none());

        Ok(())
    }

    #[test]
    fn success_after_stepping_back_still_shows_the_confirmation() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        wizard.handle(WizardEvent::Back, &cart, &settings);
        assert_eq!(wizard.step(), WizardStep::Fulfillment);

        assert!(wizard.submission_succeeded(ticket, confirmation("Z-1", 600), &settings));
        assert_eq!(wizard.step(), WizardStep::Confirmation);
        assert_eq!(
            wizard.confirmation().map(|c| c.order.order_number.as_str()),
            Some("Z-1")
        );

        Ok(())
    }

    #[test]
    fn untracked_outcome_events_do_not_move_or_unlock() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        assert_eq!(
            wizard.handle(WizardEvent::SubmissionSucceeded, &cart, &settings),
            Transition::Stayed
        );
        assert_eq!(
            wizard.handle(WizardEvent::SubmissionFailed, &cart, &settings),
            Transition::Stayed
        );
        assert_eq!(wizard.step(), WizardStep::Details);
        assert!(wizard.is_submitting());

        assert!(wizard.submission_succeeded(ticket, confirmation("A-2", 600), &settings));
        wizard.handle(WizardEvent::NewOrder, &cart, &settings);
        wizard.handle(WizardEvent::Proceed, &cart, &settings);
        wizard.handle(WizardEvent::Continue, &cart, &settings);

        let draft = wizard.draft_mut();
        draft.customer_name = "Nino".to_string();
        draft.phone = "+995 555 000".to_string();
        draft.address.city = "Tbilisi".to_string();
        draft.address.street = "Rustaveli".to_string();
        draft.address.house = "1".to_string();

        let next = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        assert_eq!(next.get(), 2);

        Ok(())
    }

    #[test]
    fn success_without_a_flight_is_not_a_transition() {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let draft = CheckoutDraft::new(&settings);
        let inputs = GuardInputs {
            cart: &cart,
            draft: &draft,
            settings: &settings,
            submission_in_flight: false,
        };

        assert_eq!(
            transition(WizardStep::Details, WizardEvent::SubmissionSucceeded, &inputs),
            Transition::Stayed
        );
    }

    #[test]
    fn failure_stays_on_details_with_draft_intact() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        let error = SubmissionError::Rejected {
            message: "Restaurant is closed".to_string(),
        };

        assert!(wizard.submission_failed(ticket, error.clone()));
        assert_eq!(wizard.step(), WizardStep::Details);
        assert_eq!(wizard.draft().customer_name, "Nino");
        assert_eq!(wizard.submission_error(), Some(&error));
        assert!(!wizard.is_submitting());

        Ok(())
    }

    #[test]
    fn late_success_after_closing_is_recorded_without_jumping_steps() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        wizard.rewind();

        assert!(wizard.submission_succeeded(ticket, confirmation("B-2", 600), &settings));
        assert_eq!(wizard.step(), WizardStep::List);
        assert!(wizard.confirmation().is_some());

        Ok(())
    }

    #[test]
    fn stale_tickets_are_ignored() -> TestResult {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = ready_wizard(&settings, &cart);
        let ticket = wizard
            .begin_submission(&cart, &settings)
            .map_err(|failures| format!("{failures:?}"))?;

        assert!(wizard.submission_failed(ticket, SubmissionError::Network {
            detail: "timeout".to_string(),
        }));
        assert!(!wizard.submission_succeeded(ticket, confirmation("C-3", 600), &settings));
        assert_eq!(wizard.step(), WizardStep::Details);

        Ok(())
    }

    #[test]
    fn method_notice_reports_unavailable_method() {
        let settings = settings_from(&json!({
            "delivery": {
                "allow_asap": false,
                "allow_scheduled": false,
                "message": "Kitchen overloaded"
            }
        }));
        let wizard = CheckoutWizard::new(&settings);

        assert_eq!(
            wizard.method_notice(&settings),
            Some(GuardFailure::MethodUnavailable(FulfillmentMethod::Delivery))
        );
    }

    #[test]
    fn submit_outside_details_is_blocked() {
        let settings = FulfillmentSettings::default();
        let (_, cart) = one_item_cart();
        let mut wizard = CheckoutWizard::new(&settings);

        assert_eq!(
            wizard.begin_submission(&cart, &settings),
            Err(vec![GuardFailure::WrongStep(WizardStep::List)])
        );
    }
}

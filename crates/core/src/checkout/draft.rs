//! Checkout Draft

use std::fmt;

use smallvec::SmallVec;
use tracing::debug;

use crate::fulfillment::{
    FulfillmentConfig, FulfillmentMethod, FulfillmentSettings, PaymentMethod, TimingMode,
};

/// Required parts of a delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// City
    City,

    /// Street
    Street,

    /// House number
    House,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::City => "city",
            Self::Street => "street",
            Self::House => "house",
        })
    }
}

/// Structured delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// City
    pub city: String,

    /// Street
    pub street: String,

    /// House number
    pub house: String,

    /// Apartment or office, optional
    pub apartment: String,
}

impl Address {
    /// Required parts that are blank.
    pub fn missing_fields(&self) -> SmallVec<[AddressField; 3]> {
        [
            (AddressField::City, &self.city),
            (AddressField::Street, &self.street),
            (AddressField::House, &self.house),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Check if city, street and house are all filled in.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Single-line form sent with the order.
    pub fn to_line(&self) -> String {
        [&self.city, &self.street, &self.house, &self.apartment]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Automatic corrections applied by [`CheckoutDraft::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Timing switched from the first mode to the second
    pub timing: Option<(TimingMode, TimingMode)>,

    /// Payment switched from the first method to the second
    pub payment: Option<(PaymentMethod, PaymentMethod)>,

    /// The selected method allows no timing mode at all
    pub method_unavailable: bool,
}

impl Reconciliation {
    /// Check if nothing was corrected and nothing is blocked.
    pub fn is_clean(&self) -> bool {
        self.timing.is_none() && self.payment.is_none() && !self.method_unavailable
    }
}

/// Form state of the active checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDraft {
    /// Chosen fulfillment method
    pub method: FulfillmentMethod,

    /// Chosen timing mode
    pub timing: TimingMode,

    /// Desired time for scheduled orders, free text
    pub desired_time: String,

    /// Customer name
    pub customer_name: String,

    /// Customer phone
    pub phone: String,

    /// Delivery address, required for delivery only
    pub address: Address,

    /// Chosen payment method
    pub payment: PaymentMethod,

    /// Free-text comment
    pub comment: String,
}

impl CheckoutDraft {
    /// Empty draft on the restaurant's preferred method, already reconciled.
    pub fn new(settings: &FulfillmentSettings) -> Self {
        let mut draft = Self {
            method: settings.preferred_method(),
            timing: TimingMode::Asap,
            desired_time: String::new(),
            customer_name: String::new(),
            phone: String::new(),
            address: Address::default(),
            payment: PaymentMethod::Card,
            comment: String::new(),
        };

        draft.reconcile(settings);

        draft
    }

    /// Switch the fulfillment method, keeping every typed field.
    pub fn select_method(
        &mut self,
        method: FulfillmentMethod,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.method = method;
        self.reconcile(settings)
    }

    /// Switch the timing mode; choosing ASAP clears a typed desired time.
    pub fn select_timing(
        &mut self,
        timing: TimingMode,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.timing = timing;

        if timing == TimingMode::Asap {
            self.desired_time.clear();
        }

        self.reconcile(settings)
    }

    /// Switch the payment method.
    pub fn select_payment(
        &mut self,
        payment: PaymentMethod,
        settings: &FulfillmentSettings,
    ) -> Reconciliation {
        self.payment = payment;
        self.reconcile(settings)
    }

    /// Bring timing and payment back within what the selected method allows.
    ///
    /// An illegal timing mode flips to the other mode when that one is legal; when neither
    /// is, the selection is kept and the method is reported unavailable. An illegal payment
    /// method is replaced by the first legal one.
    pub fn reconcile(&mut self, settings: &FulfillmentSettings) -> Reconciliation {
        let config = settings.get(self.method);
        let mut outcome = Reconciliation::default();

        if !config.allows_timing(self.timing) {
            let other = self.timing.other();

            if config.allows_timing(other) {
                outcome.timing = Some((self.timing, other));
                self.timing = other;
            } else {
                outcome.method_unavailable = true;
            }
        }

        let legal = config.legal_payment_methods();

        if !legal.contains(&self.payment)
            && let Some(first) = legal.first().copied()
        {
            outcome.payment = Some((self.payment, first));
            self.payment = first;
        }

        if outcome.timing.is_some() || outcome.payment.is_some() {
            debug!(method = %self.method, ?outcome, "checkout draft auto-corrected");
        }

        outcome
    }

    /// Human-readable timing, e.g. for the confirmation.
    pub fn timing_label(&self, config: &FulfillmentConfig) -> String {
        match self.timing {
            TimingMode::Asap => match config.asap_time_hint() {
                Some(hint) => format!("As soon as possible ({hint})"),
                None => "As soon as possible".to_string(),
            },
            TimingMode::Scheduled if self.desired_time.trim().is_empty() => {
                "At a set time".to_string()
            }
            TimingMode::Scheduled => self.desired_time.trim().to_string(),
        }
    }
}

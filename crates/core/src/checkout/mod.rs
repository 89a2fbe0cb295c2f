//! Checkout
//!
//! The checkout wizard walks a guest from the cart list through fulfillment selection and
//! customer details to a confirmation. Step progression is an explicit [`WizardStep`] value
//! driven by the pure [`transition`] function; the form state lives separately in a
//! [`CheckoutDraft`] so the guard table can be exercised without any rendering.

pub mod draft;
pub mod guards;
pub mod step;
pub mod wizard;

pub use draft::{Address, AddressField, CheckoutDraft, Reconciliation};
pub use guards::{DraftField, GuardFailure, GuardResult};
pub use step::WizardStep;
pub use wizard::{
    CheckoutWizard, GuardInputs, SubmissionTicket, Transition, WizardEvent, transition,
};

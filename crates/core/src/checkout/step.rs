//! Wizard Steps

use std::fmt;

/// Checkout wizard step, in strict forward order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    /// Cart contents
    #[default]
    List,

    /// Delivery or pickup, timing
    Fulfillment,

    /// Customer details and payment
    Details,

    /// Order placed
    Confirmation,
}

impl WizardStep {
    /// Step that "back" returns to.
    ///
    /// The confirmation is terminal: its draft has already been consumed, so going back from
    /// it starts over at the list.
    pub fn previous(self) -> Self {
        match self {
            Self::List | Self::Fulfillment | Self::Confirmation => Self::List,
            Self::Details => Self::Fulfillment,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Fulfillment => "fulfillment",
            Self::Details => "details",
            Self::Confirmation => "confirmation",
        })
    }
}

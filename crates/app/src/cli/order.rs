use std::{
    io::{self, Write},
    str::FromStr,
    sync::Arc,
};

use clap::Args;
use storefront::{
    api::{RestaurantId, StorefrontApi},
    checkout::{GuardFailure, Reconciliation, Transition},
    fulfillment::{FulfillmentMethod, PaymentMethod, TimingMode},
    menu::MenuItemId,
    session::{CheckoutError, Storefront},
};
use storefront_app::render;
use thiserror::Error;
use tracing::info;

use super::describe;

/// Menu item and quantity, written `ID` or `IDxQTY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemSpec {
    item: MenuItemId,
    quantity: i64,
}

#[derive(Debug, Error)]
#[error("invalid item `{0}`, expected ID or IDxQTY")]
pub(crate) struct InvalidItemSpec(String);

impl FromStr for ItemSpec {
    type Err = InvalidItemSpec;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidItemSpec(raw.to_string());
        let (id, quantity) = raw.trim().split_once(['x', 'X']).unwrap_or((raw.trim(), "1"));

        let item = id.parse::<u64>().map_err(|_err| invalid())?;
        let quantity = quantity.parse::<i64>().map_err(|_err| invalid())?;

        if quantity <= 0 {
            return Err(invalid());
        }

        Ok(Self {
            item: MenuItemId::new(item),
            quantity,
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct OrderArgs {
    /// Restaurant id
    #[arg(short, long)]
    restaurant: u64,

    /// Item to add, as ID or IDxQTY; repeatable
    #[arg(short, long = "item", required = true)]
    items: Vec<ItemSpec>,

    /// delivery or pickup; defaults to the restaurant's preferred method
    #[arg(long)]
    method: Option<FulfillmentMethod>,

    /// asap or scheduled
    #[arg(long)]
    timing: Option<TimingMode>,

    /// Desired time for scheduled orders
    #[arg(long)]
    at: Option<String>,

    /// Customer name
    #[arg(long)]
    name: String,

    /// Customer phone
    #[arg(long)]
    phone: String,

    /// Delivery city
    #[arg(long, default_value = "")]
    city: String,

    /// Delivery street
    #[arg(long, default_value = "")]
    street: String,

    /// Delivery house number
    #[arg(long, default_value = "")]
    house: String,

    /// Apartment or office
    #[arg(long, default_value = "")]
    apartment: String,

    /// cash, card or transfer
    #[arg(long)]
    payment: Option<PaymentMethod>,

    /// Comment for the restaurant
    #[arg(long, default_value = "")]
    comment: String,
}

fn failures_message(failures: &[GuardFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn step(transition: Transition) -> Result<(), String> {
    match transition {
        Transition::Blocked(failures) => Err(failures_message(&failures)),
        Transition::Moved(_) | Transition::Stayed | Transition::BeginSubmission => Ok(()),
    }
}

fn report(out: &mut impl Write, corrections: Reconciliation) -> io::Result<()> {
    if let Some((from, to)) = corrections.timing {
        writeln!(out, "note: {from} is not offered, switched to {to}")?;
    }

    if let Some((from, to)) = corrections.payment {
        writeln!(out, "note: {from} payment is not accepted, switched to {to}")?;
    }

    Ok(())
}

pub(crate) async fn run(api: Arc<dyn StorefrontApi>, args: OrderArgs) -> Result<(), String> {
    let mut session = Storefront::load(api, RestaurantId::new(args.restaurant))
        .await
        .map_err(|error| describe(&error))?;

    for spec in &args.items {
        session.add_item(spec.item, spec.quantity);

        if session.cart().quantity(spec.item) == 0 {
            return Err(format!("item {} is not on the menu", spec.item));
        }
    }

    let mut out = io::stdout().lock();
    let io_error = |error: io::Error| error.to_string();

    render::write_cart(&mut out, &session.snapshot(), session.currency())
        .map_err(|error| error.to_string())?;

    session.open_checkout();
    step(session.proceed())?;

    if let Some(method) = args.method {
        report(&mut out, session.select_method(method)).map_err(io_error)?;
    }

    if let Some(notice) = session.wizard().method_notice(session.settings()) {
        let message = &session.settings().get(session.wizard().draft().method).message;

        if !message.is_empty() {
            writeln!(out, "{message}").map_err(io_error)?;
        }

        return Err(notice.to_string());
    }

    if let Some(timing) = args.timing {
        report(&mut out, session.select_timing(timing)).map_err(io_error)?;
    }

    step(session.continue_to_details())?;

    if let Some(payment) = args.payment {
        report(&mut out, session.select_payment(payment)).map_err(io_error)?;
    }

    let draft = session.draft_mut();
    draft.customer_name = args.name;
    draft.phone = args.phone;
    draft.address.city = args.city;
    draft.address.street = args.street;
    draft.address.house = args.house;
    draft.address.apartment = args.apartment;
    draft.comment = args.comment;

    if let Some(at) = args.at {
        draft.desired_time = at;
    }

    let confirmation = match session.submit().await {
        Ok(confirmation) => confirmation,
        Err(CheckoutError::Blocked(failures)) => return Err(failures_message(&failures)),
        Err(error) => return Err(error.to_string()),
    };

    info!(order = %confirmation.order.order_number, "order placed");

    render::write_confirmation(&mut out, &confirmation, session.currency())
        .map_err(|error| error.to_string())
}

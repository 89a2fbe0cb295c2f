//! Terminal rendering of menus, settings and orders.

use std::{io, ops::Range};

use rusty_money::iso::Currency;
use storefront::{
    cart::CartSnapshot,
    fulfillment::{FulfillmentConfig, FulfillmentMethod, FulfillmentSettings},
    menu::Menu,
    money::format_amount,
    orders::OrderConfirmation,
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};
use thiserror::Error;

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Option<Columns<Range<usize>>>,
) -> Result<(), RenderError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    if let Some(columns) = numeric {
        table.modify(columns, Alignment::right());
    }

    writeln!(out, "{table}")?;

    Ok(())
}

/// Visible menu items, grouped by category.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_menu(
    out: &mut impl io::Write,
    menu: &Menu,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Category", "Item", "Price"]);

    for resolved in menu.visible_items() {
        builder.push_record([
            resolved.item.id.to_string(),
            resolved.category.name.clone(),
            resolved.item.name.clone(),
            format_amount(resolved.item.price, currency),
        ]);
    }

    write_table(out, builder, Some(Columns::new(3..4)))
}

fn method_row(method: FulfillmentMethod, config: &FulfillmentConfig) -> [String; 6] {
    let timing = config
        .legal_timing_modes()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let payments = config
        .legal_payment_methods()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let extras = match method {
        FulfillmentMethod::Delivery => config.cost_info().unwrap_or_default().to_string(),
        FulfillmentMethod::Pickup => match (config.discount_percent(), config.asap_time_hint()) {
            (0, None) => String::new(),
            (0, Some(hint)) => format!("ready in {hint}"),
            (percent, None) => format!("{percent}% off"),
            (percent, Some(hint)) => format!("{percent}% off, ready in {hint}"),
        },
    };

    [
        method.to_string(),
        if config.enabled { "yes" } else { "no" }.to_string(),
        if timing.is_empty() { "unavailable".to_string() } else { timing },
        payments,
        extras,
        config.message.clone(),
    ]
}

/// Resolved delivery and pickup settings.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_settings(
    out: &mut impl io::Write,
    settings: &FulfillmentSettings,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Method", "Enabled", "Timing", "Payment", "Details", "Message"]);
    builder.push_record(method_row(FulfillmentMethod::Delivery, &settings.delivery));
    builder.push_record(method_row(FulfillmentMethod::Pickup, &settings.pickup));

    write_table(out, builder, None)
}

/// Cart lines at current prices.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_cart(
    out: &mut impl io::Write,
    cart: &CartSnapshot,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Price", "Total"]);

    for line in &cart.lines {
        let name = if line.unavailable {
            format!("{} (unavailable)", line.name)
        } else {
            line.name.clone()
        };

        builder.push_record([
            name,
            line.quantity.to_string(),
            format_amount(line.price, currency),
            format_amount(line.line_total(), currency),
        ]);
    }

    builder.push_record([
        "Subtotal".to_string(),
        cart.item_count.to_string(),
        String::new(),
        format_amount(cart.total, currency),
    ]);

    write_table(out, builder, Some(Columns::new(1..4)))
}

/// Order confirmation.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_confirmation(
    out: &mut impl io::Write,
    confirmation: &OrderConfirmation,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    writeln!(out, "Order #{} placed", confirmation.order.order_number)?;
    writeln!(out, "  {}: {}", confirmation.method, confirmation.timing_label)?;

    if confirmation.totals.discount > 0 {
        writeln!(
            out,
            "  Subtotal: {}",
            format_amount(confirmation.totals.subtotal, currency)
        )?;
        writeln!(
            out,
            "  Discount: -{}",
            format_amount(confirmation.totals.discount, currency)
        )?;
    }

    writeln!(
        out,
        "  Total: {}",
        format_amount(confirmation.totals.payable, currency)
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storefront::{
        money::DEFAULT_CURRENCY,
        orders::{OrderId, OrderResult, OrderTotals},
    };
    use testresult::TestResult;

    use super::*;

    #[test]
    fn menu_table_lists_visible_items() -> TestResult {
        let menu: Menu = serde_json::from_value(json!({
            "categories": [{
                "id": 1,
                "name": "Dumplings",
                "items": [
                    { "id": 7, "name": "Manti", "price": 420 },
                    { "id": 8, "name": "Secret", "price": 1, "view": false }
                ]
            }]
        }))?;

        let mut out = Vec::new();
        write_menu(&mut out, &menu, DEFAULT_CURRENCY)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Manti"));
        assert!(rendered.contains("Dumplings"));
        assert!(!rendered.contains("Secret"));

        Ok(())
    }

    #[test]
    fn settings_table_marks_unavailable_methods() -> TestResult {
        let settings = FulfillmentSettings::resolve(Some(&json!({
            "delivery": { "allow_asap": false, "allow_scheduled": false },
            "pickup": { "discount_percent": 10, "asap_time_hint": "15 min" }
        })));

        let mut out = Vec::new();
        write_settings(&mut out, &settings)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("unavailable"));
        assert!(rendered.contains("10% off, ready in 15 min"));

        Ok(())
    }

    #[test]
    fn confirmation_shows_discount_breakdown() -> TestResult {
        let confirmation = OrderConfirmation {
            order: OrderResult {
                order_id: OrderId::new(3),
                order_number: "208".to_string(),
            },
            totals: OrderTotals {
                subtotal: 1000,
                discount: 100,
                payable: 900,
            },
            method: FulfillmentMethod::Pickup,
            timing_label: "19:00".to_string(),
            item_count: 2,
        };

        let mut out = Vec::new();
        write_confirmation(&mut out, &confirmation, DEFAULT_CURRENCY)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.starts_with("Order #208 placed"));
        assert!(rendered.contains("pickup: 19:00"));
        assert!(rendered.contains("Discount: -"));

        Ok(())
    }
}

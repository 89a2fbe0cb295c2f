//! Money

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Number;

/// A price or total in whole currency units, as the menu service reports prices.
pub type Amount = u64;

/// Currency used when a restaurant does not name one.
pub const DEFAULT_CURRENCY: &Currency = iso::RUB;

/// Look up a restaurant currency by ISO code, falling back to [`DEFAULT_CURRENCY`].
pub fn currency_or_default(code: Option<&str>) -> &'static Currency {
    code.map(str::trim)
        .filter(|code| !code.is_empty())
        .and_then(|code| iso::find(&code.to_ascii_uppercase()))
        .unwrap_or(DEFAULT_CURRENCY)
}

/// Format a whole-unit amount for display in the given currency.
pub fn format_amount(amount: Amount, currency: &'static Currency) -> String {
    Money::from_decimal(Decimal::from(amount), currency).to_string()
}

/// Read an [`Amount`] from any JSON number. The menu service stores prices as floats
/// (`450.0`); fractional prices are rounded half up to whole units.
///
/// # Errors
///
/// Fails on negative numbers and on anything that is not a number.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;

    amount_from_number(&number)
        .ok_or_else(|| D::Error::custom(format!("invalid price `{number}`")))
}

fn amount_from_number(number: &Number) -> Option<Amount> {
    if let Some(whole) = number.as_u64() {
        return Some(whole);
    }

    Decimal::from_f64(number.as_f64()?)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

/// Percentage of `amount`, rounded half up to whole units.
pub fn percent_of(amount: Amount, percent: u8) -> Amount {
    let scaled = u128::from(amount) * u128::from(percent) + 50;

    Amount::try_from(scaled / 100).unwrap_or(Amount::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "deserialize_amount")]
        price: Amount,
    }

    fn price_of(value: serde_json::Value) -> Result<Amount, serde_json::Error> {
        serde_json::from_value::<Priced>(json!({ "price": value })).map(|priced| priced.price)
    }

    #[test]
    fn prices_accept_integers_and_floats() -> TestResult {
        assert_eq!(price_of(json!(450))?, 450);
        assert_eq!(price_of(json!(450.0))?, 450);
        assert_eq!(price_of(json!(99.5))?, 100);
        assert_eq!(price_of(json!(99.49))?, 99);

        Ok(())
    }

    #[test]
    fn negative_or_textual_prices_are_rejected() {
        assert!(price_of(json!(-1)).is_err());
        assert!(price_of(json!(-0.6)).is_err());
        assert!(price_of(json!("450")).is_err());
    }

    #[test]
    fn unknown_or_missing_codes_use_default_currency() {
        assert_eq!(currency_or_default(None), DEFAULT_CURRENCY);
        assert_eq!(currency_or_default(Some("  ")), DEFAULT_CURRENCY);
        assert_eq!(currency_or_default(Some("XYZ1")), DEFAULT_CURRENCY);
    }

    #[test]
    fn known_codes_are_case_insensitive() {
        assert_eq!(currency_or_default(Some("usd")), iso::USD);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent_of(1300, 10), 130);
        assert_eq!(percent_of(1005, 10), 101);
        assert_eq!(percent_of(1004, 10), 100);
        assert_eq!(percent_of(0, 50), 0);
    }
}

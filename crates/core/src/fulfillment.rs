//! Fulfillment Configuration
//!
//! Restaurants store their delivery and pickup settings as a loosely typed record that may be
//! missing, partially filled or JSON-encoded inside a string. This module resolves that record
//! into a fully specified [`FulfillmentSettings`], merging every field the admin set over the
//! defaults and falling back to the defaults entirely when the record cannot be parsed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::{debug, warn};

/// How the order reaches the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentMethod {
    /// Courier delivery to an address
    Delivery,

    /// Guest collects the order
    Pickup,
}

impl FulfillmentMethod {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }
}

impl fmt::Display for FulfillmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the guest pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on receipt
    Cash,

    /// Card on receipt
    Card,

    /// Bank transfer by phone number
    Transfer,
}

impl PaymentMethod {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the guest wants the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// As soon as possible
    Asap,

    /// At a time the guest names
    Scheduled,
}

impl TimingMode {
    /// The other timing mode.
    pub fn other(self) -> Self {
        match self {
            Self::Asap => Self::Scheduled,
            Self::Scheduled => Self::Asap,
        }
    }

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a method, payment or timing name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();

                [$(<$ty>::$variant),+]
                    .into_iter()
                    .find(|variant| variant.as_str() == normalized)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }
    };
}

impl_from_str!(FulfillmentMethod, "fulfillment method", [Delivery, Pickup]);
impl_from_str!(PaymentMethod, "payment method", [Cash, Card, Transfer]);
impl_from_str!(TimingMode, "timing mode", [Asap, Scheduled]);

/// Timing modes a method allows.
pub type TimingModes = SmallVec<[TimingMode; 2]>;

/// Payment methods a method accepts.
pub type PaymentMethods = SmallVec<[PaymentMethod; 3]>;

/// Settings that only make sense for one fulfillment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodExtras {
    /// Delivery extras
    Delivery {
        /// Guest-facing description of the delivery cost
        cost_info: String,
    },

    /// Pickup extras
    Pickup {
        /// Discount applied to pickup orders, 0 to 100
        discount_percent: u8,

        /// Guest-facing hint on how soon an ASAP pickup is ready
        asap_time_hint: String,
    },
}

/// Fully resolved configuration for one fulfillment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentConfig {
    /// Whether guests may choose the method
    pub enabled: bool,

    /// Free-text guest-facing message
    pub message: String,

    /// Accepted payment methods as configured; empty means unspecified
    pub payment_methods: PaymentMethods,

    /// ASAP orders allowed
    pub allow_asap: bool,

    /// Scheduled orders allowed
    pub allow_scheduled: bool,

    /// Method-specific settings
    pub extras: MethodExtras,
}

impl FulfillmentConfig {
    /// Default configuration for `method`: enabled, every payment method, both timing modes.
    pub fn default_for(method: FulfillmentMethod) -> Self {
        let extras = match method {
            FulfillmentMethod::Delivery => MethodExtras::Delivery {
                cost_info: String::new(),
            },
            FulfillmentMethod::Pickup => MethodExtras::Pickup {
                discount_percent: 0,
                asap_time_hint: String::new(),
            },
        };

        Self {
            enabled: true,
            message: String::new(),
            payment_methods: default_payment_methods(),
            allow_asap: true,
            allow_scheduled: true,
            extras,
        }
    }

    /// Timing modes the guest may pick; empty when the method is temporarily unavailable.
    pub fn legal_timing_modes(&self) -> TimingModes {
        let mut modes = TimingModes::new();

        if self.allow_asap {
            modes.push(TimingMode::Asap);
        }

        if self.allow_scheduled {
            modes.push(TimingMode::Scheduled);
        }

        modes
    }

    /// Check if `mode` is allowed.
    pub fn allows_timing(&self, mode: TimingMode) -> bool {
        match mode {
            TimingMode::Asap => self.allow_asap,
            TimingMode::Scheduled => self.allow_scheduled,
        }
    }

    /// Payment methods the guest may pick; never empty.
    ///
    /// An empty configured list is treated as unspecified and yields every method.
    pub fn legal_payment_methods(&self) -> PaymentMethods {
        if self.payment_methods.is_empty() {
            return default_payment_methods();
        }

        self.payment_methods.clone()
    }

    /// Delivery cost description, when set.
    pub fn cost_info(&self) -> Option<&str> {
        match &self.extras {
            MethodExtras::Delivery { cost_info } if !cost_info.trim().is_empty() => {
                Some(cost_info.trim())
            }
            _ => None,
        }
    }

    /// Pickup discount, zero for delivery.
    pub fn discount_percent(&self) -> u8 {
        match self.extras {
            MethodExtras::Pickup {
                discount_percent, ..
            } => discount_percent,
            MethodExtras::Delivery { .. } => 0,
        }
    }

    /// ASAP readiness hint, when set.
    pub fn asap_time_hint(&self) -> Option<&str> {
        match &self.extras {
            MethodExtras::Pickup { asap_time_hint, .. } if !asap_time_hint.trim().is_empty() => {
                Some(asap_time_hint.trim())
            }
            _ => None,
        }
    }

    fn merge(mut self, raw: RawMethodSettings) -> Self {
        if let Some(enabled) = raw.enabled {
            self.enabled = enabled;
        }

        if let Some(message) = raw.message {
            self.message = message;
        }

        if let Some(methods) = raw.payment_methods {
            let mut parsed = PaymentMethods::new();

            for name in methods {
                match name.parse::<PaymentMethod>() {
                    Ok(method) if !parsed.contains(&method) => parsed.push(method),
                    Ok(_) => {}
                    Err(error) => debug!(%error, "skipping payment method"),
                }
            }

            self.payment_methods = parsed;
        }

        if let Some(allow_asap) = raw.allow_asap {
            self.allow_asap = allow_asap;
        }

        if let Some(allow_scheduled) = raw.allow_scheduled {
            self.allow_scheduled = allow_scheduled;
        }

        match &mut self.extras {
            MethodExtras::Delivery { cost_info } => {
                if let Some(value) = raw.cost_info {
                    *cost_info = value;
                }
            }
            MethodExtras::Pickup {
                discount_percent,
                asap_time_hint,
            } => {
                if let Some(value) = raw.discount_percent {
                    *discount_percent = u8::try_from(value.min(100)).unwrap_or(100);
                }

                if let Some(value) = raw.asap_time_hint {
                    *asap_time_hint = value;
                }
            }
        }

        self
    }
}

/// Delivery and pickup configuration for one restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentSettings {
    /// Delivery configuration
    pub delivery: FulfillmentConfig,

    /// Pickup configuration
    pub pickup: FulfillmentConfig,
}

impl Default for FulfillmentSettings {
    fn default() -> Self {
        Self {
            delivery: FulfillmentConfig::default_for(FulfillmentMethod::Delivery),
            pickup: FulfillmentConfig::default_for(FulfillmentMethod::Pickup),
        }
    }
}

impl FulfillmentSettings {
    /// Resolve the raw `delivery_settings` value of a restaurant.
    ///
    /// Accepts `null`, an object, or a string holding JSON. Fields present in the record
    /// override the defaults one by one; a record that cannot be parsed yields the defaults.
    pub fn resolve(raw: Option<&Value>) -> Self {
        match parse_raw(raw) {
            Ok(Some(raw)) => Self {
                delivery: FulfillmentConfig::default_for(FulfillmentMethod::Delivery)
                    .merge(raw.delivery.unwrap_or_default()),
                pickup: FulfillmentConfig::default_for(FulfillmentMethod::Pickup)
                    .merge(raw.pickup.unwrap_or_default()),
            },
            Ok(None) => Self::default(),
            Err(error) => {
                warn!(%error, "malformed fulfillment settings, using defaults");

                Self::default()
            }
        }
    }

    /// Configuration for `method`.
    pub fn get(&self, method: FulfillmentMethod) -> &FulfillmentConfig {
        match method {
            FulfillmentMethod::Delivery => &self.delivery,
            FulfillmentMethod::Pickup => &self.pickup,
        }
    }

    /// Method to select initially: delivery if enabled, else pickup if enabled, else delivery.
    pub fn preferred_method(&self) -> FulfillmentMethod {
        if self.delivery.enabled || !self.pickup.enabled {
            FulfillmentMethod::Delivery
        } else {
            FulfillmentMethod::Pickup
        }
    }

    /// Check if at least one enabled method allows some timing mode.
    pub fn is_usable(&self) -> bool {
        [&self.delivery, &self.pickup]
            .into_iter()
            .any(|config| config.enabled && !config.legal_timing_modes().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    delivery: Option<RawMethodSettings>,

    #[serde(default)]
    pickup: Option<RawMethodSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMethodSettings {
    enabled: Option<bool>,
    message: Option<String>,
    payment_methods: Option<Vec<String>>,
    allow_asap: Option<bool>,
    allow_scheduled: Option<bool>,
    discount_percent: Option<u32>,
    asap_time_hint: Option<String>,
    cost_info: Option<String>,
}

fn parse_raw(raw: Option<&Value>) -> Result<Option<RawSettings>, serde_json::Error> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(encoded)) if encoded.trim().is_empty() => Ok(None),
        Some(Value::String(encoded)) => serde_json::from_str(encoded).map(Some),
        Some(value) => RawSettings::deserialize(value).map(Some),
    }
}

/// Every payment method, in display order.
pub fn default_payment_methods() -> PaymentMethods {
    smallvec![PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer]
}

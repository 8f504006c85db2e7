use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::contracts::StoreError;

/// Pricing and lifecycle failures surfaced to callers.
///
/// Nothing here is retried internally. [PricingError::SoloMinimumNotMet]
/// carries the required minimum so a client can offer a remedy instead of
/// showing a generic failure.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    InvalidCoordinates { lat: f64, lon: f64 },
    InvalidQuantity { product_id: String, qty: i64 },
    CartNotFound(String),
    SlotNotFound(String),
    QuoteNotFound(String),
    ProductNotFound(String),
    SoloMinimumNotMet { required_units: i64, cart_units: i64 },
    QuoteExpired { quote_id: String, locked_until: DateTime<Utc> },
    /// Collaborator infrastructure failure, not a pricing outcome.
    Store(StoreError),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidCoordinates { lat, lon } => {
                write!(f, "invalid coordinates ({lat}, {lon})")
            }
            PricingError::InvalidQuantity { product_id, qty } => {
                write!(f, "invalid quantity {qty} for product {product_id}")
            }
            PricingError::CartNotFound(id) => write!(f, "cart {id} not found"),
            PricingError::SlotNotFound(id) => write!(f, "slot {id} not found"),
            PricingError::QuoteNotFound(id) => write!(f, "quote {id} not found"),
            PricingError::ProductNotFound(id) => write!(f, "product {id} not found"),
            PricingError::SoloMinimumNotMet {
                required_units,
                cart_units,
            } => write!(
                f,
                "this time has no nearby deliveries; add at least {required_units} units \
                 (cart has {cart_units}) or choose a discounted time"
            ),
            PricingError::QuoteExpired {
                quote_id,
                locked_until,
            } => write!(f, "quote {quote_id} expired at {locked_until}"),
            PricingError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PricingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PricingError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for PricingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CartNotFound(id) => PricingError::CartNotFound(id),
            StoreError::ProductNotFound(id) => PricingError::ProductNotFound(id),
            other => PricingError::Store(other),
        }
    }
}

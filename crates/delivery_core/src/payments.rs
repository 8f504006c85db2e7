//! Payment collaborator stub: intent creation and webhook dispatch.
//!
//! Real payment processing lives outside this crate; what the engine needs
//! from it is just the success signal that triggers [finalize_quote]. The
//! stub intent secret keeps demos and tests end-to-end without a PSP.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::{finalize_quote, FinalizeOutcome};
use crate::error::PricingError;

/// The webhook event name that finalizes a quote.
pub const PAYMENT_SUCCEEDED: &str = "payment_succeeded";

/// Stub PSP: a deterministic client secret for the given quote.
pub fn create_payment_intent(quote_id: &str) -> String {
    format!("pi_secret_{quote_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A success event was applied to the quote.
    Applied(FinalizeOutcome),
    /// Any other event kind; nothing changed.
    Ignored,
}

/// Dispatch a payment webhook. Only [PAYMENT_SUCCEEDED] finalizes; every
/// other event is acknowledged and dropped.
pub fn handle_payment_webhook(
    world: &mut World,
    event: &str,
    quote_id: &str,
    now: DateTime<Utc>,
) -> Result<WebhookOutcome, PricingError> {
    if event != PAYMENT_SUCCEEDED {
        debug!(event, quote = quote_id, "ignoring payment webhook");
        return Ok(WebhookOutcome::Ignored);
    }
    finalize_quote(world, quote_id, now).map(WebhookOutcome::Applied)
}

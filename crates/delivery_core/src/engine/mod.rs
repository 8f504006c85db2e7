//! The operations exposed to collaborators.
//!
//! Each operation takes `&mut World` plus an explicit parameter snapshot and
//! an `as_of`/`now` instant; nothing reads ambient configuration or wall
//! clocks. Exclusive world access is what serializes capacity increments
//! when quotes finalize concurrently.

pub mod checkout;
pub mod finalize;
pub mod inspect;
pub mod price_slots;

pub use checkout::{price_checkout, CheckoutRequest, QuoteAmounts, QuoteReceipt};
pub use finalize::{finalize_quote, FinalizeOutcome};
pub use inspect::{inspect_neighbors, NeighborDebug, NeighborDistance};
pub use price_slots::{list_priced_slots, slots_in_horizon, PricedSlot, PricedSlots, SlotCapacityView};

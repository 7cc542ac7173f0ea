//! Payment processor adapters.
//!
//! [`StripePaymentProcessor`] talks to the Stripe REST API; the
//! [`FixturePaymentProcessor`] keeps intents in memory for local runs and
//! tests, where the test decides which status an intent reports.

mod dto;
mod fixture;
mod stripe_processor;

pub use fixture::FixturePaymentProcessor;
pub use stripe_processor::{STRIPE_API_BASE, StripePaymentProcessor};

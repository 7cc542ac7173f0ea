//! Port for the external payment processor.

use async_trait::async_trait;

use crate::domain::{NewPaymentIntent, PaymentIntent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment processor adapters.
    pub enum PaymentProcessorError {
        /// The processor could not be reached or timed out.
        Transport { message: String } => "payment processor unreachable: {message}",
        /// The processor rejected the request.
        Rejected { message: String } => "payment processor rejected request: {message}",
        /// The processor answered with an unexpected payload.
        Decode { message: String } => "payment processor response invalid: {message}",
    }
}

/// Creates and reads payment intents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create (or, for a repeated idempotency key, return) an intent.
    async fn create_intent(
        &self,
        request: &NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentProcessorError>;

    /// Read the current state of an intent.
    async fn retrieve_intent(&self, intent_id: &str)
    -> Result<PaymentIntent, PaymentProcessorError>;
}

//! Driving port for the payment flow.

use async_trait::async_trait;

use crate::domain::{Actor, BidId, Error, Money, Order, OrderId, PaymentsConfig, Transaction};

/// What the caller wants to pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Order to pay.
    pub order_id: OrderId,
    /// Bid to accept; without one the order budget is charged.
    pub bid_id: Option<BidId>,
}

/// Intent handed back to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPaymentIntent {
    /// Processor identifier.
    pub payment_intent_id: String,
    /// Secret used by the front end to confirm the payment.
    pub client_secret: String,
    /// Charged amount.
    pub amount: Money,
}

/// Completed client-side payment to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmationRequest {
    /// Processor identifier of the intent.
    pub payment_intent_id: String,
    /// Order the intent pays for.
    pub order_id: OrderId,
    /// Bid the intent pays for.
    pub bid_id: Option<BidId>,
}

/// Result of a settled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Order after settlement.
    pub order: Order,
    /// Recorded transaction.
    pub transaction: Transaction,
    /// False when the payment had already been settled by an earlier call.
    pub newly_settled: bool,
}

/// Domain use-case port for payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentsCommand: Send + Sync {
    /// Public processor configuration.
    fn config(&self) -> PaymentsConfig;

    /// Create a payment intent for an order owned by `actor`.
    async fn create_intent(
        &self,
        actor: &Actor,
        request: PaymentIntentRequest,
    ) -> Result<CreatedPaymentIntent, Error>;

    /// Settle an order once the processor reports the intent succeeded.
    async fn confirm_payment(
        &self,
        actor: &Actor,
        request: PaymentConfirmationRequest,
    ) -> Result<PaymentConfirmation, Error>;
}

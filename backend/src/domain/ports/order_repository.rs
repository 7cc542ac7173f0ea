//! Port for orders, bids and payment transactions.

use async_trait::async_trait;

use crate::domain::{Bid, BidId, Order, OrderId, PaymentSettlement, Transaction};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The settlement raced with another change to the order or bid.
        StateConflict { message: String } => "order state conflict: {message}",
    }
}

/// Storage for the order lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    async fn insert_order(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Fetch an order.
    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Persist a new bid.
    async fn insert_bid(&self, bid: &Bid) -> Result<(), OrderRepositoryError>;

    /// Fetch a bid.
    async fn find_bid(&self, id: &BidId) -> Result<Option<Bid>, OrderRepositoryError>;

    /// Bids on an order, oldest first.
    async fn list_bids(&self, order_id: &OrderId) -> Result<Vec<Bid>, OrderRepositoryError>;

    /// Transaction recorded for a processor payment id.
    async fn find_transaction_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Transaction>, OrderRepositoryError>;

    /// Atomically mark the order paid, accept the bid and record the transaction.
    ///
    /// Fails with `StateConflict` and changes nothing when the order is no
    /// longer open or the bid no longer pending.
    async fn settle_payment(
        &self,
        settlement: &PaymentSettlement,
    ) -> Result<Order, OrderRepositoryError>;
}

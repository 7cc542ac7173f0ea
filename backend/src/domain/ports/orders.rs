//! Driving ports for orders and bids.

use async_trait::async_trait;

use crate::domain::{Actor, Bid, Currency, Error, Order, OrderId, OrderTitle};

/// New order submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    /// Short description.
    pub title: OrderTitle,
    /// Budget in minor units.
    pub budget_minor: i64,
    /// Currency; defaults to the configured processor currency.
    pub currency: Option<Currency>,
}

/// Order and bid mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersCommand: Send + Sync {
    /// Open an order owned by `actor`.
    async fn create_order(&self, actor: &Actor, request: CreateOrderRequest)
    -> Result<Order, Error>;

    /// Place a bid by `actor` on an open order.
    async fn place_bid(
        &self,
        actor: &Actor,
        order_id: &OrderId,
        amount_minor: i64,
    ) -> Result<Bid, Error>;
}

/// Order and bid reads, filtered by what `actor` may see.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// One order.
    async fn order(&self, actor: &Actor, order_id: &OrderId) -> Result<Order, Error>;

    /// Bids on an order.
    async fn bids(&self, actor: &Actor, order_id: &OrderId) -> Result<Vec<Bid>, Error>;
}

//! In-memory [`OrderRepository`].
//!
//! Orders, bids and transactions share one mutex so a settlement is applied
//! atomically, mirroring the database transaction used in PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    Bid, BidId, BidStatus, Order, OrderId, PaymentSettlement, Transaction,
};

#[derive(Debug, Default)]
struct OrderTables {
    orders: HashMap<OrderId, Order>,
    bids: Vec<Bid>,
    transactions: Vec<Transaction>,
}

impl OrderTables {
    fn settle(&mut self, settlement: &PaymentSettlement) -> Result<Order, OrderRepositoryError> {
        let tx = &settlement.transaction;
        if self
            .transactions
            .iter()
            .any(|existing| existing.external_payment_id == tx.external_payment_id)
        {
            return Err(OrderRepositoryError::state_conflict(
                "payment already recorded",
            ));
        }
        let order = self
            .orders
            .get(&settlement.order_id)
            .filter(|order| order.is_payable())
            .ok_or_else(|| OrderRepositoryError::state_conflict("order is no longer open"))?;
        let mut settled = order.clone();

        if let Some(bid_id) = tx.bid_id {
            let pending = self.bids.iter().any(|bid| {
                bid.id == bid_id
                    && bid.order_id == settlement.order_id
                    && bid.status == BidStatus::Pending
            });
            if !pending {
                return Err(OrderRepositoryError::state_conflict(
                    "bid is no longer pending",
                ));
            }
            for bid in self
                .bids
                .iter_mut()
                .filter(|bid| bid.order_id == settlement.order_id)
            {
                if bid.id == bid_id {
                    bid.status = BidStatus::Accepted;
                } else if bid.status == BidStatus::Pending {
                    bid.status = BidStatus::Rejected;
                }
            }
        }

        settled.mark_paid(settlement.master_id, settlement.settled_at);
        self.orders.insert(settled.id, settled.clone());
        self.transactions.push(tx.clone());
        Ok(settled)
    }
}

/// Mutex-guarded order store.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    tables: Mutex<OrderTables>,
}

impl InMemoryOrderRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, OrderTables>, OrderRepositoryError> {
        self.tables
            .lock()
            .map_err(|_| OrderRepositoryError::query("order store lock poisoned"))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.lock()?.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.lock()?.orders.get(id).cloned())
    }

    async fn insert_bid(&self, bid: &Bid) -> Result<(), OrderRepositoryError> {
        let mut tables = self.lock()?;
        if !tables.orders.contains_key(&bid.order_id) {
            return Err(OrderRepositoryError::query("bid references a missing order"));
        }
        tables.bids.push(bid.clone());
        Ok(())
    }

    async fn find_bid(&self, id: &BidId) -> Result<Option<Bid>, OrderRepositoryError> {
        Ok(self.lock()?.bids.iter().find(|bid| bid.id == *id).cloned())
    }

    async fn list_bids(&self, order_id: &OrderId) -> Result<Vec<Bid>, OrderRepositoryError> {
        Ok(self
            .lock()?
            .bids
            .iter()
            .filter(|bid| bid.order_id == *order_id)
            .cloned()
            .collect())
    }

    async fn find_transaction_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Transaction>, OrderRepositoryError> {
        Ok(self
            .lock()?
            .transactions
            .iter()
            .find(|tx| tx.external_payment_id == external_payment_id)
            .cloned())
    }

    async fn settle_payment(
        &self,
        settlement: &PaymentSettlement,
    ) -> Result<Order, OrderRepositoryError> {
        self.lock()?.settle(settlement)
    }
}

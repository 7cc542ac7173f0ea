//! PostgreSQL-backed [`OrderRepository`].
//!
//! Settlement runs in one transaction: the order update is guarded by
//! `status = 'open'` and the bid update by `status = 'pending'`, so a
//! concurrent confirmation loses cleanly with `StateConflict` and nothing is
//! written.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    Bid, BidId, BidStatus, Currency, Money, Order, OrderId, OrderStatus, OrderTitle,
    PaymentSettlement, Transaction, TransactionId, UserId,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{BidRow, OrderRow, TransactionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bids, orders, transactions};

const EXTERNAL_ID_CONSTRAINT: &str = "transactions_external_payment_id_key";

/// Diesel implementation of the order port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn invalid(what: &str, id: impl std::fmt::Display, err: impl std::fmt::Display) -> OrderRepositoryError {
    OrderRepositoryError::query(format!("stored {what} {id} is invalid: {err}"))
}

fn money(id: uuid::Uuid, minor: i64, currency: &str) -> Result<Money, OrderRepositoryError> {
    let currency = Currency::new(currency).map_err(|err| invalid("amount", id, err))?;
    Money::new(minor, currency).map_err(|err| invalid("amount", id, err))
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    Ok(Order {
        id: OrderId::from_uuid(row.id),
        client_id: UserId::from_uuid(row.client_id),
        master_id: row.master_id.map(UserId::from_uuid),
        title: OrderTitle::new(&row.title).map_err(|err| invalid("order", row.id, err))?,
        status: row
            .status
            .parse::<OrderStatus>()
            .map_err(|err| invalid("order", row.id, err))?,
        budget: money(row.id, row.budget_minor, &row.currency)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn order_to_row(order: &Order) -> OrderRow {
    OrderRow {
        id: *order.id.as_uuid(),
        client_id: *order.client_id.as_uuid(),
        master_id: order.master_id.map(|id| *id.as_uuid()),
        title: order.title.as_ref().to_owned(),
        status: order.status.as_str().to_owned(),
        budget_minor: order.budget.minor(),
        currency: order.budget.currency().as_str().to_owned(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

fn row_to_bid(row: BidRow) -> Result<Bid, OrderRepositoryError> {
    Ok(Bid {
        id: BidId::from_uuid(row.id),
        order_id: OrderId::from_uuid(row.order_id),
        master_id: UserId::from_uuid(row.master_id),
        amount: money(row.id, row.amount_minor, &row.currency)?,
        status: row
            .status
            .parse::<BidStatus>()
            .map_err(|err| invalid("bid", row.id, err))?,
        created_at: row.created_at,
    })
}

fn row_to_transaction(row: TransactionRow) -> Result<Transaction, OrderRepositoryError> {
    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        order_id: OrderId::from_uuid(row.order_id),
        bid_id: row.bid_id.map(BidId::from_uuid),
        payment_method: row
            .payment_method
            .parse()
            .map_err(|err| invalid("transaction", row.id, err))?,
        amount: money(row.id, row.amount_minor, &row.currency)?,
        external_payment_id: row.external_payment_id,
        created_at: row.created_at,
    })
}

fn transaction_to_row(tx: &Transaction) -> TransactionRow {
    TransactionRow {
        id: *tx.id.as_uuid(),
        order_id: *tx.order_id.as_uuid(),
        bid_id: tx.bid_id.map(|id| *id.as_uuid()),
        external_payment_id: tx.external_payment_id.clone(),
        payment_method: tx.payment_method.as_str().to_owned(),
        amount_minor: tx.amount.minor(),
        currency: tx.amount.currency().as_str().to_owned(),
        created_at: tx.created_at,
    }
}

/// Failure inside the settlement transaction.
enum SettleError {
    Diesel(diesel::result::Error),
    Conflict(&'static str),
}

impl From<diesel::result::Error> for SettleError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

async fn settle(
    conn: &mut AsyncPgConnection,
    settlement: &PaymentSettlement,
) -> Result<OrderRow, SettleError> {
    let order_id = *settlement.order_id.as_uuid();
    let paid = OrderStatus::Paid.as_str();
    let open_order = orders::table
        .find(order_id)
        .filter(orders::status.eq(OrderStatus::Open.as_str()));
    let updated: Option<OrderRow> = match settlement.master_id {
        Some(master) => {
            diesel::update(open_order)
                .set((
                    orders::status.eq(paid),
                    orders::master_id.eq(Some(*master.as_uuid())),
                    orders::updated_at.eq(settlement.settled_at),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .await
                .optional()?
        }
        None => {
            diesel::update(open_order)
                .set((
                    orders::status.eq(paid),
                    orders::updated_at.eq(settlement.settled_at),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .await
                .optional()?
        }
    };
    let order = updated.ok_or(SettleError::Conflict("order is no longer open"))?;

    if let Some(bid_id) = settlement.transaction.bid_id {
        let bid_id = *bid_id.as_uuid();
        let pending = BidStatus::Pending.as_str();
        let accepted = diesel::update(
            bids::table
                .find(bid_id)
                .filter(bids::order_id.eq(order_id).and(bids::status.eq(pending))),
        )
        .set(bids::status.eq(BidStatus::Accepted.as_str()))
        .execute(conn)
        .await?;
        if accepted == 0 {
            return Err(SettleError::Conflict("bid is no longer pending"));
        }
        diesel::update(
            bids::table.filter(
                bids::order_id
                    .eq(order_id)
                    .and(bids::status.eq(pending))
                    .and(bids::id.ne(bid_id)),
            ),
        )
        .set(bids::status.eq(BidStatus::Rejected.as_str()))
        .execute(conn)
        .await?;
    }

    diesel::insert_into(transactions::table)
        .values(&transaction_to_row(&settlement.transaction))
        .execute(conn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err, Some(EXTERNAL_ID_CONSTRAINT)) {
                SettleError::Conflict("payment already recorded")
            } else {
                SettleError::Diesel(err)
            }
        })?;
    Ok(order)
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(orders::table)
            .values(&order_to_row(order))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_order)
            .transpose()
    }

    async fn insert_bid(&self, bid: &Bid) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BidRow {
            id: *bid.id.as_uuid(),
            order_id: *bid.order_id.as_uuid(),
            master_id: *bid.master_id.as_uuid(),
            amount_minor: bid.amount.minor(),
            currency: bid.amount.currency().as_str().to_owned(),
            status: bid.status.as_str().to_owned(),
            created_at: bid.created_at,
        };
        diesel::insert_into(bids::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_bid(&self, id: &BidId) -> Result<Option<Bid>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bids::table
            .find(id.as_uuid())
            .select(BidRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_bid)
            .transpose()
    }

    async fn list_bids(&self, order_id: &OrderId) -> Result<Vec<Bid>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BidRow> = bids::table
            .filter(bids::order_id.eq(order_id.as_uuid()))
            .select(BidRow::as_select())
            .order_by((bids::created_at.asc(), bids::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_bid).collect()
    }

    async fn find_transaction_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Transaction>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        transactions::table
            .filter(transactions::external_payment_id.eq(external_payment_id))
            .select(TransactionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_transaction)
            .transpose()
    }

    async fn settle_payment(
        &self,
        settlement: &PaymentSettlement,
    ) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| async move { settle(conn, settlement).await }.scope_boxed())
            .await
            .map_err(|err| match err {
                SettleError::Diesel(error) => map_diesel_error(error),
                SettleError::Conflict(message) => OrderRepositoryError::state_conflict(message),
            })?;
        row_to_order(row)
    }
}

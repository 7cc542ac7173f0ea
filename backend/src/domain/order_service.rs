//! Order and bid service.
//!
//! Clients open orders, masters bid on open ones. Visibility follows
//! ownership: clients see their own orders, masters see open orders and the
//! ones assigned to them, administrators see everything.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CreateOrderRequest, OrderRepository, OrderRepositoryError, OrdersCommand, OrdersQuery,
};
use crate::domain::{
    Actor, Bid, Currency, Error, Money, Order, OrderId, OrderValidationError, Role,
};

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order store unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order store error: {message}"))
        }
        OrderRepositoryError::StateConflict { message } => Error::conflict(message),
    }
}

pub(crate) fn order_not_found(id: &OrderId) -> Error {
    Error::not_found(format!("order {id} not found"))
}

fn amount_error(field: &str, error: &OrderValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_amount",
    }))
}

/// True when `actor` may read `order`.
pub(crate) fn can_view(actor: &Actor, order: &Order) -> bool {
    match actor.role() {
        Role::Admin => true,
        Role::Client => order.client_id == *actor.id(),
        Role::Master | Role::VerifiedMaster => {
            order.is_payable() || order.master_id == Some(*actor.id())
        }
    }
}

/// Order service implementing [`OrdersCommand`] and [`OrdersQuery`].
#[derive(Clone)]
pub struct OrderService<O> {
    orders: Arc<O>,
    default_currency: Currency,
    clock: Arc<dyn Clock>,
}

impl<O> OrderService<O> {
    /// Create a new service; orders without a currency use `default_currency`.
    pub fn new(orders: Arc<O>, default_currency: Currency, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            default_currency,
            clock,
        }
    }
}

impl<O: OrderRepository> OrderService<O> {
    async fn visible_order(&self, actor: &Actor, order_id: &OrderId) -> Result<Order, Error> {
        self.orders
            .find_order(order_id)
            .await
            .map_err(map_order_error)?
            .filter(|order| can_view(actor, order))
            .ok_or_else(|| order_not_found(order_id))
    }
}

#[async_trait]
impl<O: OrderRepository> OrdersCommand for OrderService<O> {
    async fn create_order(
        &self,
        actor: &Actor,
        request: CreateOrderRequest,
    ) -> Result<Order, Error> {
        if !matches!(actor.role(), Role::Client | Role::Admin) {
            return Err(Error::forbidden("only clients can open orders"));
        }
        let currency = request
            .currency
            .unwrap_or_else(|| self.default_currency.clone());
        let budget = Money::new(request.budget_minor, currency)
            .map_err(|err| amount_error("budget", &err))?;
        let order = Order::open(*actor.id(), request.title, budget, self.clock.utc());
        self.orders
            .insert_order(&order)
            .await
            .map_err(map_order_error)?;
        info!(order_id = %order.id, client_id = %order.client_id, "order opened");
        Ok(order)
    }

    async fn place_bid(
        &self,
        actor: &Actor,
        order_id: &OrderId,
        amount_minor: i64,
    ) -> Result<Bid, Error> {
        if !actor.role().is_master() {
            return Err(Error::forbidden("only masters can bid"));
        }
        let order = self.visible_order(actor, order_id).await?;
        if !order.is_payable() {
            return Err(Error::conflict("order is not open for bids").with_details(json!({
                "code": "order_not_open",
                "status": order.status.as_str(),
            })));
        }
        let amount = Money::new(amount_minor, order.budget.currency().clone())
            .map_err(|err| amount_error("amount", &err))?;
        let bid = Bid::place(order.id, *actor.id(), amount, self.clock.utc());
        self.orders
            .insert_bid(&bid)
            .await
            .map_err(map_order_error)?;
        info!(order_id = %order.id, bid_id = %bid.id, master_id = %bid.master_id, "bid placed");
        Ok(bid)
    }
}

#[async_trait]
impl<O: OrderRepository> OrdersQuery for OrderService<O> {
    async fn order(&self, actor: &Actor, order_id: &OrderId) -> Result<Order, Error> {
        self.visible_order(actor, order_id).await
    }

    async fn bids(&self, actor: &Actor, order_id: &OrderId) -> Result<Vec<Bid>, Error> {
        let order = self.visible_order(actor, order_id).await?;
        let bids = self
            .orders
            .list_bids(&order.id)
            .await
            .map_err(map_order_error)?;
        if actor.role().is_master() {
            return Ok(bids
                .into_iter()
                .filter(|bid| bid.master_id == *actor.id())
                .collect());
        }
        Ok(bids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockOrderRepository;
    use crate::domain::{BidStatus, ErrorCode, OrderStatus, OrderTitle, UserId};
    use crate::test_support::{MutableClock, fixture_instant};
    use rstest::{fixture, rstest};

    fn rub() -> Currency {
        Currency::new("rub").expect("currency")
    }

    fn service(repo: MockOrderRepository) -> OrderService<MockOrderRepository> {
        OrderService::new(Arc::new(repo), rub(), Arc::new(MutableClock::fixed()))
    }

    #[fixture]
    fn client() -> Actor {
        Actor::new(UserId::random(), Role::Client)
    }

    #[fixture]
    fn master() -> Actor {
        Actor::new(UserId::random(), Role::Master)
    }

    fn order_for(client: &Actor, status: OrderStatus) -> Order {
        let mut order = Order::open(
            *client.id(),
            OrderTitle::new("Kitchen cabinet").expect("title"),
            Money::new(80_000, rub()).expect("amount"),
            fixture_instant(),
        );
        order.status = status;
        order
    }

    #[rstest]
    #[tokio::test]
    async fn client_opens_order_in_default_currency(client: Actor) {
        let mut repo = MockOrderRepository::new();
        repo.expect_insert_order().times(1).return_once(|_| Ok(()));

        let order = service(repo)
            .create_order(
                &client,
                CreateOrderRequest {
                    title: OrderTitle::new("Bookshelf").expect("title"),
                    budget_minor: 15_000,
                    currency: None,
                },
            )
            .await
            .expect("order opened");
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.budget.currency(), &rub());
        assert_eq!(&order.client_id, client.id());
    }

    #[rstest]
    #[tokio::test]
    async fn masters_cannot_open_orders(master: Actor) {
        let mut repo = MockOrderRepository::new();
        repo.expect_insert_order().never();
        let err = service(repo)
            .create_order(
                &master,
                CreateOrderRequest {
                    title: OrderTitle::new("Bookshelf").expect("title"),
                    budget_minor: 15_000,
                    currency: None,
                },
            )
            .await
            .expect_err("masters cannot open orders");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_budget_is_invalid(client: Actor) {
        let err = service(MockOrderRepository::new())
            .create_order(
                &client,
                CreateOrderRequest {
                    title: OrderTitle::new("Bookshelf").expect("title"),
                    budget_minor: 0,
                    currency: None,
                },
            )
            .await
            .expect_err("zero budget");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn master_bids_in_order_currency(client: Actor, master: Actor) {
        let order = order_for(&client, OrderStatus::Open);
        let order_id = order.id;
        let mut repo = MockOrderRepository::new();
        repo.expect_find_order()
            .return_once(move |_| Ok(Some(order)));
        repo.expect_insert_bid().times(1).return_once(|_| Ok(()));

        let bid = service(repo)
            .place_bid(&master, &order_id, 70_000)
            .await
            .expect("bid placed");
        assert_eq!(bid.status, BidStatus::Pending);
        assert_eq!(bid.amount.currency(), &rub());
    }

    #[rstest]
    #[tokio::test]
    async fn bidding_on_paid_order_conflicts(client: Actor, master: Actor) {
        let mut order = order_for(&client, OrderStatus::Paid);
        order.master_id = Some(*master.id());
        let order_id = order.id;
        let mut repo = MockOrderRepository::new();
        repo.expect_find_order()
            .return_once(move |_| Ok(Some(order)));
        repo.expect_insert_bid().never();

        let err = service(repo)
            .place_bid(&master, &order_id, 70_000)
            .await
            .expect_err("order closed");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn other_clients_cannot_see_order(client: Actor) {
        let order = order_for(&client, OrderStatus::Open);
        let order_id = order.id;
        let mut repo = MockOrderRepository::new();
        repo.expect_find_order()
            .return_once(move |_| Ok(Some(order)));

        let stranger = Actor::new(UserId::random(), Role::Client);
        let err = service(repo)
            .order(&stranger, &order_id)
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn masters_only_see_their_own_bids(client: Actor, master: Actor) {
        let order = order_for(&client, OrderStatus::Open);
        let order_id = order.id;
        let amount = order.budget.clone();
        let own = Bid::place(order_id, *master.id(), amount.clone(), fixture_instant());
        let other = Bid::place(order_id, UserId::random(), amount, fixture_instant());
        let own_id = own.id;
        let mut repo = MockOrderRepository::new();
        repo.expect_find_order()
            .return_once(move |_| Ok(Some(order)));
        repo.expect_list_bids()
            .return_once(move |_| Ok(vec![own, other]));

        let bids = service(repo)
            .bids(&master, &order_id)
            .await
            .expect("bids listed");
        assert_eq!(bids.len(), 1);
        assert_eq!(bids.first().map(|bid| bid.id), Some(own_id));
    }
}

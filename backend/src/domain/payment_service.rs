//! Payment flow over an external payment processor.
//!
//! Intent creation charges either a pending bid or the order budget. A
//! confirmation re-reads the intent from the processor and settles the order
//! only when the processor reports the charge as succeeded.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::order_service::{map_order_error, order_not_found};
use crate::domain::ports::{
    CreatedPaymentIntent, OrderRepository, PaymentConfirmation, PaymentConfirmationRequest,
    PaymentIntentRequest, PaymentProcessor, PaymentProcessorError, PaymentsCommand,
};
use crate::domain::{
    Actor, BidId, BidStatus, Error, IntentTarget, Money, NewPaymentIntent, Order,
    OrderId, OrderStatus, PaymentIntentStatus, PaymentMethod, PaymentSettlement, PaymentsConfig,
    Transaction, TransactionId, UserId,
};

fn map_processor_error(error: PaymentProcessorError) -> Error {
    match error {
        PaymentProcessorError::Transport { message } => {
            Error::service_unavailable(format!("payment processor unavailable: {message}"))
        }
        PaymentProcessorError::Rejected { message } => Error::invalid_request(message),
        PaymentProcessorError::Decode { message } => {
            Error::internal(format!("payment processor response invalid: {message}"))
        }
    }
}

fn order_not_open(order: &Order) -> Error {
    Error::conflict("order is not awaiting payment").with_details(json!({
        "code": "order_not_open",
        "status": order.status.as_str(),
    }))
}

/// Payment service implementing [`PaymentsCommand`].
#[derive(Clone)]
pub struct PaymentService<O, P> {
    orders: Arc<O>,
    processor: Arc<P>,
    config: PaymentsConfig,
    clock: Arc<dyn Clock>,
}

impl<O, P> PaymentService<O, P> {
    /// Create a new service with the given adapters.
    pub fn new(
        orders: Arc<O>,
        processor: Arc<P>,
        config: PaymentsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            processor,
            config,
            clock,
        }
    }
}

impl<O, P> PaymentService<O, P>
where
    O: OrderRepository,
    P: PaymentProcessor,
{
    /// Load an order the actor may pay for.
    async fn owned_order(&self, actor: &Actor, order_id: &OrderId) -> Result<Order, Error> {
        let order = self
            .orders
            .find_order(order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(order_id))?;
        if order.client_id != *actor.id() && !actor.role().is_admin() {
            return Err(Error::forbidden("order belongs to another client"));
        }
        Ok(order)
    }

    /// Resolve the amount to charge and the master to assign.
    async fn charge_for(
        &self,
        order: &Order,
        bid_id: Option<BidId>,
    ) -> Result<(Money, Option<UserId>), Error> {
        let Some(bid_id) = bid_id else {
            return Ok((order.budget.clone(), None));
        };
        let bid = self
            .orders
            .find_bid(&bid_id)
            .await
            .map_err(map_order_error)?
            .filter(|bid| bid.order_id == order.id)
            .ok_or_else(|| {
                Error::invalid_request("bid does not belong to this order").with_details(json!({
                    "field": "bidId",
                    "code": "bid_mismatch",
                }))
            })?;
        if bid.status != BidStatus::Pending {
            return Err(Error::conflict("bid is no longer pending").with_details(json!({
                "code": "bid_not_pending",
                "status": bid.status.as_str(),
            })));
        }
        Ok((bid.amount, Some(bid.master_id)))
    }

    /// Earlier settlement of the same intent, if the order is already paid by it.
    async fn previous_settlement(
        &self,
        order: &Order,
        payment_intent_id: &str,
    ) -> Result<Option<Transaction>, Error> {
        if order.status != OrderStatus::Paid {
            return Ok(None);
        }
        let transaction = self
            .orders
            .find_transaction_by_external_id(payment_intent_id)
            .await
            .map_err(map_order_error)?;
        Ok(transaction.filter(|tx| tx.order_id == order.id))
    }
}

#[async_trait]
impl<O, P> PaymentsCommand for PaymentService<O, P>
where
    O: OrderRepository,
    P: PaymentProcessor,
{
    fn config(&self) -> PaymentsConfig {
        self.config.clone()
    }

    async fn create_intent(
        &self,
        actor: &Actor,
        request: PaymentIntentRequest,
    ) -> Result<CreatedPaymentIntent, Error> {
        let order = self.owned_order(actor, &request.order_id).await?;
        if !order.is_payable() {
            return Err(order_not_open(&order));
        }
        let (amount, _) = self.charge_for(&order, request.bid_id).await?;
        let target = IntentTarget {
            order_id: order.id,
            bid_id: request.bid_id,
        };
        let new_intent = NewPaymentIntent {
            idempotency_key: target.idempotency_key(&amount),
            amount: amount.clone(),
            target,
        };
        let intent = self
            .processor
            .create_intent(&new_intent)
            .await
            .map_err(map_processor_error)?;
        let client_secret = intent
            .client_secret
            .ok_or_else(|| Error::internal("payment intent has no client secret"))?;
        info!(
            order_id = %order.id,
            payment_intent_id = %intent.id,
            amount = amount.minor(),
            currency = %amount.currency(),
            "payment intent created"
        );
        Ok(CreatedPaymentIntent {
            payment_intent_id: intent.id,
            client_secret,
            amount,
        })
    }

    async fn confirm_payment(
        &self,
        actor: &Actor,
        request: PaymentConfirmationRequest,
    ) -> Result<PaymentConfirmation, Error> {
        let order = self.owned_order(actor, &request.order_id).await?;
        if let Some(transaction) = self
            .previous_settlement(&order, &request.payment_intent_id)
            .await?
        {
            info!(order_id = %order.id, "payment already settled");
            return Ok(PaymentConfirmation {
                order,
                transaction,
                newly_settled: false,
            });
        }
        if !order.is_payable() {
            return Err(order_not_open(&order));
        }

        let intent = self
            .processor
            .retrieve_intent(&request.payment_intent_id)
            .await
            .map_err(map_processor_error)?;
        if intent.status != PaymentIntentStatus::Succeeded {
            warn!(
                order_id = %order.id,
                payment_intent_id = %intent.id,
                status = intent.status.as_str(),
                "payment confirmation refused: intent not succeeded"
            );
            return Err(
                Error::conflict("payment has not completed").with_details(json!({
                    "code": "payment_not_completed",
                    "status": intent.status.as_str(),
                })),
            );
        }
        let target = IntentTarget {
            order_id: order.id,
            bid_id: request.bid_id,
        };
        if !target.matches(&intent.metadata) {
            return Err(
                Error::invalid_request("payment intent was created for another order")
                    .with_details(json!({
                        "field": "paymentIntentId",
                        "code": "intent_mismatch",
                    })),
            );
        }

        let (amount, master_id) = self.charge_for(&order, request.bid_id).await?;
        if !intent.charges(&amount) {
            return Err(
                Error::conflict("payment amount does not match").with_details(json!({
                    "code": "amount_mismatch",
                    "expected": amount.minor(),
                    "charged": intent.amount_minor,
                })),
            );
        }

        let now = self.clock.utc();
        let transaction = Transaction {
            id: TransactionId::random(),
            order_id: order.id,
            bid_id: request.bid_id,
            external_payment_id: intent.id,
            payment_method: PaymentMethod::Card,
            amount,
            created_at: now,
        };
        let settlement = PaymentSettlement {
            order_id: order.id,
            master_id,
            transaction: transaction.clone(),
            settled_at: now,
        };
        let order = self
            .orders
            .settle_payment(&settlement)
            .await
            .map_err(map_order_error)?;
        info!(
            order_id = %order.id,
            transaction_id = %transaction.id,
            "payment settled"
        );
        Ok(PaymentConfirmation {
            order,
            transaction,
            newly_settled: true,
        })
    }
}

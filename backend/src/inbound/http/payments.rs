//! Payment intent handlers.
//!
//! ```text
//! GET  /api/payments/config
//! POST /api/payments/create-payment-intent {"orderId":"..","bidId":".."}
//! POST /api/payments/confirm-payment {"paymentIntentId":"pi_..","orderId":".."}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{PaymentConfirmationRequest, PaymentIntentRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::require_actor;
use crate::inbound::http::dto::{OrderResponse, TransactionResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, parse_bid_id, parse_order_id, require,
};

/// Public processor settings for the front end.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsConfigResponse {
    #[schema(example = "pk_test_123")]
    pub publishable_key: String,
    #[schema(example = "rub")]
    pub currency: String,
}

/// Body of `POST /api/payments/create-payment-intent`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentBody {
    pub order_id: Option<String>,
    /// Charge this bid instead of the order budget.
    pub bid_id: Option<String>,
}

/// Created intent; the client secret completes the payment in the browser.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Charged amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// Body of `POST /api/payments/confirm-payment`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentBody {
    pub payment_intent_id: Option<String>,
    pub order_id: Option<String>,
    pub bid_id: Option<String>,
}

/// Settled order and the recorded transaction.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub order: OrderResponse,
    pub transaction: TransactionResponse,
    /// False when the intent had already been recorded.
    pub newly_settled: bool,
}

impl TryFrom<CreateIntentBody> for PaymentIntentRequest {
    type Error = Error;

    fn try_from(body: CreateIntentBody) -> Result<Self, Self::Error> {
        let order_field = FieldName::new("orderId");
        let bid_field = FieldName::new("bidId");
        Ok(Self {
            order_id: parse_order_id(&require(body.order_id, order_field)?, order_field)?,
            bid_id: body
                .bid_id
                .map(|raw| parse_bid_id(&raw, bid_field))
                .transpose()?,
        })
    }
}

impl TryFrom<ConfirmPaymentBody> for PaymentConfirmationRequest {
    type Error = Error;

    fn try_from(body: ConfirmPaymentBody) -> Result<Self, Self::Error> {
        let intent_field = FieldName::new("paymentIntentId");
        let order_field = FieldName::new("orderId");
        let bid_field = FieldName::new("bidId");
        let payment_intent_id = require(body.payment_intent_id, intent_field)?
            .trim()
            .to_owned();
        if payment_intent_id.is_empty() {
            return Err(field_error(
                intent_field,
                ErrorCode::EmptyField,
                "paymentIntentId must not be empty",
            ));
        }
        Ok(Self {
            payment_intent_id,
            order_id: parse_order_id(&require(body.order_id, order_field)?, order_field)?,
            bid_id: body
                .bid_id
                .map(|raw| parse_bid_id(&raw, bid_field))
                .transpose()?,
        })
    }
}

/// Publishable key and default currency.
#[utoipa::path(
    get,
    path = "/api/payments/config",
    responses((status = 200, description = "Processor settings", body = PaymentsConfigResponse)),
    tags = ["payments"],
    operation_id = "paymentsConfig",
    security([])
)]
#[get("/payments/config")]
pub async fn payments_config(state: web::Data<HttpState>) -> web::Json<PaymentsConfigResponse> {
    let config = state.payments.config();
    web::Json(PaymentsConfigResponse {
        publishable_key: config.publishable_key,
        currency: config.currency.as_str().to_owned(),
    })
}

/// Create (or reuse) the payment intent for an order or one of its bids.
#[utoipa::path(
    post,
    path = "/api/payments/create-payment-intent",
    request_body = CreateIntentBody,
    responses(
        (status = 200, description = "Intent created", body = CreateIntentResponse),
        (status = 400, description = "Invalid request or rejected by processor", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown order or bid", body = Error),
        (status = 409, description = "Order or bid not payable", body = Error),
        (status = 503, description = "Processor unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createPaymentIntent"
)]
#[post("/payments/create-payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateIntentBody>,
) -> ApiResult<web::Json<CreateIntentResponse>> {
    let actor = require_actor(&state, &session).await?;
    let request = PaymentIntentRequest::try_from(payload.into_inner())?;
    let created = state.payments.create_intent(&actor, request).await?;
    Ok(web::Json(CreateIntentResponse {
        client_secret: created.client_secret,
        payment_intent_id: created.payment_intent_id,
        amount: created.amount.minor(),
        currency: created.amount.currency().as_str().to_owned(),
    }))
}

/// Settle an order once the processor reports success.
#[utoipa::path(
    post,
    path = "/api/payments/confirm-payment",
    request_body = ConfirmPaymentBody,
    responses(
        (status = 200, description = "Order paid", body = ConfirmPaymentResponse),
        (status = 400, description = "Invalid request or intent mismatch", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Payment not completed", body = Error),
        (status = 503, description = "Processor unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "confirmPayment"
)]
#[post("/payments/confirm-payment")]
pub async fn confirm_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConfirmPaymentBody>,
) -> ApiResult<web::Json<ConfirmPaymentResponse>> {
    let actor = require_actor(&state, &session).await?;
    let request = PaymentConfirmationRequest::try_from(payload.into_inner())?;
    let confirmation = state.payments.confirm_payment(&actor, request).await?;
    if confirmation.newly_settled {
        info!(
            order_id = %confirmation.order.id,
            transaction_id = %confirmation.transaction.id,
            "order paid"
        );
    }
    Ok(web::Json(ConfirmPaymentResponse {
        order: OrderResponse::from(&confirmation.order),
        transaction: TransactionResponse::from(&confirmation.transaction),
        newly_settled: confirmation.newly_settled,
    }))
}

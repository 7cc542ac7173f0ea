//! Order and bid handlers.
//!
//! ```text
//! POST /api/orders {"title":"Oak wardrobe","budget":150000}
//! GET  /api/orders/{id}
//! POST /api/orders/{id}/bids {"amount":120000}
//! GET  /api/orders/{id}/bids
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateOrderRequest;
use crate::domain::{Currency, Error, OrderId, OrderTitle};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::require_actor;
use crate::inbound::http::dto::{BidResponse, OrderResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, order_validation_error, parse_order_id, require,
};

/// Body of `POST /api/orders`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    #[schema(example = "Oak wardrobe")]
    pub title: Option<String>,
    /// Budget in minor units.
    #[schema(example = 150_000)]
    pub budget: Option<i64>,
    /// Defaults to the processor currency.
    pub currency: Option<String>,
}

/// Body of `POST /api/orders/{id}/bids`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidBody {
    /// Offered price in minor units.
    #[schema(example = 120_000)]
    pub amount: Option<i64>,
}

impl TryFrom<CreateOrderBody> for CreateOrderRequest {
    type Error = Error;

    fn try_from(body: CreateOrderBody) -> Result<Self, Self::Error> {
        let title_field = FieldName::new("title");
        let title = require(body.title, title_field)?;
        let budget_minor = require(body.budget, FieldName::new("budget"))?;
        let currency = body
            .currency
            .map(Currency::new)
            .transpose()
            .map_err(|err| order_validation_error(&err, FieldName::new("currency")))?;
        Ok(Self {
            title: OrderTitle::new(title).map_err(|err| order_validation_error(&err, title_field))?,
            budget_minor,
            currency,
        })
    }
}

fn path_id(raw: &str) -> Result<OrderId, Error> {
    parse_order_id(raw, FieldName::new("id"))
}

/// Open an order.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderBody,
    responses(
        (status = 201, description = "Order opened", body = OrderResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Role may not open orders", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrderBody>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&state, &session).await?;
    let request = CreateOrderRequest::try_from(payload.into_inner())?;
    let order = state.orders.create_order(&actor, request).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(&order)))
}

/// One order visible to the caller.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Unknown or hidden order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    let actor = require_actor(&state, &session).await?;
    let order = state.orders_query.order(&actor, &path_id(&path)?).await?;
    Ok(web::Json(OrderResponse::from(&order)))
}

/// Bid on an open order.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/bids",
    params(("id" = String, Path, description = "Order id")),
    request_body = PlaceBidBody,
    responses(
        (status = 201, description = "Bid placed", body = BidResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Only masters bid", body = Error),
        (status = 409, description = "Order not open", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeBid"
)]
#[post("/orders/{id}/bids")]
pub async fn place_bid(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PlaceBidBody>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&state, &session).await?;
    let order_id = path_id(&path)?;
    let amount = require(payload.into_inner().amount, FieldName::new("amount"))?;
    let bid = state.orders.place_bid(&actor, &order_id, amount).await?;
    Ok(HttpResponse::Created().json(BidResponse::from(&bid)))
}

/// Bids the caller may see on an order.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/bids",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Bids", body = [BidResponse]),
        (status = 404, description = "Unknown or hidden order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listBids"
)]
#[get("/orders/{id}/bids")]
pub async fn list_bids(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<BidResponse>>> {
    let actor = require_actor(&state, &session).await?;
    let bids = state.orders_query.bids(&actor, &path_id(&path)?).await?;
    Ok(web::Json(bids.iter().map(BidResponse::from).collect()))
}

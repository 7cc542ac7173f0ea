//! JSON representations of domain records.
//!
//! Domain types carry no serialisation contract of their own; handlers map
//! them onto these camelCase DTOs, which also define the OpenAPI schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Bid, BidStatus, MasterProfile, Money, Order, OrderStatus, PaymentMethod, RepairReport, Role,
    Transaction, User,
};

/// User as returned by the API. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ivan Stolyarov")]
    pub name: String,
    #[schema(example = "ivan@example.com")]
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role(),
            active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Monetary amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoneyDto {
    #[schema(example = 150_000)]
    pub amount: i64,
    #[schema(example = "rub")]
    pub currency: String,
}

impl From<&Money> for MoneyDto {
    fn from(money: &Money) -> Self {
        Self {
            amount: money.minor(),
            currency: money.currency().as_str().to_owned(),
        }
    }
}

/// Master aggregates; never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterProfileResponse {
    pub user_id: String,
    #[schema(example = 4.5)]
    pub rating: f64,
    pub review_count: u32,
    pub completed_orders: u32,
}

impl From<&MasterProfile> for MasterProfileResponse {
    fn from(profile: &MasterProfile) -> Self {
        Self {
            user_id: profile.user_id().to_string(),
            rating: profile.rating(),
            review_count: profile.review_count(),
            completed_orders: profile.completed_orders(),
        }
    }
}

/// Outcome of the master profile repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairResponse {
    pub repaired: u64,
    pub remaining_incomplete: u64,
}

impl From<RepairReport> for RepairResponse {
    fn from(report: RepairReport) -> Self {
        Self {
            repaired: report.repaired,
            remaining_incomplete: report.remaining_incomplete,
        }
    }
}

/// Order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub client_id: String,
    pub master_id: Option<String>,
    pub title: String,
    pub status: OrderStatus,
    pub budget: MoneyDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            client_id: order.client_id.to_string(),
            master_id: order.master_id.map(|id| id.to_string()),
            title: order.title.as_ref().to_owned(),
            status: order.status,
            budget: MoneyDto::from(&order.budget),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Bid as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub id: String,
    pub order_id: String,
    pub master_id: String,
    pub amount: MoneyDto,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Bid> for BidResponse {
    fn from(bid: &Bid) -> Self {
        Self {
            id: bid.id.to_string(),
            order_id: bid.order_id.to_string(),
            master_id: bid.master_id.to_string(),
            amount: MoneyDto::from(&bid.amount),
            status: bid.status,
            created_at: bid.created_at,
        }
    }
}

/// Recorded payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub order_id: String,
    pub bid_id: Option<String>,
    pub external_payment_id: String,
    pub payment_method: PaymentMethod,
    pub amount: MoneyDto,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            order_id: tx.order_id.to_string(),
            bid_id: tx.bid_id.map(|id| id.to_string()),
            external_payment_id: tx.external_payment_id.clone(),
            payment_method: tx.payment_method,
            amount: MoneyDto::from(&tx.amount),
            created_at: tx.created_at,
        }
    }
}

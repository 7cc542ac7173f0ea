//! Internal Diesel row structs.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain; conversions live in the repositories.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{bids, master_profiles, orders, transactions, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable `users` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub active: bool,
    pub password_hash: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial `users` update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row read from `master_profiles`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = master_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MasterProfileRow {
    pub user_id: Uuid,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub completed_orders: Option<i32>,
}

/// Insertable `master_profiles` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = master_profiles)]
pub(crate) struct NewMasterProfileRow {
    pub user_id: Uuid,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub completed_orders: Option<i32>,
}

/// Row read from and written to `orders`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub master_id: Option<Uuid>,
    pub title: String,
    pub status: String,
    pub budget_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row read from and written to `bids`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bids)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BidRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub master_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Row read from and written to `transactions`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub bid_id: Option<Uuid>,
    pub external_payment_id: String,
    pub payment_method: String,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

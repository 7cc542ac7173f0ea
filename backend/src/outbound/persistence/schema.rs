//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Marketplace accounts.
    users (id) {
        id -> Uuid,
        /// Display name (max 100 characters).
        name -> Varchar,
        /// Lower-cased login email, unique.
        email -> Varchar,
        /// `client`, `master`, `verified_master` or `admin`.
        role -> Varchar,
        active -> Bool,
        /// bcrypt hash; null until a password is set.
        password_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Aggregates for master accounts. Legacy rows may hold nulls.
    master_profiles (user_id) {
        user_id -> Uuid,
        rating -> Nullable<Float8>,
        review_count -> Nullable<Int4>,
        completed_orders -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Work requested by clients.
    orders (id) {
        id -> Uuid,
        client_id -> Uuid,
        master_id -> Nullable<Uuid>,
        title -> Varchar,
        status -> Varchar,
        budget_minor -> Int8,
        currency -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Offers made by masters against orders.
    bids (id) {
        id -> Uuid,
        order_id -> Uuid,
        master_id -> Uuid,
        amount_minor -> Int8,
        currency -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Settled payments; `external_payment_id` is unique.
    transactions (id) {
        id -> Uuid,
        order_id -> Uuid,
        bid_id -> Nullable<Uuid>,
        external_payment_id -> Varchar,
        payment_method -> Varchar,
        amount_minor -> Int8,
        currency -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Client reviews of masters.
    reviews (id) {
        id -> Uuid,
        order_id -> Uuid,
        master_id -> Uuid,
        client_id -> Uuid,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(master_profiles -> users (user_id));
diesel::joinable!(bids -> orders (order_id));
diesel::joinable!(transactions -> orders (order_id));
diesel::joinable!(transactions -> bids (bid_id));
diesel::joinable!(reviews -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    master_profiles,
    orders,
    bids,
    transactions,
    reviews,
);

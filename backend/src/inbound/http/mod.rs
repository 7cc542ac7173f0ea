//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate JSON payloads into domain requests, re-check the
//! session user through [`access`] and map domain errors onto statuses in
//! [`error`].

pub mod access;
pub mod admin;
pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod masters;
pub mod orders;
pub mod payments;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Mount every API handler; callers wrap the result in the `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::register)
        .service(auth::logout)
        .service(auth::me)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::toggle_block)
        .service(users::change_role)
        .service(masters::master_profile)
        .service(admin::repair_master_profiles)
        .service(orders::create_order)
        .service(orders::get_order)
        .service(orders::place_bid)
        .service(orders::list_bids)
        .service(payments::payments_config)
        .service(payments::create_payment_intent)
        .service(payments::confirm_payment);
}

//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the strongly typed marketplace model (users, master
//! profiles, orders, bids, payments) and the use cases driven by inbound
//! adapters. Types validate on construction; invariants and serialisation
//! contracts are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Role, Email, UserName: identity and authorisation.
//! - AuthSession, Actor: explicit session state carried per request.
//! - RoleDestinations: data-driven post-login redirects.
//! - MasterProfile, StoredMasterProfile: non-null aggregates and legacy rows.
//! - Order, Bid, Transaction, PaymentIntent: the payment lifecycle.
//! - *Service types: use-case implementations over the ports.

pub mod auth;
mod auth_service;
pub mod error;
pub mod master_profile;
mod master_profile_service;
pub mod order;
mod order_service;
pub mod payment;
mod payment_service;
pub mod ports;
pub mod role_destination;
pub mod session;
pub mod trace_id;
pub mod user;
mod users_service;

pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MAX_BYTES, PASSWORD_MIN_LEN, Password,
    PasswordHash, PasswordPolicyError, Registration, RegistrationInput,
    RegistrationValidationError,
};
pub use self::auth_service::AuthenticationService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::master_profile::{
    MAX_RATING, MasterAggregates, MasterProfile, RepairReport, StoredMasterProfile,
};
pub use self::master_profile_service::MasterProfileService;
pub use self::order::{
    Bid, BidId, BidStatus, Currency, Money, ORDER_TITLE_MAX, Order, OrderId, OrderStatus,
    OrderTitle, OrderValidationError, PaymentMethod, PaymentSettlement, Transaction,
    TransactionId,
};
pub use self::order_service::OrderService;
pub use self::payment::{
    IntentTarget, METADATA_BID_ID, METADATA_ORDER_ID, NewPaymentIntent, PaymentIntent,
    PaymentIntentStatus, PaymentsConfig,
};
pub use self::payment_service::PaymentService;
pub use self::role_destination::{RoleDestinationError, RoleDestinations};
pub use self::session::{Actor, AuthSession, DEFAULT_SESSION_TTL_MINUTES};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, Role, USER_NAME_MAX, User, UserDraft, UserId, UserName, UserPatch,
    UserValidationError,
};
pub use self::users_service::UserDirectoryService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use masters_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

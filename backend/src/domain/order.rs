//! Orders, bids and payment transactions.
//!
//! A client opens an [`Order`]; masters answer with [`Bid`]s; a successful
//! payment marks the order paid, accepts the chosen bid and records a
//! [`Transaction`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Maximum length of an order title.
pub const ORDER_TITLE_MAX: usize = 200;

/// Validation errors for order values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// Identifier was not a UUID.
    #[error("{kind} id must be a valid UUID")]
    InvalidId {
        /// Which identifier was rejected.
        kind: &'static str,
    },
    /// Amount was zero or negative.
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// Currency was not a three letter code.
    #[error("currency must be a three letter ISO code")]
    InvalidCurrency,
    /// Title blank or too long.
    #[error("title must contain 1 to {max} characters")]
    InvalidTitle {
        /// Maximum length.
        max: usize,
    },
    /// A status string was not recognised.
    #[error("unknown status: {value}")]
    UnknownStatus {
        /// Rejected input.
        value: String,
    },
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse from a UUID string.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, OrderValidationError> {
                Uuid::parse_str(raw.as_ref().trim())
                    .map(Self)
                    .map_err(|_| OrderValidationError::InvalidId { kind: $kind })
            }

            /// Generate a fresh identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap a stored UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Order identifier.
    OrderId,
    "order"
);
uuid_id!(
    /// Bid identifier.
    BidId,
    "bid"
);
uuid_id!(
    /// Transaction identifier.
    TransactionId,
    "transaction"
);

/// ISO 4217 currency code, stored lower-case as payment processors expect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    /// Validate a three letter code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, OrderValidationError> {
        let code = raw.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OrderValidationError::InvalidCurrency);
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// Lower-case code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive amount in minor units (kopecks, cents) of a currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Validate a positive amount.
    pub fn new(minor: i64, currency: Currency) -> Result<Self, OrderValidationError> {
        if minor <= 0 {
            return Err(OrderValidationError::NonPositiveAmount);
        }
        Ok(Self { minor, currency })
    }

    /// Amount in minor units.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Currency of the amount.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = OrderValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(OrderValidationError::UnknownStatus {
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Order lifecycle.
    OrderStatus {
        /// Accepting bids, awaiting payment.
        Open => "open",
        /// Work under way.
        InProgress => "in_progress",
        /// Paid through the processor.
        Paid => "paid",
        /// Work finished.
        Completed => "completed",
        /// Withdrawn by the client.
        Cancelled => "cancelled",
    }
);

wire_enum!(
    /// Bid lifecycle.
    BidStatus {
        /// Awaiting the client's decision.
        Pending => "pending",
        /// Chosen and paid for.
        Accepted => "accepted",
        /// Declined.
        Rejected => "rejected",
    }
);

wire_enum!(
    /// How a transaction was settled.
    PaymentMethod {
        /// Internal balance.
        Balance => "balance",
        /// Card payment through the processor.
        Card => "card",
    }
);

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Balance
    }
}

/// Validated order title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTitle(String);

impl OrderTitle {
    /// Trim and validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, OrderValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || trimmed.chars().count() > ORDER_TITLE_MAX {
            return Err(OrderValidationError::InvalidTitle {
                max: ORDER_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for OrderTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Work requested by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Identifier.
    pub id: OrderId,
    /// Owning client.
    pub client_id: UserId,
    /// Master assigned once a bid is paid.
    pub master_id: Option<UserId>,
    /// Short description.
    pub title: OrderTitle,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Amount charged when paying without a bid.
    pub budget: Money,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Open a new order.
    pub fn open(
        client_id: UserId,
        title: OrderTitle,
        budget: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::random(),
            client_id,
            master_id: None,
            title,
            status: OrderStatus::Open,
            budget,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the order may be paid.
    pub fn is_payable(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Apply a successful payment.
    pub fn mark_paid(&mut self, master_id: Option<UserId>, now: DateTime<Utc>) {
        self.status = OrderStatus::Paid;
        if master_id.is_some() {
            self.master_id = master_id;
        }
        self.updated_at = now;
    }
}

/// Offer by a master against an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    /// Identifier.
    pub id: BidId,
    /// Order bid on.
    pub order_id: OrderId,
    /// Bidding master.
    pub master_id: UserId,
    /// Offered price.
    pub amount: Money,
    /// Lifecycle state.
    pub status: BidStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Bid {
    /// Place a pending bid.
    pub fn place(order_id: OrderId, master_id: UserId, amount: Money, now: DateTime<Utc>) -> Self {
        Self {
            id: BidId::random(),
            order_id,
            master_id,
            amount,
            status: BidStatus::Pending,
            created_at: now,
        }
    }
}

/// Settled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Identifier.
    pub id: TransactionId,
    /// Paid order.
    pub order_id: OrderId,
    /// Accepted bid, if payment was for a bid.
    pub bid_id: Option<BidId>,
    /// Processor-side identifier (payment intent id).
    pub external_payment_id: String,
    /// Settlement method.
    pub payment_method: PaymentMethod,
    /// Charged amount.
    pub amount: Money,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}

/// Everything a successful payment changes, applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSettlement {
    /// Order to mark paid.
    pub order_id: OrderId,
    /// Master to assign, taken from the bid.
    pub master_id: Option<UserId>,
    /// Transaction to record; its `bid_id` is the bid to accept.
    pub transaction: Transaction,
    /// Settlement time.
    pub settled_at: DateTime<Utc>,
}

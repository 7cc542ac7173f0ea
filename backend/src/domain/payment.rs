//! Payment intents as seen by the marketplace.
//!
//! A payment intent is a processor-side object for a pending charge. The
//! marketplace creates it for an order (optionally a bid), hands the client
//! secret to the front end, and later re-reads the intent to decide whether
//! the order is paid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::order::{BidId, Currency, Money, OrderId};

/// Metadata key holding the order identifier.
pub const METADATA_ORDER_ID: &str = "order_id";
/// Metadata key holding the bid identifier.
pub const METADATA_BID_ID: &str = "bid_id";

/// Processor-reported state of an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    /// Awaiting card details.
    RequiresPaymentMethod,
    /// Awaiting confirmation.
    RequiresConfirmation,
    /// Awaiting customer action such as 3-D Secure.
    RequiresAction,
    /// Being processed.
    Processing,
    /// Authorised, awaiting capture.
    RequiresCapture,
    /// Abandoned.
    Canceled,
    /// Charged.
    Succeeded,
    /// Status this service does not know about.
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    /// Parse a processor status, mapping unrecognised values to [`Self::Unknown`].
    pub fn parse(raw: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(raw.to_owned()))
            .unwrap_or(Self::Unknown)
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

/// Order and bid an intent pays for, stored as intent metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentTarget {
    /// Order being paid.
    pub order_id: OrderId,
    /// Bid being accepted, if any.
    pub bid_id: Option<BidId>,
}

impl IntentTarget {
    /// Metadata map sent to the processor.
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_ORDER_ID.to_owned(), self.order_id.to_string());
        if let Some(bid_id) = self.bid_id {
            metadata.insert(METADATA_BID_ID.to_owned(), bid_id.to_string());
        }
        metadata
    }

    /// True when `metadata` names exactly this order and bid.
    pub fn matches(&self, metadata: &BTreeMap<String, String>) -> bool {
        let order_matches = metadata
            .get(METADATA_ORDER_ID)
            .and_then(|raw| OrderId::new(raw).ok())
            == Some(self.order_id);
        let stored_bid = metadata
            .get(METADATA_BID_ID)
            .filter(|raw| !raw.is_empty())
            .map(BidId::new);
        let bid_matches = match (stored_bid, self.bid_id) {
            (None, None) => true,
            (Some(Ok(stored)), Some(expected)) => stored == expected,
            _ => false,
        };
        order_matches && bid_matches
    }

    /// Deterministic idempotency key for creating an intent.
    ///
    /// The same order, bid and amount always produce the same key, so a
    /// retried request reuses the intent the processor already created.
    ///
    /// # Examples
    /// ```
    /// use masters_backend::domain::{Currency, IntentTarget, Money, OrderId};
    ///
    /// let target = IntentTarget { order_id: OrderId::random(), bid_id: None };
    /// let amount = Money::new(1_000, Currency::new("rub").expect("currency")).expect("amount");
    /// assert_eq!(target.idempotency_key(&amount), target.idempotency_key(&amount));
    /// ```
    pub fn idempotency_key(&self, amount: &Money) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.order_id.as_uuid().as_bytes());
        hasher.update(b"|");
        if let Some(bid_id) = self.bid_id {
            hasher.update(bid_id.as_uuid().as_bytes());
        }
        hasher.update(b"|");
        hasher.update(amount.minor().to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(amount.currency().as_str().as_bytes());
        format!("intent-{}", hex::encode(hasher.finalize()))
    }
}

/// Request to create an intent at the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    /// Amount to charge.
    pub amount: Money,
    /// What is being paid for.
    pub target: IntentTarget,
    /// Key the processor uses to de-duplicate retries.
    pub idempotency_key: String,
}

/// Intent as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Processor identifier, e.g. `pi_...`.
    pub id: String,
    /// Secret the front end uses to confirm the payment.
    pub client_secret: Option<String>,
    /// Current state.
    pub status: PaymentIntentStatus,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Lower-case currency code.
    pub currency: String,
    /// Metadata attached at creation.
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntent {
    /// True when the intent charges exactly `amount`.
    pub fn charges(&self, amount: &Money) -> bool {
        self.amount_minor == amount.minor()
            && self.currency.eq_ignore_ascii_case(amount.currency().as_str())
    }
}

/// Public processor settings exposed to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentsConfig {
    /// Publishable (client-side) key.
    pub publishable_key: String,
    /// Default currency for orders.
    pub currency: Currency,
}

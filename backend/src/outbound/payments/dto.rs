//! DTOs for decoding Stripe JSON responses.
//!
//! Responses are decoded into these transport structs first, then mapped onto
//! [`PaymentIntent`] in one pass.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{PaymentIntent, PaymentIntentStatus};

#[derive(Debug, Deserialize)]
pub(super) struct PaymentIntentDto {
    pub(super) id: String,
    pub(super) client_secret: Option<String>,
    pub(super) status: String,
    pub(super) amount: i64,
    pub(super) currency: String,
    #[serde(default)]
    pub(super) metadata: BTreeMap<String, String>,
}

impl PaymentIntentDto {
    pub(super) fn into_domain(self) -> PaymentIntent {
        PaymentIntent {
            id: self.id,
            client_secret: self.client_secret,
            status: PaymentIntentStatus::parse(&self.status),
            amount_minor: self.amount,
            currency: self.currency,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(rename = "type")]
    pub(super) error_type: Option<String>,
    pub(super) code: Option<String>,
    pub(super) message: Option<String>,
}

impl ErrorDto {
    pub(super) fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(kind) = self.error_type.as_deref() {
            parts.push(kind);
        }
        if let Some(code) = self.code.as_deref() {
            parts.push(code);
        }
        let head = parts.join("/");
        match (head.is_empty(), self.message.as_deref()) {
            (true, Some(message)) => message.to_owned(),
            (false, Some(message)) => format!("{head}: {message}"),
            (_, None) => head,
        }
    }
}

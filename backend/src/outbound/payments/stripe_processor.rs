//! Reqwest-backed Stripe adapter.
//!
//! This adapter owns transport details only: form encoding, bearer auth,
//! idempotency headers, timeout and HTTP error mapping, and JSON decoding into
//! [`PaymentIntent`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{ErrorEnvelopeDto, PaymentIntentDto};
use crate::domain::ports::{PaymentProcessor, PaymentProcessorError};
use crate::domain::{NewPaymentIntent, PaymentIntent};

/// Production API root.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/";

/// Stripe payment intent client.
pub struct StripePaymentProcessor {
    client: Client,
    base: Url,
    secret_key: Zeroizing<String>,
}

impl StripePaymentProcessor {
    /// Build an adapter against `base` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            secret_key: Zeroizing::new(secret_key.into()),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentProcessorError> {
        self.base
            .join(path)
            .map_err(|err| PaymentProcessorError::transport(format!("invalid endpoint: {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<PaymentIntent, PaymentProcessorError> {
        let response = request
            .bearer_auth(self.secret_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_intent(body.as_ref())
    }
}

/// Form fields for intent creation.
fn intent_form(request: &NewPaymentIntent) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_owned(), request.amount.minor().to_string()),
        (
            "currency".to_owned(),
            request.amount.currency().as_str().to_owned(),
        ),
        (
            "automatic_payment_methods[enabled]".to_owned(),
            "true".to_owned(),
        ),
    ];
    form.extend(
        request
            .target
            .to_metadata()
            .into_iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value)),
    );
    form
}

#[async_trait]
impl PaymentProcessor for StripePaymentProcessor {
    async fn create_intent(
        &self,
        request: &NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentProcessorError> {
        let url = self.endpoint("v1/payment_intents")?;
        let builder = self
            .client
            .post(url)
            .header("Idempotency-Key", request.idempotency_key.as_str())
            .form(&intent_form(request));
        self.send(builder).await
    }

    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentProcessorError> {
        if intent_id.is_empty() || !intent_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(PaymentProcessorError::rejected(format!(
                "malformed payment intent id: {intent_id}"
            )));
        }
        let url = self.endpoint(&format!("v1/payment_intents/{intent_id}"))?;
        self.send(self.client.get(url)).await
    }
}

fn parse_intent(body: &[u8]) -> Result<PaymentIntent, PaymentProcessorError> {
    serde_json::from_slice::<PaymentIntentDto>(body)
        .map(PaymentIntentDto::into_domain)
        .map_err(|err| PaymentProcessorError::decode(format!("invalid payment intent: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> PaymentProcessorError {
    PaymentProcessorError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentProcessorError {
    let detail = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.summary())
        .unwrap_or_default();
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            PaymentProcessorError::transport(message)
        }
        _ if status.is_client_error() => PaymentProcessorError::rejected(message),
        _ => PaymentProcessorError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network request and response helpers.

    use super::*;
    use crate::domain::{BidId, Currency, IntentTarget, Money, OrderId, PaymentIntentStatus};
    use rstest::rstest;

    fn request(bid: bool) -> NewPaymentIntent {
        let target = IntentTarget {
            order_id: OrderId::random(),
            bid_id: bid.then(BidId::random),
        };
        let amount = Money::new(4_200, Currency::new("rub").expect("currency")).expect("amount");
        NewPaymentIntent {
            idempotency_key: target.idempotency_key(&amount),
            amount,
            target,
        }
    }

    #[rstest]
    fn form_carries_amount_currency_and_metadata() {
        let request = request(true);
        let form = intent_form(&request);
        assert!(form.contains(&("amount".to_owned(), "4200".to_owned())));
        assert!(form.contains(&("currency".to_owned(), "rub".to_owned())));
        assert!(form.contains(&(
            "metadata[order_id]".to_owned(),
            request.target.order_id.to_string()
        )));
        assert!(form.iter().any(|(key, _)| key == "metadata[bid_id]"));
    }

    #[rstest]
    fn form_omits_bid_when_paying_the_budget() {
        let form = intent_form(&request(false));
        assert!(form.iter().all(|(key, _)| key != "metadata[bid_id]"));
    }

    #[rstest]
    fn parses_intent_payload() {
        let body = br#"{
            "id": "pi_123",
            "object": "payment_intent",
            "client_secret": "pi_123_secret_abc",
            "status": "succeeded",
            "amount": 4200,
            "currency": "rub",
            "metadata": { "order_id": "7b0c1f43-2c6f-4b8e-9a7b-3b0c7d1e2f30" }
        }"#;
        let intent = parse_intent(body).expect("decodes");
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
        assert_eq!(intent.amount_minor, 4200);
        assert_eq!(intent.metadata.len(), 1);
    }

    #[rstest]
    fn malformed_payload_is_a_decode_error() {
        let err = parse_intent(b"{\"id\": 5}").expect_err("bad payload");
        assert!(matches!(err, PaymentProcessorError::Decode { .. }));
    }

    #[rstest]
    #[case::card_declined(StatusCode::PAYMENT_REQUIRED, "rejected")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "rejected")]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "transport")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "transport")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let body = br#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#;
        let err = map_status_error(status, body);
        assert_eq!(err.kind(), expected);
        assert!(err.to_string().contains("card_error/card_declined"));
    }

    #[tokio::test]
    async fn malformed_intent_ids_never_reach_the_network() {
        let processor = StripePaymentProcessor::new(
            Url::parse("http://127.0.0.1:9/").expect("url"),
            "sk_test_x",
            Duration::from_millis(50),
        )
        .expect("client");
        let err = processor
            .retrieve_intent("../v1/customers")
            .await
            .expect_err("rejected");
        assert_eq!(err.kind(), "rejected");
    }
}

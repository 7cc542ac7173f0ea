//! In-process payment processor.
//!
//! Intents live in memory and keep whatever status they were created with
//! until [`FixturePaymentProcessor::set_status`] changes it. Repeated
//! idempotency keys return the original intent, as the real processor does.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{PaymentProcessor, PaymentProcessorError};
use crate::domain::{NewPaymentIntent, PaymentIntent, PaymentIntentStatus};

#[derive(Default)]
struct FixtureState {
    next_seq: u64,
    intents: HashMap<String, PaymentIntent>,
    by_idempotency_key: HashMap<String, String>,
}

/// Payment processor backed by a map of intents.
pub struct FixturePaymentProcessor {
    initial_status: PaymentIntentStatus,
    state: Mutex<FixtureState>,
}

impl Default for FixturePaymentProcessor {
    fn default() -> Self {
        Self::new(PaymentIntentStatus::RequiresPaymentMethod)
    }
}

impl FixturePaymentProcessor {
    /// New intents start in `initial_status`.
    pub fn new(initial_status: PaymentIntentStatus) -> Self {
        Self {
            initial_status,
            state: Mutex::new(FixtureState::default()),
        }
    }

    /// Intents succeed as soon as they are created.
    pub fn auto_succeed() -> Self {
        Self::new(PaymentIntentStatus::Succeeded)
    }

    fn lock(&self) -> Result<MutexGuard<'_, FixtureState>, PaymentProcessorError> {
        self.state
            .lock()
            .map_err(|_| PaymentProcessorError::transport("fixture processor lock poisoned"))
    }

    /// Change the status an intent reports. Returns `false` for unknown ids.
    pub fn set_status(&self, intent_id: &str, status: PaymentIntentStatus) -> bool {
        let Ok(mut state) = self.lock() else {
            return false;
        };
        match state.intents.get_mut(intent_id) {
            Some(intent) => {
                intent.status = status;
                true
            }
            None => false,
        }
    }

    /// Number of distinct intents created.
    pub fn intent_count(&self) -> usize {
        self.lock().map(|state| state.intents.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PaymentProcessor for FixturePaymentProcessor {
    async fn create_intent(
        &self,
        request: &NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentProcessorError> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .by_idempotency_key
            .get(&request.idempotency_key)
            .and_then(|id| state.intents.get(id))
        {
            return Ok(existing.clone());
        }
        state.next_seq += 1;
        let id = format!("pi_fixture_{}", state.next_seq);
        let intent = PaymentIntent {
            client_secret: Some(format!("{id}_secret_fixture")),
            id: id.clone(),
            status: self.initial_status.clone(),
            amount_minor: request.amount.minor(),
            currency: request.amount.currency().as_str().to_owned(),
            metadata: request.target.to_metadata(),
        };
        state
            .by_idempotency_key
            .insert(request.idempotency_key.clone(), id.clone());
        state.intents.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentProcessorError> {
        self.lock()?
            .intents
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PaymentProcessorError::rejected(format!("no such intent: {intent_id}")))
    }
}

use async_trait::async_trait;
use checkout_core::payment::{CreateIntentRequest, IntentStatus, PaymentClient, PaymentIntent};
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-process stand-in for the payment processor.
///
/// Intents live in memory; `set_status` plays the part of the browser
/// confirming a card against the provider.
#[derive(Default)]
pub struct MockPaymentClient {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    counter: AtomicU64,
    session: Option<String>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockPaymentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intent ids carry `session`, e.g. `mock_pi_<session>_1`.
    pub fn with_session(session: &str) -> Self {
        Self {
            session: Some(session.to_string()),
            ..Self::default()
        }
    }

    /// Ids unique across process restarts, for use against a persistent store.
    pub fn session_scoped() -> Self {
        let suffix: u16 = rand::thread_rng().gen_range(0..10000);
        Self::with_session(&format!("{}{:04}", Utc::now().timestamp_millis(), suffix))
    }

    /// Every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn set_status(&self, intent_id: &str, status: IntentStatus) {
        if let Some(intent) = self.intents.lock().await.get_mut(intent_id) {
            intent.status = status;
        }
    }

    pub async fn intent_count(&self) -> usize {
        self.intents.lock().await.len()
    }

    async fn simulate(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentClient for MockPaymentClient {
    async fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.simulate().await?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = match &self.session {
            Some(session) => format!("mock_pi_{}_{}", session, n),
            None => format!("mock_pi_{}", n),
        };
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id: id.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            status: IntentStatus::RequiresPaymentMethod,
        };
        self.intents.lock().await.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.simulate().await?;

        self.intents
            .lock()
            .await
            .get(intent_id)
            .cloned()
            .ok_or_else(|| format!("No such payment_intent: '{}'", intent_id).into())
    }
}

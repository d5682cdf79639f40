use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of a provider-side payment intent (Stripe vocabulary).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String, // Provider's ID (e.g., pi_123)
    pub amount: i64,
    pub currency: String,
    pub status: IntentStatus,
    pub client_secret: Option<String>,
}

/// Everything the provider needs to open an authorization for one order.
#[derive(Debug, Clone)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Capability handle onto the external payment processor.
///
/// Card authorization itself never passes through this process; the browser
/// confirms the card against the provider using the intent's client secret.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Create a payment intent with the provider
    async fn create_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    /// Retrieve intent status
    async fn retrieve_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;
}

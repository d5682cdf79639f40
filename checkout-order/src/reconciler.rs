use checkout_core::payment::{IntentStatus, PaymentClient};
use checkout_core::signature::WebhookVerifier;
use checkout_core::{CheckoutError, CheckoutResult, FieldViolation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Order, OrderStatus, Transition};
use crate::repository::OrderStore;

pub const EVENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";
pub const EVENT_CANCELED: &str = "payment_intent.canceled";

/// A payment outcome reported to this system.
#[derive(Debug, Clone)]
pub enum PaymentNotification {
    /// The browser finished confirming the card and asks for the order to be
    /// finalized. The provider is re-queried; the client's word is not taken.
    Confirmation { payment_reference: String },
    /// Raw event pushed by the provider plus its signature header.
    ProviderEvent {
        payload: Vec<u8>,
        signature: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated(Order),
    /// Duplicate delivery; the order already had the target status.
    Unchanged(Order),
    /// No order carries this payment reference. Acknowledged, nothing created.
    UnknownReference(String),
    /// Event type or intent status that does not move an order.
    Ignored(String),
    /// The state machine refused the move (e.g. `paid` after `failed`).
    Rejected { reference: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct ProviderEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    type_: String,
    /// Shape depends on the event type; only read for payment intent events.
    #[serde(default)]
    data: serde_json::Value,
}

impl ProviderEvent {
    fn object_id(&self) -> Option<&str> {
        self.data.pointer("/object/id").and_then(serde_json::Value::as_str)
    }
}

/// Moves orders out of `pending` once the provider has decided.
///
/// Safe under at-least-once, reordered delivery: the only targets are `paid`
/// and `failed`, re-entry is a no-op and terminal states never change.
pub struct PaymentReconciler {
    payments: Arc<dyn PaymentClient>,
    store: Arc<dyn OrderStore>,
    verifier: Option<WebhookVerifier>,
    provider_timeout: Duration,
}

impl PaymentReconciler {
    pub fn new(
        payments: Arc<dyn PaymentClient>,
        store: Arc<dyn OrderStore>,
        verifier: Option<WebhookVerifier>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            payments,
            store,
            verifier,
            provider_timeout,
        }
    }

    pub fn verifies_signatures(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn reconcile(&self, notification: PaymentNotification) -> CheckoutResult<ReconcileOutcome> {
        match notification {
            PaymentNotification::Confirmation { payment_reference } => {
                self.reconcile_confirmation(&payment_reference).await
            }
            PaymentNotification::ProviderEvent { payload, signature } => {
                self.reconcile_event(&payload, signature.as_deref()).await
            }
        }
    }

    async fn reconcile_confirmation(&self, reference: &str) -> CheckoutResult<ReconcileOutcome> {
        let intent = match tokio::time::timeout(
            self.provider_timeout,
            self.payments.retrieve_intent(reference),
        )
        .await
        {
            Ok(Ok(intent)) => intent,
            Ok(Err(e)) => return Err(CheckoutError::PaymentProviderError(e.to_string())),
            Err(_) => {
                return Err(CheckoutError::PaymentProviderError(format!(
                    "payment provider did not answer within {:?}",
                    self.provider_timeout
                )))
            }
        };

        let target = match intent.status {
            IntentStatus::Succeeded => OrderStatus::Paid,
            IntentStatus::Canceled => OrderStatus::Failed,
            other => {
                tracing::debug!("Intent {} is {:?}, order stays pending", reference, other);
                return Ok(ReconcileOutcome::Ignored(format!("{:?}", other)));
            }
        };
        self.apply(reference, target).await
    }

    async fn reconcile_event(&self, payload: &[u8], signature: Option<&str>) -> CheckoutResult<ReconcileOutcome> {
        if let Some(verifier) = &self.verifier {
            verifier.verify(payload, signature).map_err(|e| {
                tracing::warn!("Webhook signature verification failed: {}", e);
                CheckoutError::AuthenticationError(e.to_string())
            })?;
        }

        let event: ProviderEvent = serde_json::from_slice(payload).map_err(|e| {
            CheckoutError::ValidationError(vec![FieldViolation::new("event", &e.to_string())])
        })?;

        let target = match event.type_.as_str() {
            EVENT_SUCCEEDED => OrderStatus::Paid,
            EVENT_PAYMENT_FAILED | EVENT_CANCELED => OrderStatus::Failed,
            _ => {
                tracing::debug!(
                    "Ignoring webhook {}: {}",
                    event.id.as_deref().unwrap_or("-"),
                    event.type_
                );
                return Ok(ReconcileOutcome::Ignored(event.type_));
            }
        };

        let reference = event.object_id().ok_or_else(|| {
            CheckoutError::ValidationError(vec![FieldViolation::new(
                "data.object.id",
                "payment intent events must carry an intent id",
            )])
        })?;
        tracing::info!(
            "Received webhook {}: {} for intent {}",
            event.id.as_deref().unwrap_or("-"),
            event.type_,
            reference
        );
        self.apply(reference, target).await
    }

    async fn apply(&self, reference: &str, target: OrderStatus) -> CheckoutResult<ReconcileOutcome> {
        // Only payment references identify orders here, never order ids
        if self.store.find_by_payment_reference(reference).await?.is_none() {
            tracing::info!("No order for payment {}, acknowledging", reference);
            return Ok(ReconcileOutcome::UnknownReference(reference.to_string()));
        }

        match self.store.update_status(reference, target).await {
            Ok(change) => match change.transition {
                Transition::Applied => {
                    tracing::info!("Order {} marked {} via payment {}", change.order.id, target, reference);
                    Ok(ReconcileOutcome::Updated(change.order))
                }
                Transition::NoOp => Ok(ReconcileOutcome::Unchanged(change.order)),
            },
            Err(CheckoutError::NotFoundError(_)) => {
                Ok(ReconcileOutcome::UnknownReference(reference.to_string()))
            }
            Err(e @ CheckoutError::InvalidTransition { .. }) => {
                tracing::warn!("Ignoring payment {} update: {}", reference, e);
                Ok(ReconcileOutcome::Rejected {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}

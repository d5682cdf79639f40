use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use checkout_order::PaymentNotification;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// POST /webhook
/// Receive payment status updates from the provider. The raw body is kept
/// intact because the signature covers the exact bytes.
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state
        .reconciler
        .reconcile(PaymentNotification::ProviderEvent {
            payload: body.to_vec(),
            signature,
        })
        .await?;
    tracing::debug!("Webhook reconciled: {:?}", outcome);

    Ok(Json(WebhookAck { received: true }))
}

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use checkout_order::{lookup_status, PaymentNotification, StatusView};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub payment_intent: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-status", get(payment_status))
        .route("/confirm-payment", post(confirm_payment))
}

/// GET /payment-status?orderId=..&payment_intent=..
async fn payment_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusView>, AppError> {
    let order_id = query.order_id.as_deref().filter(|s| !s.is_empty());
    let reference = query.payment_intent.as_deref().filter(|s| !s.is_empty());
    if order_id.is_none() && reference.is_none() {
        return Err(AppError::BadRequest(
            "orderId or payment_intent is required".to_string(),
        ));
    }

    Ok(Json(lookup_status(state.store.as_ref(), order_id, reference).await?))
}

/// POST /confirm-payment
/// Client reports that card confirmation finished; re-checked with the provider
async fn confirm_payment(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<StatusView>, AppError> {
    if req.payment_intent.trim().is_empty() {
        return Err(AppError::BadRequest("paymentIntent is required".to_string()));
    }

    let outcome = state
        .reconciler
        .reconcile(PaymentNotification::Confirmation {
            payment_reference: req.payment_intent.clone(),
        })
        .await?;
    tracing::debug!("Confirmation for {} reconciled: {:?}", req.payment_intent, outcome);

    Ok(Json(
        lookup_status(state.store.as_ref(), None, Some(&req.payment_intent)).await?,
    ))
}

use axum::{extract::State, routing::post, Json, Router};
use checkout_catalog::{clamp_quantity, Pricing, ShippingZone};
use checkout_order::{Cart, Order};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub client_secret: String,
    pub order_id: String,
    pub order: Order,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingRequest {
    pub country: String,
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ShippingResponse {
    pub shipping: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub country: String,
    pub quantity: Option<i64>,
    pub is_preorder: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quantity: u32,
    pub zone: ShippingZone,
    pub unit_price_cents: i64,
    #[serde(flatten)]
    pub pricing: Pricing,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/calculate-shipping", post(calculate_shipping))
        .route("/quote", post(quote))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /create-checkout-session
/// Price the cart, open a payment intent and persist a pending order
async fn create_checkout_session(
    State(state): State<AppState>,
    Json(cart): Json<Cart>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    let session = state.orchestrator.create_checkout(&cart).await?;

    Ok(Json(CheckoutSessionResponse {
        client_secret: session.client_secret,
        order_id: session.order.id.clone(),
        order: session.order,
    }))
}

/// POST /calculate-shipping
/// Shipping fee preview in cents
async fn calculate_shipping(
    State(state): State<AppState>,
    Json(req): Json<ShippingRequest>,
) -> Json<ShippingResponse> {
    let quantity = clamp_quantity(req.quantity.unwrap_or(1));
    Json(ShippingResponse {
        shipping: state.pricing.shipping_fee(&req.country, quantity),
    })
}

/// POST /quote
/// Full price breakdown for the live cart preview
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Json<QuoteResponse> {
    let quantity = clamp_quantity(req.quantity.unwrap_or(1));
    Json(QuoteResponse {
        quantity,
        zone: ShippingZone::from_country(&req.country),
        unit_price_cents: state.pricing.unit_price_cents(req.is_preorder),
        pricing: state.pricing.price(quantity, &req.country, req.is_preorder),
        currency: state.orchestrator.settings().currency.clone(),
    })
}

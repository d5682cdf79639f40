use checkout_catalog::PricingEngine;
use checkout_core::payment::{CreateIntentRequest, PaymentClient, PaymentIntent};
use checkout_core::{CheckoutError, CheckoutResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cart::{Cart, ValidCart};
use crate::models::{Order, OrderStatus};
use crate::repository::OrderStore;

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// ISO currency code sent to the provider, lowercase.
    pub currency: String,
    /// Upper bound on any single payment-provider call.
    pub provider_timeout: Duration,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "hkd".to_string(),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// What the browser needs to confirm the card payment.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub client_secret: String,
    pub order: Order,
}

/// Turns a cart into a priced, persisted `pending` order backed by a
/// provider payment intent.
pub struct CheckoutOrchestrator {
    payments: Arc<dyn PaymentClient>,
    store: Arc<dyn OrderStore>,
    pricing: PricingEngine,
    settings: CheckoutSettings,
}

impl CheckoutOrchestrator {
    pub fn new(
        payments: Arc<dyn PaymentClient>,
        store: Arc<dyn OrderStore>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            payments,
            store,
            pricing: PricingEngine::new(),
            settings,
        }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Validate, price, open a payment intent, persist.
    ///
    /// A provider failure or timeout surfaces as `PaymentProviderError` and
    /// is never retried here: a second intent for the same cart could charge
    /// twice. Nothing is persisted unless the intent was created.
    pub async fn create_checkout(&self, cart: &Cart) -> CheckoutResult<CheckoutSession> {
        let valid = cart.validate()?;
        let mut order = self.price_order(valid);

        let intent = self.create_intent(&order).await?;
        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            CheckoutError::PaymentProviderError(format!(
                "payment intent {} has no client secret",
                intent.id
            ))
        })?;
        if intent.amount != order.pricing.total_cents {
            tracing::warn!(
                "Provider intent {} amount {} differs from order total {}",
                intent.id,
                intent.amount,
                order.pricing.total_cents
            );
        }
        order.payment_reference = Some(intent.id);

        self.store.append(&order).await?;

        tracing::info!(
            "Order {} created: qty {} to {}, total {} {}, intent {}",
            order.id,
            order.quantity,
            order.customer.country,
            order.pricing.total_cents,
            order.currency,
            order.payment_reference.as_deref().unwrap_or_default()
        );

        Ok(CheckoutSession {
            client_secret,
            order,
        })
    }

    fn price_order(&self, valid: ValidCart) -> Order {
        let pricing = self
            .pricing
            .price(valid.quantity, &valid.customer.country, valid.is_preorder);
        Order::new(
            valid.customer,
            valid.quantity,
            valid.is_preorder,
            pricing,
            &self.settings.currency,
        )
    }

    async fn create_intent(&self, order: &Order) -> CheckoutResult<PaymentIntent> {
        let customer = &order.customer;
        let metadata = BTreeMap::from([
            ("orderId".to_string(), order.id.clone()),
            ("fullname".to_string(), customer.full_name.clone()),
            ("address".to_string(), customer.address.expose().clone()),
            ("city".to_string(), customer.city.clone()),
            ("country".to_string(), customer.country.clone()),
            ("quantity".to_string(), order.quantity.to_string()),
            ("isPreorder".to_string(), order.is_preorder.to_string()),
        ]);
        let request = CreateIntentRequest {
            amount: order.pricing.total_cents,
            currency: order.currency.clone(),
            receipt_email: Some(customer.email.expose().clone()),
            metadata,
        };

        match tokio::time::timeout(
            self.settings.provider_timeout,
            self.payments.create_intent(&request),
        )
        .await
        {
            Ok(Ok(intent)) => Ok(intent),
            Ok(Err(e)) => {
                tracing::error!("Payment intent creation failed for {}: {}", order.id, e);
                Err(CheckoutError::PaymentProviderError(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    "Payment intent creation for {} timed out after {:?}",
                    order.id,
                    self.settings.provider_timeout
                );
                Err(CheckoutError::PaymentProviderError(format!(
                    "payment provider did not answer within {:?}",
                    self.settings.provider_timeout
                )))
            }
        }
    }
}

/// Result of a checkout attempt after the caller's degradation policy.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    Live(CheckoutSession),
    /// Non-authoritative order built locally because the payment backend was
    /// unreachable. Must be shown to the user as a demo, never as a payment.
    Demo(Order),
}

impl CheckoutOutcome {
    /// Degrade a provider failure into a local `completed_demo` order.
    ///
    /// Only `PaymentProviderError` degrades; invalid carts and store failures
    /// are returned unchanged.
    pub fn resolve(result: CheckoutResult<CheckoutSession>, cart: &Cart) -> CheckoutResult<Self> {
        match result {
            Ok(session) => Ok(CheckoutOutcome::Live(session)),
            Err(CheckoutError::PaymentProviderError(reason)) => {
                tracing::warn!("Payment backend unreachable ({}), creating demo order", reason);
                Ok(CheckoutOutcome::Demo(demo_order(cart)?))
            }
            Err(e) => Err(e),
        }
    }

    pub fn order(&self) -> &Order {
        match self {
            CheckoutOutcome::Live(session) => &session.order,
            CheckoutOutcome::Demo(order) => order,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, CheckoutOutcome::Demo(_))
    }
}

/// Build a client-only `completed_demo` order. It carries no payment
/// reference and is never written to an `OrderStore`.
pub fn demo_order(cart: &Cart) -> CheckoutResult<Order> {
    let valid = cart.validate()?;
    let pricing = PricingEngine::new().price(valid.quantity, &valid.customer.country, valid.is_preorder);
    let mut order = Order::new(
        valid.customer,
        valid.quantity,
        valid.is_preorder,
        pricing,
        &CheckoutSettings::default().currency,
    );
    order.status = OrderStatus::CompletedDemo;
    Ok(order)
}

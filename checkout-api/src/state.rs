use std::sync::Arc;
use checkout_catalog::PricingEngine;
use checkout_core::payment::PaymentClient;
use checkout_core::signature::WebhookVerifier;
use checkout_order::{CheckoutOrchestrator, CheckoutSettings, OrderStore, PaymentReconciler};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<CheckoutOrchestrator>,
    pub reconciler: Arc<PaymentReconciler>,
    pub store: Arc<dyn OrderStore>,
    pub pricing: PricingEngine,
}

impl AppState {
    pub fn new(
        payments: Arc<dyn PaymentClient>,
        store: Arc<dyn OrderStore>,
        settings: CheckoutSettings,
        verifier: Option<WebhookVerifier>,
    ) -> Self {
        let reconciler = PaymentReconciler::new(
            payments.clone(),
            store.clone(),
            verifier,
            settings.provider_timeout,
        );
        let orchestrator = CheckoutOrchestrator::new(payments, store.clone(), settings);

        Self {
            pricing: *orchestrator.pricing(),
            orchestrator: Arc::new(orchestrator),
            reconciler: Arc::new(reconciler),
            store,
        }
    }
}

pub mod cart;
pub mod models;
pub mod repository;
pub mod mock;
pub mod orchestrator;
pub mod reconciler;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use cart::{Cart, ValidCart};
pub use models::{generate_order_id, Customer, Order, OrderStatus, Transition};
pub use mock::MockPaymentClient;
pub use repository::{InMemoryOrderStore, OrderStore, StatusChange};
pub use orchestrator::{demo_order, CheckoutOrchestrator, CheckoutOutcome, CheckoutSession, CheckoutSettings};
pub use reconciler::{PaymentNotification, PaymentReconciler, ReconcileOutcome};
pub use status::{lookup_status, StatusView};

use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult};
use tokio::sync::RwLock;

use crate::models::{Order, OrderStatus, Transition};

/// Outcome of `OrderStore::update_status`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order: Order,
    pub transition: Transition,
}

/// Append/update-only collection of orders, keyed by order id and by
/// payment reference. Orders are never deleted.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn append(&self, order: &Order) -> CheckoutResult<()>;

    async fn find_by_id(&self, id: &str) -> CheckoutResult<Option<Order>>;

    async fn find_by_payment_reference(&self, reference: &str) -> CheckoutResult<Option<Order>>;

    /// Locate by order id or payment reference and move it to `status`.
    ///
    /// Fails with `NotFoundError` when neither key matches and with
    /// `InvalidTransition` when the state machine forbids the move; in both
    /// cases nothing is written.
    async fn update_status(&self, id_or_reference: &str, status: OrderStatus) -> CheckoutResult<StatusChange>;

    async fn list(&self) -> CheckoutResult<Vec<Order>>;

    /// Two-key lookup: order id first, then payment reference.
    async fn find(&self, order_id: Option<&str>, reference: Option<&str>) -> CheckoutResult<Option<Order>> {
        if let Some(id) = order_id.filter(|id| !id.is_empty()) {
            if let Some(order) = self.find_by_id(id).await? {
                return Ok(Some(order));
            }
        }
        if let Some(reference) = reference.filter(|r| !r.is_empty()) {
            return self.find_by_payment_reference(reference).await;
        }
        Ok(None)
    }
}

pub(crate) fn matches_key(order: &Order, id_or_reference: &str) -> bool {
    order.id == id_or_reference || order.payment_reference.as_deref() == Some(id_or_reference)
}

/// Apply a status change to the matching order inside an already-loaded
/// collection. Shared by every store so they enforce the same rules.
pub fn apply_status(
    orders: &mut [Order],
    id_or_reference: &str,
    status: OrderStatus,
) -> CheckoutResult<StatusChange> {
    let order = orders
        .iter_mut()
        .find(|o| matches_key(o, id_or_reference))
        .ok_or_else(|| CheckoutError::NotFoundError(format!("order {}", id_or_reference)))?;

    let transition = order.update_status(status)?;
    Ok(StatusChange {
        order: order.clone(),
        transition,
    })
}

/// Process-local store used by tests and by the api crate's fakes.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn append(&self, order: &Order) -> CheckoutResult<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> CheckoutResult<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_payment_reference(&self, reference: &str) -> CheckoutResult<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn update_status(&self, id_or_reference: &str, status: OrderStatus) -> CheckoutResult<StatusChange> {
        let mut orders = self.orders.write().await;
        apply_status(&mut orders, id_or_reference, status)
    }

    async fn list(&self) -> CheckoutResult<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }
}

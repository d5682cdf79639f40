use checkout_core::CheckoutResult;
use serde::Serialize;

use crate::models::Order;
use crate::repository::OrderStore;

pub const NOT_FOUND: &str = "not_found";

/// Read-only projection served by the status endpoint:
/// `{status, order}` or `{status: "not_found"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

impl StatusView {
    pub fn found(order: Order) -> Self {
        Self {
            status: order.status.to_string(),
            order: Some(order),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: NOT_FOUND.to_string(),
            order: None,
        }
    }
}

pub async fn lookup_status(
    store: &dyn OrderStore,
    order_id: Option<&str>,
    payment_reference: Option<&str>,
) -> CheckoutResult<StatusView> {
    Ok(store
        .find(order_id, payment_reference)
        .await?
        .map(StatusView::found)
        .unwrap_or_else(StatusView::not_found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryOrderStore;
    use crate::testing::sample_order;

    #[tokio::test]
    async fn test_lookup_status() {
        let store = InMemoryOrderStore::new();
        let order = sample_order("pi_1");
        store.append(&order).await.unwrap();

        let view = lookup_status(&store, Some(&order.id), None).await.unwrap();
        assert_eq!(view, StatusView::found(order.clone()));

        let view = lookup_status(&store, None, Some("pi_1")).await.unwrap();
        assert_eq!(view.status, "pending");

        let view = lookup_status(&store, Some("ORD-1-1000"), Some("pi_2")).await.unwrap();
        assert_eq!(view, StatusView::not_found());
        assert_eq!(serde_json::to_value(&view).unwrap(), serde_json::json!({"status": "not_found"}));
    }
}

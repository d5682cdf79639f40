use checkout_catalog::Pricing;
use checkout_core::{CheckoutError, CheckoutResult};
use checkout_shared::Masked;
use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    /// Client-only order fabricated while the backend was unreachable.
    CompletedDemo,
}

/// Result of applying a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Target equals the current status (duplicate delivery).
    NoOp,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::CompletedDemo => "completed_demo",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Check a move against the checkout state machine.
    ///
    /// `pending` may go to `paid` or `failed`. Re-entering `paid` or `failed`
    /// is a no-op. Nothing leaves `paid`, `failed` or `completed_demo`.
    pub fn transition(&self, next: OrderStatus) -> CheckoutResult<Transition> {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Paid | OrderStatus::Failed) => Ok(Transition::Applied),
            (OrderStatus::Paid, OrderStatus::Paid) | (OrderStatus::Failed, OrderStatus::Failed) => {
                Ok(Transition::NoOp)
            }
            (from, to) => Err(CheckoutError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping and contact snapshot taken at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub full_name: String,
    pub address: Masked<String>,
    pub city: String,
    pub country: String,
    pub email: Masked<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub quantity: u32,
    pub is_preorder: bool,
    pub pricing: Pricing,
    pub currency: String,
    pub payment_reference: Option<String>,
    pub status: OrderStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// `ORD-<epoch millis>-<4 digit suffix>`
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("ORD-{}-{}", now.timestamp_millis(), suffix)
}

impl Order {
    pub fn new(
        customer: Customer,
        quantity: u32,
        is_preorder: bool,
        pricing: Pricing,
        currency: &str,
    ) -> Self {
        // Millisecond precision, same as the persisted form
        let now = Utc::now().trunc_subsecs(3);
        Self {
            id: generate_order_id(now),
            customer,
            quantity,
            is_preorder,
            pricing,
            currency: currency.to_string(),
            payment_reference: None,
            status: OrderStatus::Pending,
            created_at: now,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.status == OrderStatus::CompletedDemo
    }

    /// Apply a status change, enforcing the state machine.
    pub fn update_status(&mut self, next: OrderStatus) -> CheckoutResult<Transition> {
        let transition = self.status.transition(next)?;
        self.status = next;
        Ok(transition)
    }

    /// Adopt the server-issued identity of this order.
    ///
    /// A client-held copy carries a provisional id; the id and payment
    /// reference returned by checkout creation replace it. Pricing, customer
    /// and status are left alone.
    pub fn merge_authoritative(&mut self, server: &Order) {
        self.id = server.id.clone();
        if server.payment_reference.is_some() {
            self.payment_reference = server.payment_reference.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_order;

    #[test]
    fn test_order_id_format() {
        let now = Utc::now();
        let id = generate_order_id(now);
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].parse::<u16>().is_ok());
    }

    #[test]
    fn test_order_lifecycle() {
        let mut order = sample_order("pi_1");
        assert_eq!(order.status, OrderStatus::Pending);

        assert_eq!(order.update_status(OrderStatus::Paid).unwrap(), Transition::Applied);
        assert_eq!(order.update_status(OrderStatus::Paid).unwrap(), Transition::NoOp);
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn test_invalid_transitions() {
        use OrderStatus::*;
        assert!(Paid.transition(Failed).is_err());
        assert!(Paid.transition(Pending).is_err());
        assert!(Failed.transition(Paid).is_err());
        assert!(CompletedDemo.transition(Paid).is_err());
        assert!(Pending.transition(CompletedDemo).is_err());
        assert!(Pending.transition(Pending).is_err());

        let mut order = sample_order("pi_1");
        order.update_status(Failed).unwrap();
        assert!(order.update_status(Paid).is_err());
        assert_eq!(order.status, Failed);
    }

    #[test]
    fn test_merge_authoritative() {
        let mut local = sample_order("pi_local");
        local.payment_reference = None;
        let server = sample_order("pi_server");

        local.merge_authoritative(&server);
        assert_eq!(local.id, server.id);
        assert_eq!(local.payment_reference.as_deref(), Some("pi_server"));
    }

    #[test]
    fn test_wire_format() {
        let order = sample_order("pi_1");
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["paymentReference"], "pi_1");
        assert_eq!(json["customer"]["fullName"], "Chan Tai Man");
        assert_eq!(json["customer"]["email"], "taiman@example.com");
        assert_eq!(json["createdAt"], order.created_at.timestamp_millis());
        assert_eq!(json["pricing"]["totalCents"], order.pricing.total_cents);

        let demo: OrderStatus = serde_json::from_str("\"completed_demo\"").unwrap();
        assert_eq!(demo, OrderStatus::CompletedDemo);
    }

    fn status() -> impl proptest::strategy::Strategy<Value = OrderStatus> {
        proptest::prop_oneof![
            proptest::strategy::Just(OrderStatus::Pending),
            proptest::strategy::Just(OrderStatus::Paid),
            proptest::strategy::Just(OrderStatus::Failed),
            proptest::strategy::Just(OrderStatus::CompletedDemo),
        ]
    }

    proptest::proptest! {
        #[test]
        fn prop_terminal_status_never_changes(from in status(), to in status()) {
            let mut order = sample_order("pi_prop");
            order.status = from;
            let result = order.update_status(to);
            if from.is_terminal() {
                proptest::prop_assert_eq!(order.status, from);
            }
            if result.is_err() {
                proptest::prop_assert_eq!(order.status, from);
            }
        }
    }
}

use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult};
use checkout_order::repository::apply_status;
use checkout_order::{Order, OrderStatus, OrderStore, StatusChange, Transition};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Orders kept as one pretty-printed JSON array, rewritten wholesale on every
/// mutation.
///
/// Concurrency: every read-modify-write inside this process is serialized by
/// an async mutex. Two processes pointed at the same file still race, and the
/// last writer wins, silently dropping the other's change. Run a single
/// instance per file, or move to a transactional store with per-order atomic
/// updates once order volume is more than trivial.
pub struct JsonFileOrderStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileOrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> CheckoutResult<Vec<Order>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence(&self.path, "read", e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Refuse to continue on an unreadable file: the next write would
        // replace whatever history it still holds.
        serde_json::from_str(&raw).map_err(|e| persistence(&self.path, "parse", e))
    }

    async fn write_all(&self, orders: &[Order]) -> CheckoutResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(parent, "create directory", e))?;
        }

        let body = serde_json::to_string_pretty(orders)
            .map_err(|e| persistence(&self.path, "serialize", e))?;

        // Write beside the target and rename so readers never see a torn file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| persistence(&tmp, "write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| persistence(&self.path, "replace", e))?;
        Ok(())
    }
}

fn persistence(path: &Path, action: &str, err: impl std::fmt::Display) -> CheckoutError {
    tracing::error!("Order store failed to {} {}: {}", action, path.display(), err);
    CheckoutError::PersistenceError(format!("failed to {} {}: {}", action, path.display(), err))
}

#[async_trait]
impl OrderStore for JsonFileOrderStore {
    async fn append(&self, order: &Order) -> CheckoutResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut orders = self.read_all().await?;
        orders.push(order.clone());
        self.write_all(&orders).await
    }

    async fn find_by_id(&self, id: &str) -> CheckoutResult<Option<Order>> {
        Ok(self.read_all().await?.into_iter().find(|o| o.id == id))
    }

    async fn find_by_payment_reference(&self, reference: &str) -> CheckoutResult<Option<Order>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|o| o.payment_reference.as_deref() == Some(reference)))
    }

    async fn update_status(&self, id_or_reference: &str, status: OrderStatus) -> CheckoutResult<StatusChange> {
        let _guard = self.write_lock.lock().await;
        let mut orders = self.read_all().await?;
        let change = apply_status(&mut orders, id_or_reference, status)?;
        if change.transition == Transition::Applied {
            self.write_all(&orders).await?;
        }
        Ok(change)
    }

    async fn list(&self) -> CheckoutResult<Vec<Order>> {
        self.read_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_catalog::PricingEngine;
    use checkout_order::Customer;
    use checkout_shared::Masked;
    use std::sync::Arc;

    fn order(n: u32) -> Order {
        let customer = Customer {
            full_name: format!("Customer {}", n),
            address: Masked::from("1 Nathan Road"),
            city: "Kowloon".to_string(),
            country: "Taiwan".to_string(),
            email: Masked::from(format!("c{}@example.com", n)),
        };
        let mut order = Order::new(customer, n, n % 2 == 0, PricingEngine::new().price(n, "Taiwan", n % 2 == 0), "hkd");
        order.id = format!("ORD-{}-{}", 1_760_000_000_000u64 + n as u64, 1000 + n);
        order.payment_reference = Some(format!("pi_{}", n));
        order
    }

    #[tokio::test]
    async fn test_round_trip_preserves_every_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server").join("orders.json");
        let store = JsonFileOrderStore::new(&path);

        let orders: Vec<Order> = (1..=7).map(order).collect();
        for o in &orders {
            store.append(o).await.unwrap();
        }

        let reopened = JsonFileOrderStore::new(&path);
        assert_eq!(reopened.list().await.unwrap(), orders);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_and_empty_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        let store = JsonFileOrderStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());

        std::fs::write(&path, "").unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileOrderStore::new(&path);

        let err = store.append(&order(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PersistenceError(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let store = JsonFileOrderStore::new(blocker.join("orders.json"));

        let err = store.append(&order(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PersistenceError(_)));
    }

    #[tokio::test]
    async fn test_update_status_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        let store = JsonFileOrderStore::new(&path);
        store.append(&order(1)).await.unwrap();
        store.append(&order(2)).await.unwrap();

        let change = store.update_status("pi_2", OrderStatus::Paid).await.unwrap();
        assert_eq!(change.transition, Transition::Applied);

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["status"], "pending");
        assert_eq!(raw[1]["status"], "paid");

        let err = store.update_status("pi_9", OrderStatus::Paid).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotFoundError(_)));
    }

    #[tokio::test]
    async fn test_concurrent_appends_in_one_process_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileOrderStore::new(dir.path().join("orders.json")));

        let handles: Vec<_> = (1..=20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.append(&order(n)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 20);
    }
}

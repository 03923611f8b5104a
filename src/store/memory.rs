use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderId};
use super::{OrderQuery, OrderStore, ScanResult, StoreError, SwapOutcome};

/// In-process order store.
///
/// Every operation takes the map lock for its whole duration, so the version
/// check and the write of a compare-and-swap happen atomically. Ids are UUID
/// v7, so the BTreeMap iterates in creation order.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;

        let mut id = Uuid::now_v7();
        while orders.contains_key(&id) {
            id = Uuid::now_v7();
        }

        let order = order.into_order(id);
        orders.insert(id, order.clone());

        tracing::debug!(order_id = %id, "Inserted order into memory store");
        Ok(order)
    }

    async fn compare_and_swap(&self, order: &Order) -> Result<SwapOutcome, StoreError> {
        let mut orders = self.orders.write().await;

        let Some(current) = orders.get_mut(&order.id) else {
            return Ok(SwapOutcome::VersionMismatch);
        };
        if current.version != order.version {
            tracing::debug!(
                order_id = %order.id,
                expected_version = order.version,
                current_version = current.version,
                "Version mismatch in memory store"
            );
            return Ok(SwapOutcome::VersionMismatch);
        }

        let mut next = order.clone();
        next.version += 1;
        *current = next.clone();

        Ok(SwapOutcome::Swapped(next))
    }

    async fn scan(&self, query: &OrderQuery) -> Result<ScanResult, StoreError> {
        let orders = self.orders.read().await;

        let matching: Vec<&Order> = orders.values().filter(|order| query.matches(order)).collect();
        let total_count = matching.len() as u64;

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(ScanResult {
            orders: page,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderPredicate;
    use chrono::Utc;

    fn new_order(first_name: &str, phone: &str) -> NewOrder {
        NewOrder {
            customer_first_name: first_name.to_string(),
            customer_last_name: "Doe".to_string(),
            customer_phone: phone.to_string(),
            delivery_address: "Rambla 12".to_string(),
            pilotes: 10,
            total_price: 1330,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_fetch() {
        let store = InMemoryOrderStore::new();
        let inserted = store.insert(new_order("Jane", "5550000001")).await.unwrap();

        let fetched = store.fetch(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.version, 1);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.fetch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compare_and_swap_only_once_per_version() {
        let store = InMemoryOrderStore::new();
        let original = store.insert(new_order("Jane", "5550000001")).await.unwrap();

        let mut first = original.clone();
        first.customer_first_name = "First".to_string();
        let mut second = original.clone();
        second.customer_first_name = "Second".to_string();

        let outcome = store.compare_and_swap(&first).await.unwrap();
        match outcome {
            SwapOutcome::Swapped(persisted) => assert_eq!(persisted.version, 2),
            other => panic!("expected swap, got {:?}", other),
        }
        assert_eq!(
            store.compare_and_swap(&second).await.unwrap(),
            SwapOutcome::VersionMismatch
        );

        let stored = store.fetch(original.id).await.unwrap().unwrap();
        assert_eq!(stored.customer_first_name, "First");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_scan_orders_by_id_and_counts_all_matches() {
        let store = InMemoryOrderStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let phone = if i % 2 == 0 { "5550000001" } else { "5550000002" };
            ids.push(store.insert(new_order(&format!("Name{}", i), phone)).await.unwrap().id);
        }

        let result = store
            .scan(&OrderQuery {
                predicates: vec![OrderPredicate::PhoneEquals("5550000001".to_string())],
                offset: 1,
                limit: 1,
            })
            .await
            .unwrap();

        assert_eq!(result.total_count, 3);
        assert_eq!(result.orders.len(), 1);
        assert_eq!(result.orders[0].id, ids[2]);
    }
}

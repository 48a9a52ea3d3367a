//! Queue persistence boundary.
//!
//! The manager writes through a `QueueStore` after every committed mutation
//! and reloads from it on startup. Writes are fire-and-forget from the
//! caller's perspective: failures are logged, never propagated, and the
//! in-memory queue remains the source of truth for ordering decisions.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::queue::types::{QueueGrouping, QueueStatus, QueueType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("grouping {0} not found")]
    GroupingNotFound(u64),
    #[error("entity {vessel} not found in grouping {grouping_id}")]
    EntityNotFound { grouping_id: u64, vessel: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Load/save queue state. Implementations must support reading all groupings
/// of a queue in current sort order and updating a batch of sort orders
/// atomically with respect to concurrent readers.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert or replace one grouping (entities included).
    async fn save_grouping(&self, grouping: &QueueGrouping) -> Result<(), StoreError>;

    /// Apply a batch of (grouping id, sort order) updates as one unit.
    async fn update_sort_orders(
        &self,
        queue_type: QueueType,
        orders: &[(u64, i64)],
    ) -> Result<(), StoreError>;

    /// Update the status of one entity within a grouping.
    async fn update_entity_status(
        &self,
        grouping_id: u64,
        vessel: &str,
        status: QueueStatus,
    ) -> Result<(), StoreError>;

    /// All groupings for a queue, sorted by sort order.
    async fn load_groupings(&self, queue_type: QueueType) -> Result<Vec<QueueGrouping>, StoreError>;
}

/// In-memory reference store. Backs tests and single-process deployments
/// that do not need durability.
#[derive(Default)]
pub struct MemoryStore {
    groupings: RwLock<FxHashMap<u64, QueueGrouping>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn save_grouping(&self, grouping: &QueueGrouping) -> Result<(), StoreError> {
        self.groupings
            .write()
            .insert(grouping.id, grouping.clone());
        Ok(())
    }

    async fn update_sort_orders(
        &self,
        _queue_type: QueueType,
        orders: &[(u64, i64)],
    ) -> Result<(), StoreError> {
        let mut groupings = self.groupings.write();
        // All ids are checked before the first write so a failed batch
        // leaves every row untouched.
        for &(id, _) in orders {
            if !groupings.contains_key(&id) {
                return Err(StoreError::GroupingNotFound(id));
            }
        }
        for &(id, sort_order) in orders {
            if let Some(grouping) = groupings.get_mut(&id) {
                grouping.sort_order = sort_order;
            }
        }
        Ok(())
    }

    async fn update_entity_status(
        &self,
        grouping_id: u64,
        vessel: &str,
        status: QueueStatus,
    ) -> Result<(), StoreError> {
        let mut groupings = self.groupings.write();
        let grouping = groupings
            .get_mut(&grouping_id)
            .ok_or(StoreError::GroupingNotFound(grouping_id))?;
        let entity = grouping
            .entities
            .iter_mut()
            .find(|e| e.vessel.as_ref() == vessel)
            .ok_or_else(|| StoreError::EntityNotFound {
                grouping_id,
                vessel: vessel.to_string(),
            })?;
        entity.status = status;
        Ok(())
    }

    async fn load_groupings(&self, queue_type: QueueType) -> Result<Vec<QueueGrouping>, StoreError> {
        let mut groupings: Vec<QueueGrouping> = self
            .groupings
            .read()
            .values()
            .filter(|g| g.queue_type == queue_type)
            .cloned()
            .collect();
        groupings.sort_by_key(|g| g.sort_order);
        Ok(groupings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::types::intern;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let grouping = QueueGrouping::new(7, QueueType::Pico, vec![intern("V-1")]);
        store.save_grouping(&grouping).await.unwrap();

        store
            .update_sort_orders(QueueType::Pico, &[(7, 3)])
            .await
            .unwrap();
        store
            .update_entity_status(7, "V-1", QueueStatus::Excluded)
            .await
            .unwrap();

        let loaded = store.load_groupings(QueueType::Pico).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].sort_order, 3);
        assert_eq!(loaded[0].entities[0].status, QueueStatus::Excluded);

        assert!(store
            .load_groupings(QueueType::DnaQuant)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_unknown_grouping() {
        let store = MemoryStore::new();
        let err = store
            .update_sort_orders(QueueType::Pico, &[(99, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::GroupingNotFound(99)));
    }

    #[tokio::test]
    async fn test_sort_order_batch_fails_without_partial_writes() {
        let store = MemoryStore::new();
        let grouping = QueueGrouping::new(1, QueueType::Pico, vec![intern("V-1")]);
        store.save_grouping(&grouping).await.unwrap();

        let err = store
            .update_sort_orders(QueueType::Pico, &[(1, 9), (2, 5)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::GroupingNotFound(2)));

        // The known row keeps its previous order; the batch applied nothing.
        let loaded = store.load_groupings(QueueType::Pico).await.unwrap();
        assert_eq!(loaded[0].sort_order, 1);
    }
}

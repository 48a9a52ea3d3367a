//! Core QueueManager struct and constructors.
//!
//! The actual operations are implemented in separate modules:
//! - enqueue.rs - classification and ordered insertion
//! - dequeue.rs - validated removal and exclusion
//! - reorder.rs - explicit position changes
//!
//! Each queue is a single mutable resource behind its own RwLock; placement
//! and renumbering always run with the write lock held, and no lock is ever
//! held across an await.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{error, info, warn};

use super::types::{
    set_grouping_id_counter, GenericQueue, QueueGrouping, QueueInfo, QueueMetrics, QueueStatus,
    QueueType,
};
use crate::collab::{AuditSink, CharacteristicLookup, VesselDataSource};
use crate::store::QueueStore;

const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

pub struct QueueManager {
    /// One queue per type, created lazily on first use.
    pub(crate) queues: DashMap<QueueType, Arc<RwLock<GenericQueue>>>,
    pub(crate) vessels: Arc<dyn VesselDataSource>,
    pub(crate) characteristics: Option<Arc<dyn CharacteristicLookup>>,
    pub(crate) audit: Option<Arc<dyn AuditSink>>,
    pub(crate) store: Option<Arc<dyn QueueStore>>,
    pub(crate) metrics: QueueMetrics,
    /// Deadline for the batched characteristic lookup during classification.
    pub(crate) lookup_timeout: Duration,
}

impl QueueManager {
    /// Create a manager with only the sample/vessel data source. No external
    /// characteristic service, no audit sink, no persistence.
    pub fn new(vessels: Arc<dyn VesselDataSource>) -> Arc<Self> {
        Self::create(vessels, None, None, None)
    }

    /// Create a manager with the full collaborator set.
    pub fn with_collaborators(
        vessels: Arc<dyn VesselDataSource>,
        characteristics: Option<Arc<dyn CharacteristicLookup>>,
        audit: Option<Arc<dyn AuditSink>>,
        store: Option<Arc<dyn QueueStore>>,
    ) -> Arc<Self> {
        Self::create(vessels, characteristics, audit, store)
    }

    /// Create a manager backed by a store and recover existing queue state
    /// from it.
    pub async fn with_store(
        vessels: Arc<dyn VesselDataSource>,
        store: Arc<dyn QueueStore>,
    ) -> Arc<Self> {
        let manager = Self::create(vessels, None, None, Some(store));
        manager.recover_from_store().await;
        manager
    }

    /// Internal constructor.
    fn create(
        vessels: Arc<dyn VesselDataSource>,
        characteristics: Option<Arc<dyn CharacteristicLookup>>,
        audit: Option<Arc<dyn AuditSink>>,
        store: Option<Arc<dyn QueueStore>>,
    ) -> Arc<Self> {
        let lookup_timeout_ms = std::env::var("LOOKUP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS);

        Arc::new(Self {
            queues: DashMap::new(),
            vessels,
            characteristics,
            audit,
            store,
            metrics: QueueMetrics::new(),
            lookup_timeout: Duration::from_millis(lookup_timeout_ms),
        })
    }

    /// Handle for one queue, creating it on first use. One queue exists per
    /// type.
    pub(crate) fn queue(&self, queue_type: QueueType) -> Arc<RwLock<GenericQueue>> {
        self.queues
            .entry(queue_type)
            .or_insert_with(|| Arc::new(RwLock::new(GenericQueue::new(queue_type))))
            .clone()
    }

    /// Reload all queues from the store and re-sync the grouping id counter
    /// past the maximum recovered id.
    async fn recover_from_store(&self) {
        let Some(ref store) = self.store else {
            return;
        };

        let mut max_id = 0u64;
        let mut grouping_count = 0usize;

        for queue_type in QueueType::ALL {
            match store.load_groupings(queue_type).await {
                Ok(groupings) => {
                    if groupings.is_empty() {
                        continue;
                    }
                    grouping_count += groupings.len();
                    let handle = self.queue(queue_type);
                    let mut queue = handle.write();
                    for grouping in groupings {
                        max_id = max_id.max(grouping.id);
                        for entity in &grouping.entities {
                            queue.seen_vessels.insert(Arc::clone(&entity.vessel));
                        }
                        queue.groupings.push(grouping);
                    }
                    queue.sort();
                }
                Err(e) => {
                    error!(queue = queue_type.label(), error = %e, "Failed to recover queue");
                }
            }
        }

        if max_id > 0 {
            set_grouping_id_counter(max_id + 1);
        }
        if grouping_count > 0 {
            info!(
                count = grouping_count,
                next_id = max_id + 1,
                "Recovered queue groupings from store"
            );
        }
    }

    // ============== Read Accessors ==============

    /// All groupings of a queue in current sort order, including drained and
    /// fully excluded ones (audit visibility).
    pub fn ordered_groupings(&self, queue_type: QueueType) -> Vec<QueueGrouping> {
        self.queue(queue_type).read().groupings.clone()
    }

    pub fn grouping(&self, queue_type: QueueType, grouping_id: u64) -> Option<QueueGrouping> {
        self.queue(queue_type).read().grouping(grouping_id).cloned()
    }

    /// Number of groupings still holding at least one active entity.
    pub fn active_count(&self, queue_type: QueueType) -> usize {
        self.queue(queue_type)
            .read()
            .groupings
            .iter()
            .filter(|g| g.is_active())
            .count()
    }

    /// Total groupings ever inserted and still retained, active or not.
    pub fn total_count(&self, queue_type: QueueType) -> usize {
        self.queue(queue_type).read().groupings.len()
    }

    /// True when the barcode is actively queued (not completed or excluded).
    pub fn contains_vessel(&self, queue_type: QueueType, barcode: &str) -> bool {
        self.queue(queue_type)
            .read()
            .groupings
            .iter()
            .any(|g| g.active_vessels().any(|v| v.as_ref() == barcode))
    }

    /// Per-queue counts for every queue type that has been touched.
    pub fn queue_stats(&self) -> Vec<QueueInfo> {
        let mut stats = Vec::new();
        for entry in self.queues.iter() {
            let queue = entry.value().read();
            stats.push(QueueInfo {
                queue_type: queue.queue_type,
                name: queue.queue_type.label(),
                active_groupings: queue.groupings.iter().filter(|g| g.is_active()).count(),
                total_groupings: queue.groupings.len(),
                active_vessels: queue
                    .groupings
                    .iter()
                    .map(|g| g.active_vessels().count())
                    .sum(),
            });
        }
        stats
    }

    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }

    // ============== Persistence (fire-and-forget) ==============

    /// Persist a grouping together with the sort-order batch it was committed
    /// with, in that order within a single task. The grouping's row must
    /// exist before the batch references its id.
    pub(crate) fn persist_grouping_with_orders(
        &self,
        queue_type: QueueType,
        grouping: &QueueGrouping,
        orders: Vec<(u64, i64)>,
    ) {
        if let Some(ref store) = self.store {
            let store = Arc::clone(store);
            let grouping = grouping.clone();
            tokio::spawn(async move {
                if let Err(e) = store.save_grouping(&grouping).await {
                    error!(grouping_id = grouping.id, error = %e, "Failed to persist grouping");
                    return;
                }
                if orders.is_empty() {
                    return;
                }
                if let Err(e) = store.update_sort_orders(queue_type, &orders).await {
                    error!(queue = queue_type.label(), error = %e, "Failed to persist sort orders");
                }
            });
        }
    }

    /// Persist one entity status change.
    pub(crate) fn persist_entity_status(
        &self,
        grouping_id: u64,
        vessel: Arc<str>,
        status: QueueStatus,
    ) {
        if let Some(ref store) = self.store {
            let store = Arc::clone(store);
            tokio::spawn(async move {
                if let Err(e) = store
                    .update_entity_status(grouping_id, vessel.as_ref(), status)
                    .await
                {
                    error!(grouping_id, vessel = %vessel, error = %e, "Failed to persist entity status");
                }
            });
        }
    }

    /// Post an audit comment against a ticket. Fire-and-forget: the enqueue
    /// already succeeded, a failed comment is only logged.
    pub(crate) fn audit_comment(&self, ticket: Option<String>, text: String) {
        let Some(audit) = self.audit.as_ref() else {
            return;
        };
        let Some(ticket) = ticket else {
            return;
        };
        let audit = Arc::clone(audit);
        tokio::spawn(async move {
            if let Err(e) = audit.post_comment(&ticket, &text).await {
                warn!(ticket = %ticket, error = %e, "Failed to post audit comment");
            }
        });
    }
}

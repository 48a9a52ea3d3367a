//! Enqueue operations.
//!
//! Classification runs before the queue lock is taken (it may await the
//! external characteristic service); placement, renumbering and the seen-set
//! update then commit atomically under the write lock.

use std::sync::Arc;

use tracing::info;

use super::manager::QueueManager;
use super::ordering::place_new_grouping;
use super::types::{intern, next_grouping_id, QueueGrouping, QueueOrigin, QueueType};
use crate::classify::{classifier_for, determine_priority};
use crate::messages::MessageCollection;

impl QueueManager {
    /// Enqueue a set of vessels as one grouping. Returns the new grouping's
    /// id, or `None` when nothing was enqueued (reported in `messages`).
    ///
    /// The audit comment against `ticket` is fire-and-forget: enqueue
    /// succeeds whenever the insertion itself succeeded.
    pub async fn enqueue(
        &self,
        queue_type: QueueType,
        barcodes: &[String],
        origin: QueueOrigin,
        ticket: Option<String>,
        messages: &mut MessageCollection,
    ) -> Option<u64> {
        if barcodes.is_empty() {
            messages.add_error(format!(
                "Nothing to add to the {} queue: no vessels given",
                queue_type.label()
            ));
            return None;
        }

        let vessels: Vec<Arc<str>> = barcodes.iter().map(|b| intern(b)).collect();

        // Id before placement: the default-ordering fallback depends on it.
        let grouping_id = next_grouping_id();
        let handle = self.queue(queue_type);

        // Repeat work is never re-prioritized: a grouping made entirely of
        // previously seen vessels goes in at default priority.
        let all_previously_seen = {
            let queue = handle.read();
            vessels.iter().all(|v| queue.seen_vessels.contains(v))
        };

        let classifier = classifier_for(queue_type);
        let priority = determine_priority(
            classifier,
            &vessels,
            all_previously_seen,
            self.vessels.as_ref(),
            self.characteristics.as_deref(),
            self.lookup_timeout,
        )
        .await;

        let mut grouping = QueueGrouping::new(grouping_id, queue_type, vessels.clone());
        grouping.priority = priority;
        grouping.description = ticket.clone();

        let orders = {
            let mut queue = handle.write();
            let orders =
                place_new_grouping(grouping_id, priority, &queue.groupings, classifier.priority_order());
            grouping.sort_order = orders[&grouping_id];
            queue.commit_orders(&orders);
            for vessel in &vessels {
                queue.seen_vessels.insert(Arc::clone(vessel));
            }
            queue.groupings.push(grouping.clone());
            queue.sort();
            orders
        };

        self.persist_grouping_with_orders(queue_type, &grouping, orders.into_iter().collect());
        self.metrics.record_enqueue(vessels.len() as u64);

        info!(
            queue = queue_type.label(),
            grouping_id,
            vessels = vessels.len(),
            priority = ?priority,
            "Enqueued grouping"
        );
        self.audit_comment(
            ticket,
            format!(
                "Added {} vessel(s) to the {} queue (origin: {})",
                vessels.len(),
                queue_type.label(),
                origin.label()
            ),
        );
        messages.add_info(format!(
            "Added {} vessel(s) to the {} queue",
            vessels.len(),
            queue_type.label()
        ));
        Some(grouping_id)
    }

    /// Re-run classification for one grouping and re-place it in the queue.
    /// Priorities are otherwise fixed at insertion time; this is the explicit
    /// recompute path. The previously-seen short-circuit does not apply here,
    /// since the grouping's own vessels are in the seen set by now.
    pub async fn recompute_priority(
        &self,
        queue_type: QueueType,
        grouping_id: u64,
        messages: &mut MessageCollection,
    ) -> bool {
        let handle = self.queue(queue_type);

        let vessels: Vec<Arc<str>> = {
            let queue = handle.read();
            let Some(grouping) = queue.grouping(grouping_id) else {
                messages.add_error(format!(
                    "Grouping {} is not in the {} queue",
                    grouping_id,
                    queue_type.label()
                ));
                return false;
            };
            if grouping.skip_priority_check {
                messages.add_warning(format!(
                    "Grouping {} is pinned and keeps its position",
                    grouping_id
                ));
                return false;
            }
            grouping.entities.iter().map(|e| Arc::clone(&e.vessel)).collect()
        };

        let classifier = classifier_for(queue_type);
        let priority = determine_priority(
            classifier,
            &vessels,
            false,
            self.vessels.as_ref(),
            self.characteristics.as_deref(),
            self.lookup_timeout,
        )
        .await;

        let (orders, updated) = {
            let mut queue = handle.write();
            // The grouping may have been removed while classification ran.
            let Some(index) = queue.groupings.iter().position(|g| g.id == grouping_id) else {
                messages.add_error(format!(
                    "Grouping {} is not in the {} queue",
                    grouping_id,
                    queue_type.label()
                ));
                return false;
            };
            let mut grouping = queue.groupings.remove(index);
            let orders = place_new_grouping(
                grouping_id,
                priority,
                &queue.groupings,
                classifier.priority_order(),
            );
            grouping.priority = priority;
            grouping.sort_order = orders[&grouping_id];
            queue.commit_orders(&orders);
            queue.groupings.push(grouping.clone());
            queue.sort();
            (orders, grouping)
        };

        self.persist_grouping_with_orders(queue_type, &updated, orders.into_iter().collect());
        info!(
            queue = queue_type.label(),
            grouping_id,
            priority = ?priority,
            "Recomputed grouping priority"
        );
        messages.add_info(format!(
            "Grouping {} reclassified as {:?}",
            grouping_id, priority
        ));
        true
    }
}

//! Manual reorder operations.
//!
//! Explicit position changes: move a grouping to a 1-based position, or to
//! the very top/bottom. A manually moved grouping becomes `Altered` and
//! pinned: later insertions pass over it instead of competing it back into a
//! priority bucket. An unknown grouping id is reported as an error and
//! leaves the queue untouched - there is no partial renumbering.

use tracing::info;

use super::manager::QueueManager;
use super::ordering::renumber_with_move;
use super::types::{QueuePriority, QueueType};
use crate::messages::MessageCollection;

impl QueueManager {
    /// Move a grouping to an explicit 1-based position, renumbering the
    /// intervening groupings. Out-of-range positions are clamped to the ends
    /// of the queue. Returns false (with an error collected) when the
    /// grouping is unknown.
    pub fn reorder(
        &self,
        queue_type: QueueType,
        grouping_id: u64,
        position: usize,
        messages: &mut MessageCollection,
    ) -> bool {
        let handle = self.queue(queue_type);

        let (orders, moved) = {
            let mut queue = handle.write();
            let Some(orders) = renumber_with_move(&queue.groupings, grouping_id, position) else {
                messages.add_error(format!(
                    "Grouping {} is not in the {} queue",
                    grouping_id,
                    queue_type.label()
                ));
                return false;
            };
            queue.commit_orders(&orders);
            let moved = queue.grouping_mut(grouping_id).map(|grouping| {
                grouping.priority = QueuePriority::Altered;
                grouping.skip_priority_check = true;
                grouping.clone()
            });
            (orders, moved)
        };

        if let Some(moved) = &moved {
            self.persist_grouping_with_orders(queue_type, moved, orders.into_iter().collect());
        }
        info!(
            queue = queue_type.label(),
            grouping_id, position, "Reordered grouping"
        );
        true
    }

    /// Assign a sort order below the current minimum, making the grouping
    /// the next to be worked.
    pub fn move_to_top(
        &self,
        queue_type: QueueType,
        grouping_id: u64,
        messages: &mut MessageCollection,
    ) -> bool {
        self.move_to_edge(queue_type, grouping_id, true, messages)
    }

    /// Assign a sort order above the current maximum.
    pub fn move_to_bottom(
        &self,
        queue_type: QueueType,
        grouping_id: u64,
        messages: &mut MessageCollection,
    ) -> bool {
        self.move_to_edge(queue_type, grouping_id, false, messages)
    }

    fn move_to_edge(
        &self,
        queue_type: QueueType,
        grouping_id: u64,
        top: bool,
        messages: &mut MessageCollection,
    ) -> bool {
        let handle = self.queue(queue_type);

        let (sort_order, moved) = {
            let mut queue = handle.write();
            if queue.grouping(grouping_id).is_none() {
                messages.add_error(format!(
                    "Grouping {} is not in the {} queue",
                    grouping_id,
                    queue_type.label()
                ));
                return false;
            }
            // The grouping itself is part of min/max; stepping one past the
            // edge is still correct when it is already there.
            let sort_order = if top {
                queue.groupings.iter().map(|g| g.sort_order).min().unwrap_or(0) - 1
            } else {
                queue.groupings.iter().map(|g| g.sort_order).max().unwrap_or(0) + 1
            };
            let moved = queue.grouping_mut(grouping_id).map(|grouping| {
                grouping.sort_order = sort_order;
                grouping.priority = QueuePriority::Altered;
                grouping.skip_priority_check = true;
                grouping.clone()
            });
            queue.sort();
            (sort_order, moved)
        };

        if let Some(moved) = &moved {
            self.persist_grouping_with_orders(queue_type, moved, vec![(grouping_id, sort_order)]);
        }
        info!(
            queue = queue_type.label(),
            grouping_id,
            to = if top { "top" } else { "bottom" },
            "Moved grouping"
        );
        true
    }
}

//! Grouping placement and renumbering.
//!
//! Pure functions: each one reads a snapshot of a queue's current order and
//! produces a complete replacement assignment of sort orders. The caller
//! commits the assignment under the queue's write lock, so a half-applied
//! renumbering is never observable.

use rustc_hash::FxHashMap;

use super::types::{QueueGrouping, QueuePriority};

/// A computed replacement ordering: grouping id -> new sort order. Covers
/// every grouping the walk touched, including unchanged values.
pub type OrderAssignment = FxHashMap<u64, i64>;

/// Position of a priority within a queue type's priority order (highest
/// significance first). `None` means the priority is not ranked for this
/// queue and sorts past the end of the order - the default bucket.
#[inline]
pub fn bucket_index(priority: QueuePriority, order: &[QueuePriority]) -> Option<usize> {
    order.iter().position(|&p| p == priority)
}

/// True when `existing` occupies a strictly lower-priority bucket than `new`.
/// The default bucket (`None`) never outranks anything and is outranked by
/// every ranked bucket.
#[inline]
fn outranked_by(new: Option<usize>, existing: Option<usize>) -> bool {
    match (new, existing) {
        (Some(_), None) => true,
        (Some(n), Some(e)) => e > n,
        (None, _) => false,
    }
}

/// Compute sort orders for a queue after inserting a newly classified
/// grouping.
///
/// A single linear walk over the snapshot, counter starting at 1:
/// - pinned groupings (`skip_priority_check`) are assigned the next counter
///   value and passed over without a bucket comparison;
/// - the first existing grouping in a strictly lower-priority bucket marks
///   the insertion point; the new grouping takes the current counter value
///   and everything from there on is pushed back one slot (exactly once);
/// - if no such grouping exists, the new grouping keeps the default
///   ordering: sort order equal to its own id. Ids are monotonic and
///   assigned before placement, so concurrent default-priority insertions
///   never collide.
pub fn place_new_grouping(
    new_id: u64,
    new_priority: QueuePriority,
    snapshot: &[QueueGrouping],
    order: &[QueuePriority],
) -> OrderAssignment {
    debug_assert!(
        !order.contains(&QueuePriority::Standard),
        "Standard is the default bucket and must not be ranked"
    );

    let new_rank = bucket_index(new_priority, order);
    let mut orders = OrderAssignment::default();
    let mut counter: i64 = 1;
    let mut inserted = false;

    for existing in snapshot {
        if !existing.skip_priority_check {
            let rank = bucket_index(existing.priority, order);
            if !inserted && outranked_by(new_rank, rank) {
                orders.insert(new_id, counter);
                counter += 1;
                inserted = true;
            }
        }
        orders.insert(existing.id, counter);
        counter += 1;
    }

    if !inserted {
        orders.insert(new_id, new_id as i64);
    }
    orders
}

/// Compute sort orders after moving one grouping to an explicit 1-based
/// position. The target position is clamped into `1..=len`; all other
/// groupings keep their relative order. Returns `None` when the grouping is
/// not in the snapshot, leaving the caller's state untouched.
pub fn renumber_with_move(
    snapshot: &[QueueGrouping],
    grouping_id: u64,
    position: usize,
) -> Option<OrderAssignment> {
    let from = snapshot.iter().position(|g| g.id == grouping_id)?;

    let mut ids: Vec<u64> = snapshot.iter().map(|g| g.id).collect();
    let moved = ids.remove(from);
    let to = position.clamp(1, snapshot.len()) - 1;
    ids.insert(to, moved);

    Some(
        ids.iter()
            .enumerate()
            .map(|(i, &id)| (id, i as i64 + 1))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::types::{QueueGrouping, QueuePriority, QueueType};

    const ORDER: &[QueuePriority] = &[QueuePriority::Clia, QueuePriority::ExomeExpress];

    fn grouping(id: u64, priority: QueuePriority, sort_order: i64) -> QueueGrouping {
        let mut g = QueueGrouping::new(id, QueueType::Pico, vec![]);
        g.priority = priority;
        g.sort_order = sort_order;
        g
    }

    #[test]
    fn test_bucket_index() {
        assert_eq!(bucket_index(QueuePriority::Clia, ORDER), Some(0));
        assert_eq!(bucket_index(QueuePriority::ExomeExpress, ORDER), Some(1));
        assert_eq!(bucket_index(QueuePriority::Standard, ORDER), None);
        assert_eq!(bucket_index(QueuePriority::Clia, &[]), None);
    }

    #[test]
    fn test_standard_into_empty_uses_id_fallback() {
        let orders = place_new_grouping(42, QueuePriority::Standard, &[], ORDER);
        assert_eq!(orders.get(&42), Some(&42));
    }

    #[test]
    fn test_standard_never_jumps_standard() {
        let snapshot = vec![
            grouping(1, QueuePriority::Standard, 1),
            grouping(2, QueuePriority::Standard, 2),
        ];
        let orders = place_new_grouping(3, QueuePriority::Standard, &snapshot, ORDER);
        assert_eq!(orders.get(&3), Some(&3));
        assert_eq!(orders.get(&1), Some(&1));
        assert_eq!(orders.get(&2), Some(&2));
    }

    #[test]
    fn test_high_priority_inserts_before_first_lower_bucket() {
        let snapshot = vec![
            grouping(1, QueuePriority::Clia, 1),
            grouping(2, QueuePriority::Standard, 2),
            grouping(3, QueuePriority::Standard, 3),
        ];
        let orders = place_new_grouping(4, QueuePriority::ExomeExpress, &snapshot, ORDER);
        assert_eq!(orders.get(&1), Some(&1));
        assert_eq!(orders.get(&4), Some(&2));
        assert_eq!(orders.get(&2), Some(&3));
        assert_eq!(orders.get(&3), Some(&4));
    }

    #[test]
    fn test_insertion_happens_exactly_once() {
        // Two lower-priority groupings after the insertion point must not
        // trigger a second insertion.
        let snapshot = vec![
            grouping(1, QueuePriority::ExomeExpress, 1),
            grouping(2, QueuePriority::Standard, 2),
            grouping(3, QueuePriority::Standard, 3),
        ];
        let orders = place_new_grouping(4, QueuePriority::Clia, &snapshot, ORDER);
        assert_eq!(orders.get(&4), Some(&1));
        assert_eq!(orders.get(&1), Some(&2));
        assert_eq!(orders.get(&2), Some(&3));
        assert_eq!(orders.get(&3), Some(&4));
        assert_eq!(orders.len(), 4);
    }

    #[test]
    fn test_pinned_grouping_never_competes() {
        // Pinned standard grouping at the head keeps its slot even when a
        // CLIA grouping arrives.
        let mut pinned = grouping(1, QueuePriority::Standard, 1);
        pinned.skip_priority_check = true;
        let snapshot = vec![pinned, grouping(2, QueuePriority::Standard, 2)];

        let orders = place_new_grouping(3, QueuePriority::Clia, &snapshot, ORDER);
        assert_eq!(orders.get(&1), Some(&1));
        assert_eq!(orders.get(&3), Some(&2));
        assert_eq!(orders.get(&2), Some(&3));
    }

    #[test]
    fn test_empty_priority_order_always_falls_back() {
        let snapshot = vec![grouping(1, QueuePriority::Standard, 1)];
        let orders = place_new_grouping(9, QueuePriority::Clia, &snapshot, &[]);
        assert_eq!(orders.get(&9), Some(&9));
    }

    #[test]
    fn test_renumber_with_move_to_front() {
        let snapshot = vec![
            grouping(1, QueuePriority::Standard, 1),
            grouping(2, QueuePriority::Standard, 2),
            grouping(3, QueuePriority::Standard, 3),
        ];
        let orders = renumber_with_move(&snapshot, 3, 1).unwrap();
        assert_eq!(orders.get(&3), Some(&1));
        assert_eq!(orders.get(&1), Some(&2));
        assert_eq!(orders.get(&2), Some(&3));
    }

    #[test]
    fn test_renumber_with_move_clamps_position() {
        let snapshot = vec![
            grouping(1, QueuePriority::Standard, 1),
            grouping(2, QueuePriority::Standard, 2),
        ];
        let orders = renumber_with_move(&snapshot, 1, 99).unwrap();
        assert_eq!(orders.get(&2), Some(&1));
        assert_eq!(orders.get(&1), Some(&2));
    }

    #[test]
    fn test_renumber_unknown_grouping() {
        let snapshot = vec![grouping(1, QueuePriority::Standard, 1)];
        assert!(renumber_with_move(&snapshot, 999, 1).is_none());
    }
}

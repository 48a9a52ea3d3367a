//! Dequeue and exclude operations.
//!
//! Dequeue removes vessels from active work once their queue-type
//! precondition holds (or the caller overrides); exclude flags vessels as
//! skipped while keeping them in their grouping for audit.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::info;

use super::manager::QueueManager;
use super::types::{now_ms, DequeueRules, DequeueStrictness, QueueStatus, QueueType};
use super::validation;
use crate::collab::VesselInfo;
use crate::messages::MessageCollection;

impl QueueManager {
    /// Dequeue vessels from a queue. Returns the number of entities marked
    /// completed.
    ///
    /// Under `DequeueRules::Default` each vessel is checked against the
    /// queue type's precondition; a violation is reported as a warning and,
    /// with `Block` strictness, the vessel stays queued. `Override` bypasses
    /// validation entirely.
    pub fn dequeue(
        &self,
        queue_type: QueueType,
        barcodes: &[String],
        rules: DequeueRules,
        messages: &mut MessageCollection,
    ) -> usize {
        if barcodes.is_empty() {
            messages.add_error(format!(
                "Nothing to remove from the {} queue: no vessels given",
                queue_type.label()
            ));
            return 0;
        }

        // Vessel metadata is fetched before the lock; validation itself runs
        // against this snapshot.
        let infos: FxHashMap<&str, Option<VesselInfo>> = barcodes
            .iter()
            .map(|b| (b.as_str(), self.vessels.vessel(b)))
            .collect();

        let strictness = queue_type.dequeue_strictness();
        let mut removed: Vec<(u64, Arc<str>)> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();

        {
            let handle = self.queue(queue_type);
            let mut queue = handle.write();

            for barcode in barcodes {
                let mut found = false;
                for grouping in &mut queue.groupings {
                    let grouping_id = grouping.id;
                    for entity in &mut grouping.entities {
                        if !entity.is_active() || entity.vessel.as_ref() != barcode.as_str() {
                            continue;
                        }
                        found = true;

                        if rules == DequeueRules::Default {
                            let info = infos.get(barcode.as_str()).and_then(|i| i.as_ref());
                            if let Err(violation) =
                                validation::check_dequeue(queue_type, info, barcode)
                            {
                                messages.add_warning(violation);
                                if strictness == DequeueStrictness::Block {
                                    continue;
                                }
                            }
                        }

                        entity.status = QueueStatus::Completed;
                        entity.completed_at = Some(now_ms());
                        removed.push((grouping_id, Arc::clone(&entity.vessel)));
                    }
                }
                if !found {
                    missing.push(barcode);
                }
            }
        }

        for barcode in missing {
            messages.add_warning(format!(
                "Vessel {} is not actively queued in the {} queue",
                barcode,
                queue_type.label()
            ));
        }

        for (grouping_id, vessel) in &removed {
            self.persist_entity_status(*grouping_id, Arc::clone(vessel), QueueStatus::Completed);
        }
        self.metrics.record_dequeue(removed.len() as u64);

        if !removed.is_empty() {
            info!(
                queue = queue_type.label(),
                count = removed.len(),
                "Dequeued vessels"
            );
        }
        removed.len()
    }

    /// Mark vessels as excluded. They stay in their grouping with status
    /// `Excluded` - visible for audit, skipped by downstream consumers.
    /// Returns the number of entities excluded.
    pub fn exclude(
        &self,
        queue_type: QueueType,
        barcodes: &[String],
        messages: &mut MessageCollection,
    ) -> usize {
        if barcodes.is_empty() {
            messages.add_error(format!(
                "Nothing to exclude from the {} queue: no vessels given",
                queue_type.label()
            ));
            return 0;
        }

        let mut excluded: Vec<(u64, Arc<str>)> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();

        {
            let handle = self.queue(queue_type);
            let mut queue = handle.write();

            for barcode in barcodes {
                let mut found = false;
                for grouping in &mut queue.groupings {
                    let grouping_id = grouping.id;
                    for entity in &mut grouping.entities {
                        if entity.is_active() && entity.vessel.as_ref() == barcode.as_str() {
                            entity.status = QueueStatus::Excluded;
                            entity.completed_at = Some(now_ms());
                            excluded.push((grouping_id, Arc::clone(&entity.vessel)));
                            found = true;
                        }
                    }
                }
                if !found {
                    missing.push(barcode);
                }
            }
        }

        for barcode in missing {
            messages.add_warning(format!(
                "Vessel {} is not actively queued in the {} queue",
                barcode,
                queue_type.label()
            ));
        }

        for (grouping_id, vessel) in &excluded {
            self.persist_entity_status(*grouping_id, Arc::clone(vessel), QueueStatus::Excluded);
        }
        self.metrics.record_exclude(excluded.len() as u64);

        if !excluded.is_empty() {
            info!(
                queue = queue_type.label(),
                count = excluded.len(),
                "Excluded vessels"
            );
        }
        excluded.len()
    }
}

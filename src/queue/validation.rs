//! Dequeue precondition checks.
//!
//! Each queue type requires a measurement to have been recorded before a
//! vessel may leave the queue under default rules. Violations are reported
//! as human-readable messages; whether they block removal is decided by the
//! queue type's strictness.

use crate::collab::VesselInfo;
use crate::queue::types::QueueType;

/// Check the queue-type-specific precondition for removing one vessel.
/// `None` means the vessel is unknown to the data source, which also counts
/// as a violation.
pub fn check_dequeue(queue_type: QueueType, info: Option<&VesselInfo>, barcode: &str) -> Result<(), String> {
    let Some(info) = info else {
        return Err(format!(
            "Vessel {} has no metadata, cannot verify {} completion",
            barcode,
            queue_type.label()
        ));
    };

    match queue_type {
        QueueType::Pico | QueueType::DnaQuant | QueueType::Fingerprinting => {
            if info.latest_quant.is_none() {
                return Err(format!(
                    "Vessel {} has no quant recorded, required for the {} queue",
                    barcode,
                    queue_type.label()
                ));
            }
        }
        QueueType::VolumeCheck => {
            if info.volume.is_none() {
                return Err(format!(
                    "Vessel {} has no volume recorded, required for the {} queue",
                    barcode,
                    queue_type.label()
                ));
            }
        }
    }
    Ok(())
}

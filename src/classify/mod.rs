//! Priority classification.
//!
//! One `PriorityClassifier` per queue type, selected through `classifier_for`.
//! The shared `determine_priority` driver runs the scan; classifiers only
//! supply marker detection:
//! - pico.rs - CLIA / Exome Express markers
//! - dna_quant.rs - CLIA marker only
//! - fingerprinting.rs - direct markers plus a batched FFPE lookup
//! - volume_check.rs - no pluggable logic, always default

mod dna_quant;
mod fingerprinting;
mod pico;
mod volume_check;

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::collab::{CharacteristicLookup, SampleMetadata, VesselDataSource};
use crate::queue::ordering::bucket_index;
use crate::queue::types::{QueuePriority, QueueType};

pub use dna_quant::DnaQuantClassifier;
pub use fingerprinting::FingerprintingClassifier;
pub use pico::PicoClassifier;
pub use volume_check::VolumeCheckClassifier;

/// Queue-type-specific marker detection. The driver owns the scan order,
/// short-circuiting, caching, and the external lookup; implementations only
/// say what a marker means.
pub trait PriorityClassifier: Send + Sync {
    /// Priorities this queue type ranks, highest significance first. An empty
    /// slice means no pluggable logic - everything is default priority.
    fn priority_order(&self) -> &'static [QueuePriority];

    /// Priority implied by one sample's direct metadata, if any.
    fn classify_sample(&self, sample: &SampleMetadata) -> Option<QueuePriority>;

    /// True when direct metadata cannot decide and the sample should be
    /// included in the batched characteristic lookup.
    fn inconclusive(&self, _sample: &SampleMetadata) -> bool {
        false
    }

    /// Characteristic keys the lookup must fetch. Empty means this queue
    /// type never calls the external service.
    fn lookup_keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Priority implied by one sample's fetched characteristic values.
    fn classify_characteristics(
        &self,
        _values: &FxHashMap<String, String>,
    ) -> Option<QueuePriority> {
        None
    }
}

static PICO: PicoClassifier = PicoClassifier;
static DNA_QUANT: DnaQuantClassifier = DnaQuantClassifier;
static FINGERPRINTING: FingerprintingClassifier = FingerprintingClassifier;
static VOLUME_CHECK: VolumeCheckClassifier = VolumeCheckClassifier;

/// Classifier registry, keyed by queue type.
pub fn classifier_for(queue_type: QueueType) -> &'static dyn PriorityClassifier {
    match queue_type {
        QueueType::Pico => &PICO,
        QueueType::DnaQuant => &DNA_QUANT,
        QueueType::Fingerprinting => &FINGERPRINTING,
        QueueType::VolumeCheck => &VOLUME_CHECK,
    }
}

/// Determine the priority of a grouping of vessels.
///
/// Policy, preserved exactly:
/// - a grouping whose vessels were all previously seen in the queue is
///   default priority, regardless of markers (repeat work is never
///   re-prioritized);
/// - the highest ranked priority returns immediately on first match, so
///   remaining vessels are never fetched;
/// - lower ranked matches are cached, last found wins (root samples are
///   scanned after direct samples);
/// - samples the classifier flags inconclusive are resolved through a single
///   batched characteristic lookup, bounded by `lookup_timeout`; on failure
///   or timeout the cached direct-scan result (ultimately default) stands.
///
/// Missing vessels or metadata never fail classification.
pub async fn determine_priority(
    classifier: &dyn PriorityClassifier,
    barcodes: &[Arc<str>],
    all_previously_seen: bool,
    vessels: &dyn VesselDataSource,
    characteristics: Option<&dyn CharacteristicLookup>,
    lookup_timeout: Duration,
) -> QueuePriority {
    let order = classifier.priority_order();
    if order.is_empty() || all_previously_seen {
        return QueuePriority::Standard;
    }
    debug_assert!(
        !order.contains(&QueuePriority::Standard),
        "Standard is the default bucket and must not be ranked"
    );

    let top = order[0];
    let mut cached: Option<QueuePriority> = None;
    let mut inconclusive: Vec<Arc<str>> = Vec::new();
    let mut inconclusive_seen: FxHashSet<Arc<str>> = FxHashSet::default();
    let wants_lookup = !classifier.lookup_keys().is_empty();

    for barcode in barcodes {
        let Some(info) = vessels.vessel(barcode) else {
            continue;
        };
        for instance in &info.sample_instances {
            let samples = std::iter::once(&instance.sample).chain(instance.root.as_ref());
            for sample in samples {
                if let Some(priority) = classifier.classify_sample(sample) {
                    if priority == top {
                        return top;
                    }
                    if bucket_index(priority, order).is_some() {
                        cached = Some(priority);
                    }
                } else if wants_lookup && classifier.inconclusive(sample) {
                    if inconclusive_seen.insert(Arc::clone(&sample.sample_id)) {
                        inconclusive.push(Arc::clone(&sample.sample_id));
                    }
                }
            }
        }
    }

    if !inconclusive.is_empty() {
        if let Some(lookup) = characteristics {
            let keys = classifier.lookup_keys();
            match tokio::time::timeout(lookup_timeout, lookup.lookup(&inconclusive, keys)).await {
                Ok(Ok(map)) => {
                    for values in map.values() {
                        if let Some(priority) = classifier.classify_characteristics(values) {
                            if priority == top {
                                return top;
                            }
                            if bucket_index(priority, order).is_some() {
                                cached = Some(priority);
                            }
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Characteristic lookup failed, using default priority");
                }
                Err(_) => {
                    warn!(
                        timeout_ms = lookup_timeout.as_millis() as u64,
                        "Characteristic lookup timed out, using default priority"
                    );
                }
            }
        }
    }

    cached.unwrap_or(QueuePriority::Standard)
}

/// Shared direct-marker logic: clinical regulatory designation wins over the
/// Exome Express product flag.
pub(crate) fn clinical_or_express(sample: &SampleMetadata) -> Option<QueuePriority> {
    if sample
        .regulatory_designation
        .is_some_and(|d| d.is_clinical())
    {
        return Some(QueuePriority::Clia);
    }
    if sample.exome_express {
        return Some(QueuePriority::ExomeExpress);
    }
    None
}

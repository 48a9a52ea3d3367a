//! Volume check queue classifier: no pluggable logic, always default.

use super::PriorityClassifier;
use crate::collab::SampleMetadata;
use crate::queue::types::QueuePriority;

pub struct VolumeCheckClassifier;

impl PriorityClassifier for VolumeCheckClassifier {
    fn priority_order(&self) -> &'static [QueuePriority] {
        &[]
    }

    fn classify_sample(&self, _sample: &SampleMetadata) -> Option<QueuePriority> {
        None
    }
}

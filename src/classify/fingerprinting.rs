//! Fingerprinting queue classifier.
//!
//! Direct markers match the Pico rules. Samples carrying neither a
//! regulatory designation nor a product flag are resolved through the
//! batched characteristic lookup: FFPE-derived samples ride the expedited
//! bucket.

use rustc_hash::FxHashMap;

use super::{clinical_or_express, PriorityClassifier};
use crate::collab::SampleMetadata;
use crate::queue::types::QueuePriority;

const FFPE_KEY: &str = "FFPE";

pub struct FingerprintingClassifier;

impl PriorityClassifier for FingerprintingClassifier {
    fn priority_order(&self) -> &'static [QueuePriority] {
        &[QueuePriority::Clia, QueuePriority::ExomeExpress]
    }

    fn classify_sample(&self, sample: &SampleMetadata) -> Option<QueuePriority> {
        clinical_or_express(sample)
    }

    fn inconclusive(&self, sample: &SampleMetadata) -> bool {
        sample.regulatory_designation.is_none() && !sample.exome_express
    }

    fn lookup_keys(&self) -> &'static [&'static str] {
        &[FFPE_KEY]
    }

    fn classify_characteristics(
        &self,
        values: &FxHashMap<String, String>,
    ) -> Option<QueuePriority> {
        let ffpe = values.get(FFPE_KEY)?;
        if matches!(ffpe.to_ascii_lowercase().as_str(), "true" | "yes" | "1") {
            Some(QueuePriority::ExomeExpress)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::RegulatoryDesignation;

    #[test]
    fn test_designated_sample_is_conclusive() {
        let mut sample = SampleMetadata::new("SM-1");
        sample.regulatory_designation = Some(RegulatoryDesignation::ResearchOnly);
        assert!(!FingerprintingClassifier.inconclusive(&sample));
        assert_eq!(FingerprintingClassifier.classify_sample(&sample), None);
    }

    #[test]
    fn test_unmarked_sample_needs_lookup() {
        let sample = SampleMetadata::new("SM-1");
        assert!(FingerprintingClassifier.inconclusive(&sample));
    }

    #[test]
    fn test_ffpe_characteristic_values() {
        let mut values = FxHashMap::default();
        values.insert(FFPE_KEY.to_string(), "True".to_string());
        assert_eq!(
            FingerprintingClassifier.classify_characteristics(&values),
            Some(QueuePriority::ExomeExpress)
        );

        values.insert(FFPE_KEY.to_string(), "false".to_string());
        assert_eq!(FingerprintingClassifier.classify_characteristics(&values), None);

        let empty = FxHashMap::default();
        assert_eq!(FingerprintingClassifier.classify_characteristics(&empty), None);
    }
}

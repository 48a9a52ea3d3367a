//! DNA quant queue classifier: CLIA samples ahead of everything else.

use super::PriorityClassifier;
use crate::collab::SampleMetadata;
use crate::queue::types::QueuePriority;

pub struct DnaQuantClassifier;

impl PriorityClassifier for DnaQuantClassifier {
    fn priority_order(&self) -> &'static [QueuePriority] {
        &[QueuePriority::Clia]
    }

    fn classify_sample(&self, sample: &SampleMetadata) -> Option<QueuePriority> {
        sample
            .regulatory_designation
            .filter(|d| d.is_clinical())
            .map(|_| QueuePriority::Clia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::RegulatoryDesignation;

    #[test]
    fn test_only_clinical_ranks() {
        let mut sample = SampleMetadata::new("SM-1");
        assert_eq!(DnaQuantClassifier.classify_sample(&sample), None);

        // Express flag means nothing to this queue type
        sample.exome_express = true;
        assert_eq!(DnaQuantClassifier.classify_sample(&sample), None);

        sample.regulatory_designation = Some(RegulatoryDesignation::ClinicalDiagnostics);
        assert_eq!(
            DnaQuantClassifier.classify_sample(&sample),
            Some(QueuePriority::Clia)
        );
    }
}

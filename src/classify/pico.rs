//! Pico queue classifier.
//!
//! Clinical (CLIA) samples outrank Exome Express samples; everything else is
//! default priority. Markers are read from direct and root sample metadata,
//! no external lookup.

use super::{clinical_or_express, PriorityClassifier};
use crate::collab::SampleMetadata;
use crate::queue::types::QueuePriority;

pub struct PicoClassifier;

impl PriorityClassifier for PicoClassifier {
    fn priority_order(&self) -> &'static [QueuePriority] {
        &[QueuePriority::Clia, QueuePriority::ExomeExpress]
    }

    fn classify_sample(&self, sample: &SampleMetadata) -> Option<QueuePriority> {
        clinical_or_express(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::RegulatoryDesignation;

    #[test]
    fn test_clinical_sample_is_clia() {
        let mut sample = SampleMetadata::new("SM-1");
        sample.regulatory_designation = Some(RegulatoryDesignation::GeneralClia);
        assert_eq!(
            PicoClassifier.classify_sample(&sample),
            Some(QueuePriority::Clia)
        );
    }

    #[test]
    fn test_clinical_outranks_express_flag() {
        let mut sample = SampleMetadata::new("SM-1");
        sample.regulatory_designation = Some(RegulatoryDesignation::ClinicalDiagnostics);
        sample.exome_express = true;
        assert_eq!(
            PicoClassifier.classify_sample(&sample),
            Some(QueuePriority::Clia)
        );
    }

    #[test]
    fn test_express_sample() {
        let mut sample = SampleMetadata::new("SM-1");
        sample.exome_express = true;
        assert_eq!(
            PicoClassifier.classify_sample(&sample),
            Some(QueuePriority::ExomeExpress)
        );
    }

    #[test]
    fn test_research_sample_has_no_marker() {
        let mut sample = SampleMetadata::new("SM-1");
        sample.regulatory_designation = Some(RegulatoryDesignation::ResearchOnly);
        assert_eq!(PicoClassifier.classify_sample(&sample), None);
    }
}

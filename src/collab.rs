//! Collaborator interfaces the queue core calls out through.
//!
//! The core never talks to a database, a ticketing system, or a sample data
//! service directly. Surrounding infrastructure implements these traits:
//! - `VesselDataSource` - sample/vessel metadata lookup
//! - `CharacteristicLookup` - batched sample characteristic service
//! - `AuditSink` - ticket comment sink (failures are logged, never retried)

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Regulatory designation carried by a sample. Clinical designations drive
/// CLIA prioritization in several queue types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegulatoryDesignation {
    ResearchOnly,
    ClinicalDiagnostics,
    GeneralClia,
}

impl RegulatoryDesignation {
    /// True for designations that require CLIA handling.
    #[inline]
    pub fn is_clinical(self) -> bool {
        matches!(
            self,
            RegulatoryDesignation::ClinicalDiagnostics | RegulatoryDesignation::GeneralClia
        )
    }
}

/// Classification attributes of one sample. Markers may be absent; absence
/// never fails classification, it just yields no priority for that sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetadata {
    pub sample_id: Arc<str>,
    pub regulatory_designation: Option<RegulatoryDesignation>,
    /// Set when the sample rides an Exome Express product order.
    pub exome_express: bool,
}

impl SampleMetadata {
    pub fn new(sample_id: impl Into<Arc<str>>) -> Self {
        Self {
            sample_id: sample_id.into(),
            regulatory_designation: None,
            exome_express: false,
        }
    }
}

/// One sample as seen from a vessel: the direct sample plus its root
/// (ancestor) sample, since classification markers may live only on the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleInstance {
    pub sample: SampleMetadata,
    pub root: Option<SampleMetadata>,
}

/// Everything the core reads about one lab vessel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselInfo {
    pub barcode: Arc<str>,
    pub sample_instances: Vec<SampleInstance>,
    /// Most recent quant metric, if one has been recorded.
    pub latest_quant: Option<f64>,
    /// Most recent volume measurement, if one has been recorded.
    pub volume: Option<f64>,
}

impl VesselInfo {
    pub fn new(barcode: impl Into<Arc<str>>) -> Self {
        Self {
            barcode: barcode.into(),
            sample_instances: Vec::new(),
            latest_quant: None,
            volume: None,
        }
    }
}

/// Sample/vessel metadata lookup. Reads only; safe to call concurrently.
pub trait VesselDataSource: Send + Sync {
    /// Metadata for one vessel, or `None` if the barcode is unknown.
    fn vessel(&self, barcode: &str) -> Option<VesselInfo>;
}

/// Characteristic values keyed by sample id, as returned by the external
/// sample characteristic service.
pub type CharacteristicMap = FxHashMap<Arc<str>, FxHashMap<String, String>>;

/// Batched sample characteristic lookup (e.g. FFPE status). Idempotent and
/// side-effect free; the classification driver calls it at most once per
/// grouping and bounds it with a caller-supplied deadline.
#[async_trait]
pub trait CharacteristicLookup: Send + Sync {
    async fn lookup(
        &self,
        sample_ids: &[Arc<str>],
        keys: &[&str],
    ) -> Result<CharacteristicMap, String>;
}

/// Audit/notification sink: records a free-text comment against a ticket or
/// order key. Fire-and-forget from the caller's perspective.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn post_comment(&self, ticket: &str, text: &str) -> Result<(), String>;
}

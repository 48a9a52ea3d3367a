//! Priority queue engine for genomic LIMS sample processing.
//!
//! Lab vessels enter shared processing queues (Pico, DNA quant,
//! fingerprinting, volume check) as groupings. A per-queue-type classifier
//! assigns each grouping a priority from its sample metadata; the ordering
//! engine places the grouping relative to existing work and renumbers the
//! persisted linear order; the `QueueManager` exposes enqueue, dequeue,
//! exclude and reorder on top, with per-queue-type dequeue validation.
//!
//! All external I/O (sample data, characteristic service, ticket comments,
//! persistence) goes through the traits in [`collab`] and [`store`].

pub mod classify;
pub mod collab;
pub mod messages;
pub mod queue;
pub mod store;
pub mod telemetry;

pub use classify::{classifier_for, determine_priority, PriorityClassifier};
pub use collab::{
    AuditSink, CharacteristicLookup, CharacteristicMap, RegulatoryDesignation, SampleInstance,
    SampleMetadata, VesselDataSource, VesselInfo,
};
pub use messages::{MessageCollection, MessageLevel};
pub use queue::{
    DequeueRules, QueueGrouping, QueueManager, QueueOrigin, QueuePriority, QueueStatus, QueueType,
};
pub use store::{MemoryStore, QueueStore, StoreError};

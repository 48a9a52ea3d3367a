use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

// ============== Timestamps ==============

/// Current timestamp in milliseconds since the epoch.
#[inline(always)]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ============== String Interning ==============
// Avoid repeated allocations for vessel barcodes and sample ids

static INTERNED_STRINGS: Lazy<RwLock<FxHashSet<Arc<str>>>> =
    Lazy::new(|| RwLock::new(FxHashSet::default()));

/// Intern a string - returns Arc<str> that can be cheaply cloned
#[inline]
pub fn intern(s: &str) -> Arc<str> {
    // Fast path: check if already interned
    {
        let set = INTERNED_STRINGS.read();
        if let Some(arc) = set.get(s) {
            return Arc::clone(arc);
        }
    }

    // Slow path: insert new string
    let mut set = INTERNED_STRINGS.write();
    // Double-check after acquiring write lock
    if let Some(arc) = set.get(s) {
        return Arc::clone(arc);
    }

    let arc: Arc<str> = s.into();
    set.insert(Arc::clone(&arc));
    arc
}

// ============== Grouping Ids ==============
// Monotonic, process-wide. Ids are assigned before placement runs, so the
// default-ordering fallback (sort_order = id) can never collide with the
// 1..n counter values handed out by a renumbering walk.

static GROUPING_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[inline(always)]
pub fn next_grouping_id() -> u64 {
    GROUPING_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Set the grouping id counter (for recovery from a store).
pub fn set_grouping_id_counter(value: u64) {
    GROUPING_ID_COUNTER.store(value, Ordering::Relaxed);
}

// ============== Queue Enums ==============

/// Kind of processing queue. One queue exists per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    Pico,
    DnaQuant,
    Fingerprinting,
    VolumeCheck,
}

impl QueueType {
    pub const ALL: [QueueType; 4] = [
        QueueType::Pico,
        QueueType::DnaQuant,
        QueueType::Fingerprinting,
        QueueType::VolumeCheck,
    ];

    /// Human-readable queue name used in audit comments and messages.
    pub fn label(self) -> &'static str {
        match self {
            QueueType::Pico => "Pico",
            QueueType::DnaQuant => "DNA Quant",
            QueueType::Fingerprinting => "Fingerprinting",
            QueueType::VolumeCheck => "Volume Check",
        }
    }

    /// How strictly this queue enforces dequeue preconditions under default
    /// rules: `Block` refuses removal, `Warn` records a warning and proceeds.
    pub fn dequeue_strictness(self) -> DequeueStrictness {
        match self {
            QueueType::Pico | QueueType::DnaQuant | QueueType::Fingerprinting => {
                DequeueStrictness::Block
            }
            QueueType::VolumeCheck => DequeueStrictness::Warn,
        }
    }
}

/// Priority levels. `Standard` is the universal default and never appears in
/// a queue type's priority order; `Altered` marks a manual bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePriority {
    Standard,
    Altered,
    ExomeExpress,
    Clia,
}

/// Lifecycle status of one queued vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Active,
    Completed,
    Excluded,
}

/// Where an enqueue originated; free text in audit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrigin {
    Extraction,
    Receiving,
    Pooling,
    Other,
}

impl QueueOrigin {
    pub fn label(self) -> &'static str {
        match self {
            QueueOrigin::Extraction => "Extraction",
            QueueOrigin::Receiving => "Receiving",
            QueueOrigin::Pooling => "Pooling",
            QueueOrigin::Other => "Other",
        }
    }
}

/// Policy governing whether failed dequeue preconditions block removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueRules {
    /// Apply the queue type's validation with its configured strictness.
    Default,
    /// Bypass validation entirely.
    Override,
}

/// Behavior of default dequeue rules on a failed precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueStrictness {
    Block,
    Warn,
}

// ============== Queue Entities ==============

/// One work item (a vessel reference) within a grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntity {
    pub vessel: Arc<str>,
    pub status: QueueStatus,
    pub queued_at: u64,
    pub completed_at: Option<u64>,
}

impl QueueEntity {
    pub fn new(vessel: Arc<str>) -> Self {
        Self {
            vessel,
            status: QueueStatus::Active,
            queued_at: now_ms(),
            completed_at: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == QueueStatus::Active
    }
}

/// A unit of work inserted together: a set of entities sharing one priority
/// and one sort order. Sort order totally orders groupings within a queue;
/// priority is fixed at insertion unless explicitly recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueGrouping {
    pub id: u64,
    pub queue_type: QueueType,
    pub priority: QueuePriority,
    pub sort_order: i64,
    /// Administratively pinned: keeps its relative position during
    /// renumbering and never competes for a priority bucket.
    pub skip_priority_check: bool,
    pub description: Option<String>,
    pub entities: Vec<QueueEntity>,
    pub queued_at: u64,
}

impl QueueGrouping {
    pub fn new(id: u64, queue_type: QueueType, vessels: Vec<Arc<str>>) -> Self {
        Self {
            id,
            queue_type,
            priority: QueuePriority::Standard,
            sort_order: id as i64,
            skip_priority_check: false,
            description: None,
            entities: vessels.into_iter().map(QueueEntity::new).collect(),
            queued_at: now_ms(),
        }
    }

    /// True while at least one entity is still awaiting processing.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.entities.iter().any(QueueEntity::is_active)
    }

    pub fn active_vessels(&self) -> impl Iterator<Item = &Arc<str>> {
        self.entities
            .iter()
            .filter(|e| e.is_active())
            .map(|e| &e.vessel)
    }
}

// ============== Generic Queue ==============

/// One named, typed queue: the ordered groupings plus the set of barcodes
/// that have ever passed through it (drives the repeat-work policy).
pub struct GenericQueue {
    pub queue_type: QueueType,
    /// Kept sorted by sort_order after every committed mutation.
    pub groupings: Vec<QueueGrouping>,
    pub seen_vessels: FxHashSet<Arc<str>>,
}

impl GenericQueue {
    pub fn new(queue_type: QueueType) -> Self {
        Self {
            queue_type,
            groupings: Vec::new(),
            seen_vessels: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn sort(&mut self) {
        self.groupings.sort_by_key(|g| g.sort_order);
    }

    pub fn grouping(&self, id: u64) -> Option<&QueueGrouping> {
        self.groupings.iter().find(|g| g.id == id)
    }

    pub fn grouping_mut(&mut self, id: u64) -> Option<&mut QueueGrouping> {
        self.groupings.iter_mut().find(|g| g.id == id)
    }

    /// Apply a computed sort-order assignment and restore sorted order.
    pub fn commit_orders(&mut self, orders: &FxHashMap<u64, i64>) {
        for grouping in &mut self.groupings {
            if let Some(&order) = orders.get(&grouping.id) {
                grouping.sort_order = order;
            }
        }
        self.sort();
    }
}

// ============== Metrics ==============

pub struct QueueMetrics {
    pub total_enqueued: AtomicU64,
    pub total_dequeued: AtomicU64,
    pub total_excluded: AtomicU64,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self {
            total_enqueued: AtomicU64::new(0),
            total_dequeued: AtomicU64::new(0),
            total_excluded: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn record_enqueue(&self, count: u64) {
        self.total_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_dequeue(&self, count: u64) {
        self.total_dequeued.fetch_add(count, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_exclude(&self, count: u64) {
        self.total_excluded.fetch_add(count, Ordering::Relaxed);
    }
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-queue counts reported by `QueueManager::queue_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct QueueInfo {
    pub queue_type: QueueType,
    pub name: &'static str,
    pub active_groupings: usize,
    pub total_groupings: usize,
    pub active_vessels: usize,
}

mod dequeue;
mod enqueue;
mod manager;
pub mod ordering;
mod reorder;
pub mod types;
mod validation;


pub use manager::QueueManager;
pub use types::{
    DequeueRules, DequeueStrictness, GenericQueue, QueueEntity, QueueGrouping, QueueInfo,
    QueueMetrics, QueueOrigin, QueuePriority, QueueStatus, QueueType,
};

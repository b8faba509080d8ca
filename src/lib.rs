//! # Mutation Queue
//!
//! Coalescing mutation queue with retry and live status for checklist
//! reorder operations.
//!
//! ## Features
//!
//! - Strictly sequential, single-flight processing (one operation's
//!   network calls resolve before the next is issued)
//! - Coalescing: a newer reorder for a section replaces an older unsent one
//! - Reconciliation: only items whose `sort_order` actually changed are
//!   submitted
//! - Per-operation retry with head-of-queue re-insertion (3 attempts by
//!   default)
//! - Typed lifecycle events plus a coarse change signal for reactive UIs
//! - Pause/resume and clear controls
//!
//! ## Quick Start
//!
//! 1. Implement [`SortOrderWriter`] for your backend (or use
//!    [`RestSortOrderWriter`])
//! 2. Create a [`MutationQueue`] with [`MutationQueue::new()`]
//! 3. Hand new orderings to
//!    [`MutationQueue::add_reorder_operation()`]
//! 4. Drive a status widget from [`MutationQueue::subscribe()`] and
//!    [`MutationQueue::status()`]
//!
//! See the `demos/` directory for complete usage examples.

pub mod config;
pub mod error;
pub mod events;
mod executor;
pub mod queue;
pub mod rest;
pub mod types;

pub use config::{QueueConfig, QueueConfigBuilder};
pub use error::{QueueError, Result};
pub use events::QueueEvent;
pub use queue::{MutationQueue, SubscriptionId};
pub use rest::RestSortOrderWriter;
pub use types::{
    ChecklistItem, EnqueueOutcome, OperationKind, QueueOperation, QueueStatistics, QueueStatus,
    ReorderRequest,
};

/// The queue's one external capability: persisting a single item's sort
/// order.
///
/// The write must be idempotent: setting a sort order to a specific value
/// can be repeated safely, which is what lets the queue resubmit every item
/// of an operation on retry. Failure is signaled through the returned
/// `Result`; any error is treated as retryable.
///
/// # Example
///
/// ```ignore
/// use mutation_queue::*;
///
/// struct MemoryWriter;
///
/// impl SortOrderWriter for MemoryWriter {
///     async fn update_item_sort_order(&self, item_id: i64, sort_order: i32) -> Result<()> {
///         println!("item {} -> position {}", item_id, sort_order);
///         Ok(())
///     }
/// }
/// ```
pub trait SortOrderWriter: Send + Sync {
    /// Persist one item's sort order on the backend.
    fn update_item_sort_order(
        &self,
        item_id: i64,
        sort_order: i32,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

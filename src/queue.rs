use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::QueueConfig;
use crate::events::QueueEvent;
use crate::executor;
use crate::types::{
    self, ChecklistItem, EnqueueOutcome, OperationKind, QueueOperation, QueueStatistics,
    QueueStatus, ReorderRequest,
};
use crate::SortOrderWriter;

type StatusListener = Arc<dyn Fn() + Send + Sync>;
type EventListener = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Handle identifying a registered listener, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Lock a mutex, recovering the guard if a listener panic poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mutable queue state, guarded by a single mutex that is never held
/// across an await point.
pub(crate) struct QueueState {
    pub(crate) queue: VecDeque<QueueOperation>,
    /// User-visible processing flag; cleared by `pause()` and `clear()`.
    pub(crate) processing: bool,
    /// Whether a drain task exists. At most one is alive at a time; this
    /// is what keeps execution single-flight across pause/resume cycles.
    pub(crate) drain_alive: bool,
    pub(crate) current: Option<QueueOperation>,
    pub(crate) completed_count: u64,
    pub(crate) failed_count: u64,
    /// Bumped by `clear()`. An outcome whose captured generation no longer
    /// matches is discarded instead of being recorded.
    pub(crate) generation: u64,
}

pub(crate) fn snapshot(state: &QueueState) -> QueueStatus {
    QueueStatus {
        is_processing: state.processing,
        queue_length: state.queue.len(),
        current_operation: state.current.clone(),
        completed_count: state.completed_count,
        failed_count: state.failed_count,
    }
}

/// Everything shared between the public handle and the drain task.
pub(crate) struct QueueCore<W> {
    pub(crate) writer: W,
    pub(crate) config: QueueConfig,
    pub(crate) state: Mutex<QueueState>,
    status_listeners: Mutex<Vec<(u64, StatusListener)>>,
    event_listeners: Mutex<Vec<(u64, EventListener)>>,
    next_subscription: AtomicU64,
}

impl<W> QueueCore<W> {
    pub(crate) fn state(&self) -> MutexGuard<'_, QueueState> {
        lock(&self.state)
    }

    /// Invoke every status listener. Callbacks run without the registry
    /// lock held, so a listener may subscribe/unsubscribe freely.
    pub(crate) fn notify_listeners(&self) {
        let listeners: Vec<StatusListener> = lock(&self.status_listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Deliver a typed event to every event listener.
    pub(crate) fn emit(&self, event: &QueueEvent) {
        let listeners: Vec<EventListener> = lock(&self.event_listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

/// In-process mutation queue for checklist reorder operations.
///
/// Accepts reorder requests from UI code, guarantees they reach the backend
/// in submission order (net of coalescing and retries), never runs two
/// operations concurrently, and exposes live status for display.
///
/// The queue is a cheap `Clone` handle around shared state; clone it freely
/// into UI layers. Construct it once at application composition time and
/// inject it where needed.
///
/// # Example
///
/// ```ignore
/// let writer = RestSortOrderWriter::new("http://localhost:8000");
/// let queue = MutationQueue::new(writer);
///
/// let outcome = queue.add_reorder_operation(5, new_ordering, Some(&original));
/// if outcome.is_scheduled() {
///     println!("queued as {}", outcome.operation_id());
/// }
/// ```
pub struct MutationQueue<W: SortOrderWriter + 'static> {
    core: Arc<QueueCore<W>>,
}

impl<W: SortOrderWriter + 'static> Clone for MutationQueue<W> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<W: SortOrderWriter + 'static> MutationQueue<W> {
    /// Create a queue with the default configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, QueueConfig::default())
    }

    /// Create a queue with an explicit configuration.
    pub fn with_config(writer: W, config: QueueConfig) -> Self {
        Self {
            core: Arc::new(QueueCore {
                writer,
                config,
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    processing: false,
                    drain_alive: false,
                    current: None,
                    completed_count: 0,
                    failed_count: 0,
                    generation: 0,
                }),
                status_listeners: Mutex::new(Vec::new()),
                event_listeners: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    /// Enqueue a reorder of `items` within `section_id`.
    ///
    /// When `original_items` is provided and non-empty, only items whose
    /// `sort_order` differs from the snapshot are submitted; if none
    /// differ, nothing is enqueued and [`EnqueueOutcome::NoChange`] is
    /// returned. A queued (not-yet-started) reorder for the same section
    /// is replaced by the new one.
    ///
    /// Processing starts immediately if no drain loop is active, which
    /// also restarts a paused queue. Must be called from within a Tokio
    /// runtime.
    pub fn add_reorder_operation(
        &self,
        section_id: i64,
        items: Vec<ChecklistItem>,
        original_items: Option<&[ChecklistItem]>,
    ) -> EnqueueOutcome {
        let operation_id = types::operation_id(section_id);

        let items_to_update = match original_items {
            Some(original) if !original.is_empty() => changed_items(items, original),
            _ => items,
        };

        if items_to_update.is_empty() {
            return EnqueueOutcome::NoChange { operation_id };
        }

        let operation = QueueOperation::reorder(
            operation_id.clone(),
            section_id,
            items_to_update,
            self.core.config.max_retries,
        );

        {
            let mut state = self.core.state();
            // A newer reorder supersedes an older unsent one for the section.
            state.queue.retain(|queued| {
                !matches!(
                    &queued.kind,
                    OperationKind::ReorderItems { section_id: s, .. } if *s == section_id
                )
            });
            state.queue.push_back(operation);
            self.start_processing(&mut state);
        }
        self.core.notify_listeners();

        EnqueueOutcome::Scheduled { operation_id }
    }

    /// Apply [`add_reorder_operation`](Self::add_reorder_operation) to each
    /// request in order.
    ///
    /// There is no atomicity across the batch: each entry is filtered and
    /// coalesced independently, so a later entry for the same section
    /// supersedes an earlier one.
    pub fn add_batch_reorder_operations(
        &self,
        operations: Vec<ReorderRequest>,
    ) -> Vec<EnqueueOutcome> {
        operations
            .into_iter()
            .map(|request| {
                self.add_reorder_operation(
                    request.section_id,
                    request.items,
                    request.original_items.as_deref(),
                )
            })
            .collect()
    }

    /// Register a listener invoked after every state mutation (enqueue,
    /// dequeue, retry, completion, clear, pause, resume, removal). Use
    /// together with [`status()`](Self::status) to drive a reactive
    /// snapshot.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = self.core.next_subscription.fetch_add(1, Ordering::Relaxed);
        lock(&self.core.status_listeners).push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Remove a listener registered with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        lock(&self.core.status_listeners).retain(|(id, _)| *id != subscription.0);
    }

    /// Register a typed lifecycle event listener. Multiple listeners can
    /// coexist; registering one never displaces another.
    pub fn add_listener(
        &self,
        listener: impl Fn(&QueueEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.core.next_subscription.fetch_add(1, Ordering::Relaxed);
        lock(&self.core.event_listeners).push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Remove a listener registered with [`add_listener`](Self::add_listener).
    pub fn remove_listener(&self, subscription: SubscriptionId) {
        lock(&self.core.event_listeners).retain(|(id, _)| *id != subscription.0);
    }

    /// Current counters and queue length. Synchronous, no side effects.
    pub fn status(&self) -> QueueStatus {
        snapshot(&self.core.state())
    }

    /// Aggregate statistics over processed and queued operations.
    pub fn statistics(&self) -> QueueStatistics {
        let state = self.core.state();
        let total_processed = state.completed_count + state.failed_count;
        let success_rate = if total_processed > 0 {
            state.completed_count as f64 / total_processed as f64
        } else {
            0.0
        };
        let average_retries = if state.queue.is_empty() {
            0.0
        } else {
            state.queue.iter().map(|op| op.retry_count as f64).sum::<f64>()
                / state.queue.len() as f64
        };
        QueueStatistics {
            total_processed,
            success_rate,
            average_retries,
        }
    }

    /// Number of not-yet-started operations.
    pub fn queue_length(&self) -> usize {
        self.core.state().queue.len()
    }

    /// Whether no operations are waiting.
    pub fn is_empty(&self) -> bool {
        self.core.state().queue.is_empty()
    }

    /// The operation at the head of the queue, if any.
    pub fn next_operation(&self) -> Option<QueueOperation> {
        self.core.state().queue.front().cloned()
    }

    /// Empty the queue, stop processing, and reset counters.
    ///
    /// An operation already dispatched cannot be cancelled, but its
    /// late-arriving outcome is discarded rather than recorded against the
    /// freshly reset counters.
    pub fn clear(&self) {
        {
            let mut state = self.core.state();
            state.queue.clear();
            state.processing = false;
            state.current = None;
            state.completed_count = 0;
            state.failed_count = 0;
            state.generation += 1;
        }
        self.core.notify_listeners();
    }

    /// Stop dequeuing further operations.
    ///
    /// An in-flight operation still completes and its result (success,
    /// retry, or failure) is still recorded; only subsequent dequeues are
    /// held until [`resume()`](Self::resume) or a new enqueue, either of
    /// which restarts processing.
    pub fn pause(&self) {
        {
            let mut state = self.core.state();
            state.processing = false;
        }
        self.core.notify_listeners();
    }

    /// Restart the drain loop if the queue is non-empty and not already
    /// processing.
    pub fn resume(&self) {
        let restarted = {
            let mut state = self.core.state();
            if !state.processing && !state.queue.is_empty() {
                self.start_processing(&mut state);
                true
            } else {
                false
            }
        };
        if restarted {
            self.core.notify_listeners();
        }
    }

    /// Remove a not-yet-started operation by id. Returns whether anything
    /// was removed; the currently executing operation is never affected.
    pub fn remove_operation(&self, operation_id: &str) -> bool {
        let removed = {
            let mut state = self.core.state();
            let before = state.queue.len();
            state.queue.retain(|op| op.id != operation_id);
            state.queue.len() != before
        };
        if removed {
            self.core.notify_listeners();
        }
        removed
    }

    /// Mark the queue as processing and spawn a drain task unless one is
    /// already alive. Caller holds the state lock.
    fn start_processing(&self, state: &mut QueueState) {
        state.processing = true;
        if !state.drain_alive {
            state.drain_alive = true;
            executor::spawn_drain(Arc::clone(&self.core));
        }
    }
}

/// Keep only items whose sort order differs from the original snapshot.
/// Items absent from the snapshot are dropped: without a baseline there is
/// no change to prove, and the caller's snapshot is authoritative.
fn changed_items(items: Vec<ChecklistItem>, original: &[ChecklistItem]) -> Vec<ChecklistItem> {
    let original_orders: HashMap<i64, i32> = original
        .iter()
        .map(|item| (item.id, item.sort_order))
        .collect();
    items
        .into_iter()
        .filter(|item| {
            original_orders
                .get(&item.id)
                .is_some_and(|&original_order| original_order != item.sort_order)
        })
        .collect()
}

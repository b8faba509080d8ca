use serde::{Deserialize, Serialize};

/// A checklist item as the staff backend exposes it.
///
/// Field names match the backend's snake_case wire format, so values can be
/// passed through from API responses without renaming. Only `id` and
/// `sort_order` drive queue behavior; the rest ride along so UI layers can
/// render the payload of a pending operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub section_id: i64,
}

/// Payload of a queued mutation, tagged by operation type.
///
/// Currently the queue only knows how to reorder items within a section;
/// new operation kinds become new variants without breaking consumers that
/// match on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OperationKind {
    /// Persist a new relative ordering for the items of one section.
    ReorderItems {
        section_id: i64,
        items: Vec<ChecklistItem>,
    },
}

/// One pending mutation in the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueOperation {
    /// Opaque unique id, used for identification and removal only.
    pub id: String,
    #[serde(flatten)]
    pub kind: OperationKind,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Failed attempts so far.
    pub retry_count: u32,
    /// Retry budget for this operation.
    pub max_retries: u32,
}

impl QueueOperation {
    pub(crate) fn reorder(
        operation_id: String,
        section_id: i64,
        items: Vec<ChecklistItem>,
        max_retries: u32,
    ) -> Self {
        Self {
            id: operation_id,
            kind: OperationKind::ReorderItems { section_id, items },
            created_at: chrono::Utc::now().to_rfc3339(),
            retry_count: 0,
            max_retries,
        }
    }

    /// The section this operation targets.
    pub fn section_id(&self) -> i64 {
        match &self.kind {
            OperationKind::ReorderItems { section_id, .. } => *section_id,
        }
    }

    /// The items this operation will write.
    pub fn items(&self) -> &[ChecklistItem] {
        match &self.kind {
            OperationKind::ReorderItems { items, .. } => items,
        }
    }
}

/// Generate an operation id: section, creation millis, random suffix.
pub(crate) fn operation_id(section_id: i64) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("reorder_{}_{}_{}", section_id, millis, &uuid[..8])
}

/// Read-only snapshot of the queue, safe to hand to UI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    /// Whether the drain loop is running (false while paused or idle).
    pub is_processing: bool,
    /// Number of not-yet-started operations.
    pub queue_length: usize,
    /// The operation currently executing, if any.
    pub current_operation: Option<QueueOperation>,
    /// Operations completed since creation or the last `clear`.
    pub completed_count: u64,
    /// Operations that exhausted their retries since creation or the last `clear`.
    pub failed_count: u64,
}

/// Aggregate processing statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatistics {
    /// Completed plus failed operations.
    pub total_processed: u64,
    /// Completed / total processed, 0.0 when nothing has been processed.
    pub success_rate: f64,
    /// Mean retry count across currently queued operations.
    pub average_retries: f64,
}

/// Result of an enqueue call.
///
/// Both variants carry the generated operation id, so callers that only
/// need an identifier can stay agnostic; callers that care can tell whether
/// work was actually scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The operation was queued (possibly replacing an older queued one
    /// for the same section).
    Scheduled { operation_id: String },
    /// No item's sort order differed from the original snapshot; nothing
    /// was queued.
    NoChange { operation_id: String },
}

impl EnqueueOutcome {
    /// The generated operation id, regardless of outcome.
    pub fn operation_id(&self) -> &str {
        match self {
            EnqueueOutcome::Scheduled { operation_id } => operation_id,
            EnqueueOutcome::NoChange { operation_id } => operation_id,
        }
    }

    /// Whether the call enqueued work.
    pub fn is_scheduled(&self) -> bool {
        matches!(self, EnqueueOutcome::Scheduled { .. })
    }
}

/// One entry of a batch reorder submission.
#[derive(Debug, Clone)]
pub struct ReorderRequest {
    pub section_id: i64,
    /// Full proposed ordering for the section.
    pub items: Vec<ChecklistItem>,
    /// Pre-reorder snapshot; when present, unchanged items are filtered out.
    pub original_items: Option<Vec<ChecklistItem>>,
}

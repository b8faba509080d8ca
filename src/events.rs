use serde::{Deserialize, Serialize};

use crate::types::{QueueOperation, QueueStatus};

/// Lifecycle events delivered to registered listeners.
///
/// Serializes with a snake_case `type` tag and camelCase payload fields, so
/// hosts can forward events to a JS-facing bridge unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QueueEvent {
    /// An operation was dequeued and is about to execute.
    OperationStarted { operation: QueueOperation },

    /// All of an operation's writes succeeded.
    OperationCompleted { operation: QueueOperation },

    /// An attempt failed and the operation was reinserted at the head of
    /// the queue. `attempt` counts failed attempts so far.
    OperationRetried {
        operation: QueueOperation,
        attempt: u32,
        error: String,
    },

    /// An operation exhausted its retry budget. Emitted exactly once per
    /// failed operation.
    OperationFailed {
        operation: QueueOperation,
        error: String,
    },

    /// The queue drained to empty after a processing run.
    QueueDrained { status: QueueStatus },
}

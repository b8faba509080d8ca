use std::sync::Arc;

use futures::future::try_join_all;

use crate::error::Result;
use crate::events::QueueEvent;
use crate::queue::{snapshot, QueueCore};
use crate::types::{OperationKind, QueueOperation};
use crate::SortOrderWriter;

/// What happened to the operation the drain loop just executed.
enum Outcome {
    Completed,
    Retried {
        operation: QueueOperation,
        error: String,
    },
    Failed {
        error: String,
    },
    /// A `clear()` happened while the operation was in flight; the result
    /// is discarded without touching counters or emitting events.
    Disowned,
}

/// Spawn the drain loop as a background tokio task.
///
/// The caller must have set `drain_alive` under the state lock first, so
/// at most one loop exists per queue.
pub(crate) fn spawn_drain<W: SortOrderWriter + 'static>(core: Arc<QueueCore<W>>) {
    tokio::spawn(async move {
        run_drain(core).await;
    });
}

async fn run_drain<W: SortOrderWriter + 'static>(core: Arc<QueueCore<W>>) {
    loop {
        let (operation, generation) = {
            let mut state = core.state();
            if !state.processing {
                // Paused or cleared between operations.
                state.drain_alive = false;
                state.current = None;
                return;
            }
            match state.queue.pop_front() {
                Some(operation) => {
                    state.current = Some(operation.clone());
                    let generation = state.generation;
                    (operation, generation)
                }
                None => {
                    state.processing = false;
                    state.drain_alive = false;
                    state.current = None;
                    let status = snapshot(&state);
                    drop(state);
                    core.emit(&QueueEvent::QueueDrained { status });
                    core.notify_listeners();
                    return;
                }
            }
        };

        core.notify_listeners();
        core.emit(&QueueEvent::OperationStarted {
            operation: operation.clone(),
        });

        let result = execute(&core.writer, &operation).await;

        let outcome = {
            let mut state = core.state();
            state.current = None;
            if state.generation != generation {
                Outcome::Disowned
            } else {
                match result {
                    Ok(()) => {
                        state.completed_count += 1;
                        Outcome::Completed
                    }
                    Err(error) => {
                        let error = error.to_string();
                        if operation.retry_count < operation.max_retries {
                            let mut retry = operation.clone();
                            retry.retry_count += 1;
                            // Head re-insertion: the retry runs before any
                            // other pending work.
                            state.queue.push_front(retry.clone());
                            Outcome::Retried {
                                operation: retry,
                                error,
                            }
                        } else {
                            state.failed_count += 1;
                            Outcome::Failed { error }
                        }
                    }
                }
            }
        };

        match &outcome {
            Outcome::Completed => {
                core.emit(&QueueEvent::OperationCompleted {
                    operation: operation.clone(),
                });
            }
            Outcome::Retried {
                operation: retry,
                error,
            } => {
                eprintln!(
                    "[mutation-queue] Operation {} failed (attempt {} of {}), retrying: {}",
                    retry.id,
                    retry.retry_count,
                    retry.max_retries,
                    error
                );
                core.emit(&QueueEvent::OperationRetried {
                    operation: retry.clone(),
                    attempt: retry.retry_count,
                    error: error.clone(),
                });
            }
            Outcome::Failed { error } => {
                eprintln!(
                    "[mutation-queue] Operation {} failed after {} attempts: {}",
                    operation.id,
                    operation.max_retries + 1,
                    error
                );
                core.emit(&QueueEvent::OperationFailed {
                    operation: operation.clone(),
                    error: error.clone(),
                });
            }
            Outcome::Disowned => {}
        }
        core.notify_listeners();

        if matches!(outcome, Outcome::Retried { .. }) && !core.config.retry_delay.is_zero() {
            tokio::time::sleep(core.config.retry_delay).await;
        }
    }
}

/// Issue one write per item, all at once, and await them together. The
/// first rejection fails the whole operation; a retry resubmits every item,
/// which is safe because single-item writes are idempotent.
async fn execute<W: SortOrderWriter>(writer: &W, operation: &QueueOperation) -> Result<()> {
    match &operation.kind {
        OperationKind::ReorderItems { items, .. } => {
            let writes = items
                .iter()
                .map(|item| writer.update_item_sort_order(item.id, item.sort_order));
            try_join_all(writes).await?;
            Ok(())
        }
    }
}

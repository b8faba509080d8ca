use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use mutation_queue::*;

/// Backend that drops the first two requests, then recovers.
struct FlakyWriter {
    attempts: AtomicU32,
}

impl SortOrderWriter for FlakyWriter {
    async fn update_item_sort_order(&self, _item_id: i64, _sort_order: i32) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < 2 {
            return Err(QueueError::Other("simulated network drop".to_string()));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let config = QueueConfig::builder()
        .with_max_retries(3)
        .with_retry_delay(Duration::from_millis(200))
        .build();
    let queue = MutationQueue::with_config(
        FlakyWriter {
            attempts: AtomicU32::new(0),
        },
        config,
    );

    queue.add_listener(|event| match event {
        QueueEvent::OperationStarted { operation } => println!("started   {}", operation.id),
        QueueEvent::OperationRetried { attempt, error, .. } => {
            println!("retry #{}: {}", attempt, error)
        }
        QueueEvent::OperationCompleted { operation } => println!("completed {}", operation.id),
        QueueEvent::OperationFailed { error, .. } => println!("failed: {}", error),
        QueueEvent::QueueDrained { status } => println!(
            "drained: {} completed / {} failed",
            status.completed_count, status.failed_count
        ),
    });

    let items = vec![ChecklistItem {
        id: 42,
        title: "Photograph lobby".to_string(),
        slug: "photograph-lobby".to_string(),
        sort_order: 1,
        is_active: true,
        section_id: 3,
    }];
    queue.add_reorder_operation(3, items, None);

    while queue.status().is_processing || !queue.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

use std::time::Duration;

use mutation_queue::*;

/// Pretend backend: logs each write after a short delay.
struct MemoryWriter;

impl SortOrderWriter for MemoryWriter {
    async fn update_item_sort_order(&self, item_id: i64, sort_order: i32) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("  wrote item {} -> position {}", item_id, sort_order);
        Ok(())
    }
}

fn checklist_item(id: i64, section_id: i64, sort_order: i32, title: &str) -> ChecklistItem {
    ChecklistItem {
        id,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        sort_order,
        is_active: true,
        section_id,
    }
}

#[tokio::main]
async fn main() {
    let queue = MutationQueue::new(MemoryWriter);

    // A status widget would re-render on every change signal.
    let status_view = queue.clone();
    queue.subscribe(move || {
        let status = status_view.status();
        println!(
            "[status] processing={} queued={} completed={}",
            status.is_processing, status.queue_length, status.completed_count
        );
    });

    // The inspector dragged "Check minibar" above "Inspect bathroom".
    let original = vec![
        checklist_item(1, 5, 1, "Inspect bathroom"),
        checklist_item(2, 5, 2, "Check minibar"),
    ];
    let proposed = vec![
        checklist_item(1, 5, 2, "Inspect bathroom"),
        checklist_item(2, 5, 1, "Check minibar"),
    ];

    let outcome = queue.add_reorder_operation(5, proposed, Some(&original));
    println!("queued as {}", outcome.operation_id());

    // Dropping an item back where it started is a no-op.
    let unchanged = queue.add_reorder_operation(5, original.clone(), Some(&original));
    println!("no-op scheduled? {}", unchanged.is_scheduled());

    while queue.status().is_processing || !queue.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let status = queue.status();
    println!(
        "done: {} completed, {} failed",
        status.completed_count, status.failed_count
    );
}

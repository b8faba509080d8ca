use std::time::Duration;

use mutation_queue::*;

/// Requires a running staff backend; point `API_URL` at it (defaults to
/// http://localhost:8000) and set `API_TOKEN` for authenticated setups.
#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let mut writer = RestSortOrderWriter::new(&base_url);
    if let Ok(token) = std::env::var("API_TOKEN") {
        writer = writer.with_bearer_token(token);
    }

    let queue = MutationQueue::new(writer);
    queue.add_listener(|event| {
        if let QueueEvent::OperationFailed { error, .. } = event {
            eprintln!("reorder failed: {}", error);
        }
    });

    // Swap the first two items of section 5 on the live backend.
    let original = vec![
        ChecklistItem {
            id: 10,
            title: "Inspect bathroom".to_string(),
            slug: "inspect-bathroom".to_string(),
            sort_order: 1,
            is_active: true,
            section_id: 5,
        },
        ChecklistItem {
            id: 11,
            title: "Check minibar".to_string(),
            slug: "check-minibar".to_string(),
            sort_order: 2,
            is_active: true,
            section_id: 5,
        },
    ];
    let mut proposed = original.clone();
    proposed[0].sort_order = 2;
    proposed[1].sort_order = 1;

    let outcome = queue.add_reorder_operation(5, proposed, Some(&original));
    println!("queued as {}", outcome.operation_id());

    while queue.status().is_processing || !queue.is_empty() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let status = queue.status();
    println!(
        "finished against {}: {} completed, {} failed",
        base_url, status.completed_count, status.failed_count
    );
}

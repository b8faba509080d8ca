use reqwest::Client;
use serde_json::json;

use crate::error::{QueueError, Result};
use crate::SortOrderWriter;

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// [`SortOrderWriter`] backed by the staff checklist REST API.
///
/// Issues `PATCH {base_url}/staff/checklist_items/{id}` with a
/// `{"sort_order": n}` body. The endpoint is idempotent, which is what the
/// queue relies on when it resubmits items on retry.
///
/// # Example
/// ```no_run
/// use mutation_queue::RestSortOrderWriter;
///
/// let writer = RestSortOrderWriter::new("http://localhost:8000")
///     .with_bearer_token("token-from-session");
/// ```
#[derive(Debug, Clone)]
pub struct RestSortOrderWriter {
    http: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl RestSortOrderWriter {
    /// Create a writer pointing at the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize(base_url.into()),
            bearer_token: None,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SortOrderWriter for RestSortOrderWriter {
    async fn update_item_sort_order(&self, item_id: i64, sort_order: i32) -> Result<()> {
        let url = format!("{}/staff/checklist_items/{}", self.base_url, item_id);

        let mut request = self.http.patch(&url).json(&json!({ "sort_order": sort_order }));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(QueueError::Api { status, message });
        }
        Ok(())
    }
}

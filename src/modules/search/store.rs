use std::sync::Arc;
use tokio::time::Duration;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};
use crate::modules::listview::Debouncer;

use super::service::{SearchFilters, SearchHit, SearchService};

/// Debounced, cached global search: keystrokes feed the debouncer, reads use
/// whatever term is currently active, and the cache keeps the previous hit
/// list visible while a new term loads.
pub struct SearchStore {
    service: Arc<SearchService>,
    cache: QueryCache,
    debouncer: Debouncer,
}

impl SearchStore {
    pub fn new(service: Arc<SearchService>, cache: QueryCache, debounce: Duration) -> Self {
        Self {
            service,
            cache,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn input_term(&self, term: &str) {
        self.debouncer.input(term);
    }

    pub fn active_term(&self) -> String {
        self.debouncer.current()
    }

    pub fn clear(&self) {
        self.debouncer.force("");
    }

    /// Watch this to re-read `results` when the active term settles.
    pub fn subscribe_term(&self) -> tokio::sync::watch::Receiver<String> {
        self.debouncer.subscribe()
    }

    pub async fn results(&self, filters: &SearchFilters) -> QuerySnapshot<Vec<SearchHit>> {
        let term = self.debouncer.current();
        if term.trim().is_empty() {
            return QuerySnapshot::ready(Vec::new());
        }

        let key = QueryKey::scope("global-search")
            .with(term.as_str())
            .with(
                filters
                    .post_status
                    .map(|status| format!("{:?}", status).to_lowercase())
                    .unwrap_or_default(),
            )
            .with(filters.tag.clone().unwrap_or_default());
        let service = self.service.clone();
        let filters = filters.clone();
        self.cache
            .query(key, move || {
                let service = service.clone();
                let term = term.clone();
                let filters = filters.clone();
                async move {
                    service
                        .search(&term, &filters)
                        .await
                        .map_err(|e| e.to_string())
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::cache::QueryCache;
    use crate::test_support::MockTableClient;
    use serde_json::json;
    use tokio::time::advance;

    fn tech_row(name: &str) -> serde_json::Value {
        json!({"id": "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9", "name": name})
    }

    fn store(client: Arc<MockTableClient>) -> SearchStore {
        SearchStore::new(
            Arc::new(SearchService::new(client, 5)),
            QueryCache::with_defaults(),
            Duration::from_millis(300),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_debounced_term() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![])
                .on_select(vec![])
                .on_select(vec![tech_row("Rust")]),
        );
        let store = store(client.clone());

        store.input_term("ru");
        store.input_term("rust");
        tokio::task::yield_now().await;
        // Before the delay elapses the active term is still blank.
        let early = store.results(&SearchFilters::default()).await;
        assert!(early.data.unwrap().is_empty());
        assert!(client.calls().is_empty());

        advance(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        let settled = store.results(&SearchFilters::default()).await;

        assert_eq!(store.active_term(), "rust");
        let hits = settled.data.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_failure_surfaces_as_snapshot_error() {
        let client = Arc::new(
            MockTableClient::new()
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable")
                .fail_select("backend unreachable"),
        );
        let store = store(client);

        store.input_term("rust");
        tokio::task::yield_now().await;
        advance(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        let snapshot = store.results(&SearchFilters::default()).await;

        assert!(snapshot.data.is_none());
        assert!(snapshot
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("backend unreachable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_active_term_immediately() {
        let client = Arc::new(MockTableClient::new());
        let store = store(client);

        store.input_term("rust");
        store.clear();
        advance(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.active_term(), "");
        let snapshot = store.results(&SearchFilters::default()).await;
        assert!(snapshot.data.unwrap().is_empty());
    }
}

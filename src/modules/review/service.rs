use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::remote::{decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery};

use super::entity::{Review, ReviewDraft, ReviewPage, ReviewPageRequest, ReviewPatch, ReviewSort};

pub struct ReviewService {
    client: Arc<dyn TableClient>,
}

impl ReviewService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub async fn by_project(&self, project_id: Uuid) -> Vec<Review> {
        let query = TableQuery::new("project_reviews")
            .filter(Filter::Eq("project_id".to_string(), json!(project_id)))
            .order(OrderBy::desc("created_at"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(reviews) => reviews,
            Err(e) => {
                error!("Failed to fetch reviews of project {}: {}", project_id, e);
                Vec::new()
            }
        }
    }

    /// One page of a project's reviews plus the exact overall count.
    pub async fn page(&self, project_id: Uuid, request: ReviewPageRequest) -> ReviewPage {
        let page = request.page.max(1);
        let from = (page - 1) * request.limit;
        let to = page * request.limit - 1;

        let mut query = TableQuery::new("project_reviews")
            .filter(Filter::Eq("project_id".to_string(), json!(project_id)))
            .window(from, to);
        if let Some(filter_type) = &request.filter_type {
            query = query.filter(Filter::Eq("review_type".to_string(), json!(filter_type)));
        }
        if let Some(min_rating) = request.min_rating {
            query = query.filter(Filter::Gte("rating".to_string(), json!(min_rating)));
        }
        query = match request.sort_by {
            ReviewSort::Latest => query.order(OrderBy::desc("created_at")),
            ReviewSort::Rating => query
                .order(OrderBy::desc_nulls_last("rating"))
                .order(OrderBy::desc("created_at")),
        };

        match self.client.select_counted(query).await {
            Ok(counted) => match decode_rows(counted.rows) {
                Ok(items) => ReviewPage {
                    items,
                    total: counted.total,
                },
                Err(e) => {
                    error!("Failed to decode review page: {}", e);
                    ReviewPage {
                        items: Vec::new(),
                        total: 0,
                    }
                }
            },
            Err(e) => {
                error!("Failed to fetch review page: {}", e);
                ReviewPage {
                    items: Vec::new(),
                    total: 0,
                }
            }
        }
    }

    pub async fn create(&self, draft: ReviewDraft) -> Option<Review> {
        let row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize review draft: {}", e);
                return None;
            }
        };
        match self.client.insert("project_reviews", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create review: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: ReviewPatch) -> Option<Review> {
        let mut body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize review patch: {}", e);
                return None;
            }
        };
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("project_reviews", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update review {}: {}", id, e);
                None
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("project_reviews", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete review {}: {}", id, e);
                false
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<Review> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(review) => Some(review),
        Err(e) => {
            error!("Failed to decode review row: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClientCall, MockTableClient};

    const PROJECT_ID: &str = "7e3f4b9c-41c8-4b9e-9a35-0af1f6f9f6de";

    fn review_row(rating: i64) -> Value {
        json!({
            "id": "8f90a1b2-c3d4-e5f6-0718-293a4b5c6d7e",
            "project_id": PROJECT_ID,
            "rating": rating,
        })
    }

    #[tokio::test]
    async fn test_page_window_is_one_based() {
        let client = Arc::new(MockTableClient::new().on_counted(vec![review_row(5)], 57));
        let service = ReviewService::new(client.clone());
        let project_id = Uuid::parse_str(PROJECT_ID).unwrap();

        let page = service
            .page(
                project_id,
                ReviewPageRequest {
                    page: 2,
                    limit: 10,
                    ..ReviewPageRequest::default()
                },
            )
            .await;

        assert_eq!(page.total, 57);
        assert_eq!(page.items.len(), 1);
        match &client.calls()[0] {
            ClientCall::SelectCounted(query) => {
                assert_eq!(query.window, Some((10, 19)));
                assert_eq!(query.order, vec![OrderBy::desc("created_at")]);
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rating_sort_puts_nulls_last_with_recency_tiebreak() {
        let client = Arc::new(MockTableClient::new().on_counted(vec![], 0));
        let service = ReviewService::new(client.clone());
        let project_id = Uuid::parse_str(PROJECT_ID).unwrap();

        service
            .page(
                project_id,
                ReviewPageRequest {
                    sort_by: ReviewSort::Rating,
                    min_rating: Some(3),
                    ..ReviewPageRequest::default()
                },
            )
            .await;

        match &client.calls()[0] {
            ClientCall::SelectCounted(query) => {
                assert_eq!(
                    query.order,
                    vec![
                        OrderBy::desc_nulls_last("rating"),
                        OrderBy::desc("created_at"),
                    ]
                );
                assert!(query
                    .filters
                    .contains(&Filter::Gte("rating".to_string(), json!(3))));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_page_read_yields_empty_page() {
        let client = Arc::new(MockTableClient::new().fail_counted("boom"));
        let service = ReviewService::new(client);
        let project_id = Uuid::parse_str(PROJECT_ID).unwrap();

        let page = service.page(project_id, ReviewPageRequest::default()).await;

        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_by_project_orders_newest_first() {
        let client = Arc::new(MockTableClient::new().on_select(vec![review_row(4)]));
        let service = ReviewService::new(client.clone());
        let project_id = Uuid::parse_str(PROJECT_ID).unwrap();

        let reviews = service.by_project(project_id).await;

        assert_eq!(reviews.len(), 1);
        match &client.calls()[0] {
            ClientCall::Select(query) => {
                assert_eq!(query.order, vec![OrderBy::desc("created_at")]);
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }
}

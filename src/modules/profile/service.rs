use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::remote::{
    decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery,
};

use super::entity::{User, UserDraft, UserPatch};

pub struct UserService {
    client: Arc<dyn TableClient>,
}

impl UserService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Vec<User> {
        let query = TableQuery::new("users").order(OrderBy::desc("created_at"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(users) => users,
            Err(e) => {
                error!("Failed to list users: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        let query = TableQuery::new("users").filter(Filter::Eq("id".to_string(), json!(id)));
        match self.client.select_single(query).await.and_then(decode_row) {
            Ok(user) => Some(user),
            Err(e) => {
                error!("Failed to fetch user {}: {}", id, e);
                None
            }
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Option<User> {
        let query =
            TableQuery::new("users").filter(Filter::Eq("email".to_string(), json!(email)));
        match self.client.select_maybe_single(query).await {
            Ok(Some(row)) => match decode_row(row) {
                Ok(user) => Some(user),
                Err(e) => {
                    error!("Failed to decode user {}: {}", email, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Failed to fetch user {}: {}", email, e);
                None
            }
        }
    }

    pub async fn create(&self, draft: UserDraft) -> Option<User> {
        let row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize user draft: {}", e);
                return None;
            }
        };
        match self.client.insert("users", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create user: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Option<User> {
        let mut body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize user patch: {}", e);
                return None;
            }
        };
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("users", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update user {}: {}", id, e);
                None
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("users", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete user {}: {}", id, e);
                false
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<User> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(user) => Some(user),
        Err(e) => {
            error!("Failed to decode user row: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClientCall, MockTableClient};

    fn user_row() -> Value {
        json!({
            "id": "5d3f7e9a-1b2c-4d5e-8f90-123456789abc",
            "email": "admin@example.com",
            "name": "Admin",
        })
    }

    #[tokio::test]
    async fn test_list_orders_by_creation_time_desc() {
        let client = Arc::new(MockTableClient::new().on_select(vec![user_row()]));
        let service = UserService::new(client.clone());

        let users = service.list().await;

        assert_eq!(users.len(), 1);
        match &client.calls()[0] {
            ClientCall::Select(query) => {
                assert_eq!(query.order, vec![OrderBy::desc("created_at")]);
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_by_email_tolerates_missing_user() {
        let client = Arc::new(MockTableClient::new().on_select(vec![]));
        let service = UserService::new(client);

        let user = service.get_by_email("ghost@example.com").await;

        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let client = Arc::new(MockTableClient::new().on_write(vec![user_row()]));
        let service = UserService::new(client.clone());
        let id = Uuid::parse_str("5d3f7e9a-1b2c-4d5e-8f90-123456789abc").unwrap();

        let updated = service
            .update(
                id,
                UserPatch {
                    name: Some("New Name".to_string()),
                    ..UserPatch::default()
                },
            )
            .await;

        assert!(updated.is_some());
        match &client.calls()[0] {
            ClientCall::Update { patch, .. } => {
                assert_eq!(patch["name"], json!("New Name"));
                assert!(patch.get("updated_at").is_some());
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_failure_returns_empty_list() {
        let client = Arc::new(MockTableClient::new().fail_select("boom"));
        let service = UserService::new(client);

        let users = service.list().await;

        assert!(users.is_empty());
    }
}

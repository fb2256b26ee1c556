use serde_json::json;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::modules::remote::{decode_row, Filter, RemoteError, TableClient, TableQuery};

use super::entity::User;

/// The dashboard runs as one configured account. `Session` turns the
/// configured email into the backing user id once, on first use, and
/// memoizes it for the lifetime of the process.
pub struct Session {
    client: Arc<dyn TableClient>,
    email: String,
    user_id: OnceCell<Uuid>,
}

impl Session {
    pub fn new(client: Arc<dyn TableClient>, email: &str) -> Self {
        Self {
            client,
            email: email.to_string(),
            user_id: OnceCell::new(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Resolves (and caches) the id of the configured user. Concurrent first
    /// calls share one lookup.
    pub async fn user_id(&self) -> Result<Uuid, RemoteError> {
        self.user_id
            .get_or_try_init(|| async {
                let row = self
                    .client
                    .select_single(
                        TableQuery::new("users")
                            .filter(Filter::Eq("email".to_string(), json!(self.email))),
                    )
                    .await?;
                let user: User = decode_row(row)?;
                Ok(user.id)
            })
            .await
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClientCall, MockTableClient};
    use serde_json::json;

    fn user_row(id: &str) -> serde_json::Value {
        json!({"id": id, "email": "admin@example.com"})
    }

    #[tokio::test]
    async fn test_resolves_configured_user_once() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![user_row("5d3f7e9a-1b2c-4d5e-8f90-123456789abc")]),
        );
        let session = Session::new(client.clone(), "admin@example.com");

        let first = session.user_id().await.unwrap();
        let second = session.user_id().await.unwrap();

        assert_eq!(first, second);
        // The second call must hit the memoized value, not the backend.
        assert_eq!(client.calls().len(), 1);
        match &client.calls()[0] {
            ClientCall::Select(query) => {
                assert_eq!(query.table, "users");
                assert!(query
                    .filters
                    .contains(&Filter::Eq("email".to_string(), json!("admin@example.com"))));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_user_surfaces_no_rows() {
        let client = Arc::new(MockTableClient::new().on_select(vec![]));
        let session = Session::new(client, "ghost@example.com");

        let result = session.user_id().await;

        assert!(matches!(result, Err(RemoteError::NoRows)));
    }

    #[tokio::test]
    async fn test_failed_resolution_is_retried_next_call() {
        let client = Arc::new(
            MockTableClient::new()
                .fail_select("connection reset")
                .on_select(vec![user_row("5d3f7e9a-1b2c-4d5e-8f90-123456789abc")]),
        );
        let session = Session::new(client.clone(), "admin@example.com");

        assert!(session.user_id().await.is_err());
        assert!(session.user_id().await.is_ok());
        assert_eq!(client.calls().len(), 2);
    }
}

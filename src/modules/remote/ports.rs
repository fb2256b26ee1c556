use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::query::{Filter, TableQuery};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Expected exactly one row, found none")]
    NoRows,
    #[error("Expected exactly one row, found {0}")]
    MultipleRows(usize),
}

/// Result of a read that also requested an exact server-side count.
#[derive(Debug, Clone)]
pub struct CountedRows {
    pub rows: Vec<Value>,
    pub total: u64,
}

/// Table-scoped CRUD against the hosted backend. Rows cross this boundary as
/// raw JSON; entity modules own (de)serialization.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select(&self, query: TableQuery) -> Result<Vec<Value>, RemoteError>;

    async fn select_counted(&self, query: TableQuery) -> Result<CountedRows, RemoteError>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RemoteError>;

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: Vec<Filter>,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Insert-or-update keyed by the `on_conflict` column list.
    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, RemoteError>;

    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<(), RemoteError>;

    /// Errors unless the query matches exactly one row.
    async fn select_single(&self, query: TableQuery) -> Result<Value, RemoteError> {
        let mut rows = self.select(query).await?.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            (None, _) => Err(RemoteError::NoRows),
            (Some(_), Some(_)) => Err(RemoteError::MultipleRows(2 + rows.len())),
        }
    }

    /// Like `select_single` but tolerates zero rows.
    async fn select_maybe_single(&self, query: TableQuery) -> Result<Option<Value>, RemoteError> {
        let mut rows = self.select(query).await?.into_iter();
        match (rows.next(), rows.next()) {
            (first, None) => Ok(first),
            (Some(_), Some(_)) => Err(RemoteError::MultipleRows(2 + rows.len())),
            (None, Some(_)) => unreachable!(),
        }
    }
}

/// Object storage operations of the hosted backend.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Uploads and returns the stored object path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), RemoteError>;
}

pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, RemoteError> {
    serde_json::from_value(row).map_err(|e| RemoteError::Decode(e.to_string()))
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter().map(decode_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedClient {
        rows: Mutex<Vec<Value>>,
    }

    impl CannedClient {
        fn returning(rows: Vec<Value>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }
    }

    #[async_trait]
    impl TableClient for CannedClient {
        async fn select(&self, _query: TableQuery) -> Result<Vec<Value>, RemoteError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn select_counted(&self, _query: TableQuery) -> Result<CountedRows, RemoteError> {
            unimplemented!()
        }

        async fn insert(&self, _table: &str, _rows: Vec<Value>) -> Result<Vec<Value>, RemoteError> {
            unimplemented!()
        }

        async fn update(
            &self,
            _table: &str,
            _patch: Value,
            _filters: Vec<Filter>,
        ) -> Result<Vec<Value>, RemoteError> {
            unimplemented!()
        }

        async fn upsert(
            &self,
            _table: &str,
            _rows: Vec<Value>,
            _on_conflict: &str,
        ) -> Result<Vec<Value>, RemoteError> {
            unimplemented!()
        }

        async fn delete(&self, _table: &str, _filters: Vec<Filter>) -> Result<(), RemoteError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_select_single_exactly_one() {
        let client = CannedClient::returning(vec![json!({"id": 1})]);

        let row = client.select_single(TableQuery::new("users")).await;

        assert_eq!(row.unwrap(), json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_select_single_zero_rows_is_error() {
        let client = CannedClient::returning(vec![]);

        let result = client.select_single(TableQuery::new("users")).await;

        assert!(matches!(result, Err(RemoteError::NoRows)));
    }

    #[tokio::test]
    async fn test_select_single_many_rows_is_error() {
        let client = CannedClient::returning(vec![json!({"id": 1}), json!({"id": 2})]);

        let result = client.select_single(TableQuery::new("users")).await;

        assert!(matches!(result, Err(RemoteError::MultipleRows(2))));
    }

    #[tokio::test]
    async fn test_select_maybe_single_tolerates_zero() {
        let client = CannedClient::returning(vec![]);

        let result = client.select_maybe_single(TableQuery::new("users")).await;

        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_decode_rows_reports_field_errors() {
        let rows = vec![json!({"name": 42})];

        #[derive(serde::Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let result: Result<Vec<Named>, _> = decode_rows(rows);

        assert!(matches!(result, Err(RemoteError::Decode(_))));
    }
}

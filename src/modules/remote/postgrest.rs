use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::http::{HttpExec, RestMethod, RestRequest, RestResponse};
use super::ports::{CountedRows, RemoteError, TableClient};
use super::query::{Filter, TableQuery};

/// `TableClient` adapter speaking the hosted backend's PostgREST dialect.
pub struct PostgrestClient {
    exec: Arc<dyn HttpExec>,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub(crate) fn new(exec: Arc<dyn HttpExec>, base_url: &str, api_key: &str) -> Self {
        Self {
            exec,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            ("apikey".to_string(), self.api_key.clone()),
            (
                "authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("content-type".to_string(), "application/json".to_string()),
        ]
    }

    async fn send(&self, request: RestRequest) -> Result<RestResponse, RemoteError> {
        let response = self.exec.execute(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(RemoteError::Backend {
                status: response.status,
                message: error_message(&response.body),
            })
        }
    }

    async fn write(
        &self,
        method: RestMethod,
        table: &str,
        query: Vec<(String, String)>,
        extra_headers: Vec<(String, String)>,
        body: &Value,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut headers = self.base_headers();
        headers.push((
            "prefer".to_string(),
            "return=representation".to_string(),
        ));
        headers.extend(extra_headers);

        let payload =
            serde_json::to_vec(body).map_err(|e| RemoteError::Decode(e.to_string()))?;
        let response = self
            .send(RestRequest {
                method,
                url: self.table_url(table),
                query,
                headers,
                body: Some(payload),
            })
            .await?;
        decode_body(&response.body)
    }
}

/// PostgREST error bodies carry a `message` field; fall back to raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    String::from_utf8_lossy(body).trim().to_string()
}

fn decode_body(body: &[u8]) -> Result<Vec<Value>, RemoteError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Parses a `content-range` header of the form `0-9/57` or `*/0`.
fn parse_total(content_range: Option<&str>) -> Option<u64> {
    content_range?.rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl TableClient for PostgrestClient {
    async fn select(&self, query: TableQuery) -> Result<Vec<Value>, RemoteError> {
        let response = self
            .send(RestRequest {
                method: RestMethod::Get,
                url: self.table_url(&query.table),
                query: query.query_pairs(),
                headers: self.base_headers(),
                body: None,
            })
            .await?;
        decode_body(&response.body)
    }

    async fn select_counted(&self, query: TableQuery) -> Result<CountedRows, RemoteError> {
        let mut headers = self.base_headers();
        headers.push(("prefer".to_string(), "count=exact".to_string()));

        let response = self
            .send(RestRequest {
                method: RestMethod::Get,
                url: self.table_url(&query.table),
                query: query.query_pairs(),
                headers,
                body: None,
            })
            .await?;
        let rows = decode_body(&response.body)?;
        let total = parse_total(response.content_range.as_deref())
            .unwrap_or(rows.len() as u64);
        Ok(CountedRows { rows, total })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RemoteError> {
        self.write(
            RestMethod::Post,
            table,
            Vec::new(),
            Vec::new(),
            &Value::Array(rows),
        )
        .await
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: Vec<Filter>,
    ) -> Result<Vec<Value>, RemoteError> {
        let query = filters.iter().map(Filter::to_query_pair).collect();
        self.write(RestMethod::Patch, table, query, Vec::new(), &patch)
            .await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, RemoteError> {
        let query = vec![("on_conflict".to_string(), on_conflict.to_string())];
        let headers = vec![(
            "prefer".to_string(),
            "resolution=merge-duplicates".to_string(),
        )];
        self.write(RestMethod::Post, table, query, headers, &Value::Array(rows))
            .await
    }

    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<(), RemoteError> {
        let query = filters.iter().map(Filter::to_query_pair).collect();
        self.send(RestRequest {
            method: RestMethod::Delete,
            url: self.table_url(table),
            query,
            headers: self.base_headers(),
            body: None,
        })
        .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::http::{HttpExec, RestMethod, RestRequest};
use super::ports::{RemoteError, StorageClient};

/// `StorageClient` adapter for the hosted backend's object storage API.
pub struct SupabaseStorage {
    exec: Arc<dyn HttpExec>,
    base_url: String,
    api_key: String,
}

impl SupabaseStorage {
    pub(crate) fn new(exec: Arc<dyn HttpExec>, base_url: &str, api_key: &str) -> Self {
        Self {
            exec,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("apikey".to_string(), self.api_key.clone()),
            (
                "authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
        ]
    }
}

#[async_trait]
impl StorageClient for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), content_type.to_string()));
        headers.push(("cache-control".to_string(), "3600".to_string()));
        headers.push(("x-upsert".to_string(), "false".to_string()));

        let response = self
            .exec
            .execute(RestRequest {
                method: RestMethod::Post,
                url: format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path),
                query: Vec::new(),
                headers,
                body: Some(bytes),
            })
            .await?;
        if response.is_success() {
            Ok(path.to_string())
        } else {
            Err(RemoteError::Backend {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).trim().to_string(),
            })
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), RemoteError> {
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));

        let body = serde_json::to_vec(&json!({ "prefixes": paths }))
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let response = self
            .exec
            .execute(RestRequest {
                method: RestMethod::Delete,
                url: format!("{}/storage/v1/object/{}", self.base_url, bucket),
                query: Vec::new(),
                headers,
                body: Some(body),
            })
            .await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Backend {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::remote::http::RestResponse;
    use serde_json::Value;
    use std::sync::Mutex;

    struct FakeExec {
        requests: Mutex<Vec<RestRequest>>,
        status: u16,
    }

    impl FakeExec {
        fn with_status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status,
            })
        }
    }

    #[async_trait]
    impl HttpExec for FakeExec {
        async fn execute(&self, request: RestRequest) -> Result<RestResponse, RemoteError> {
            self.requests.lock().unwrap().push(request);
            Ok(RestResponse {
                status: self.status,
                content_range: None,
                body: Vec::new(),
            })
        }
    }

    fn storage(exec: &Arc<FakeExec>) -> SupabaseStorage {
        SupabaseStorage::new(
            exec.clone() as Arc<dyn HttpExec>,
            "https://example.supabase.co",
            "anon-key",
        )
    }

    #[tokio::test]
    async fn test_upload_returns_object_path() {
        let exec = FakeExec::with_status(200);
        let storage = storage(&exec);

        let path = storage
            .upload("images", "uploads/1_a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(path, "uploads/1_a.png");
        let request = &exec.requests.lock().unwrap()[0];
        assert_eq!(
            request.url,
            "https://example.supabase.co/storage/v1/object/images/uploads/1_a.png"
        );
        assert!(request
            .headers
            .contains(&("x-upsert".to_string(), "false".to_string())));
    }

    #[test]
    fn test_public_url_follows_convention() {
        let exec = FakeExec::with_status(200);
        let storage = storage(&exec);

        let url = storage.public_url("images", "uploads/1_a.png");

        assert_eq!(
            url,
            "https://example.supabase.co/storage/v1/object/public/images/uploads/1_a.png"
        );
    }

    #[tokio::test]
    async fn test_remove_sends_prefixes_body() {
        let exec = FakeExec::with_status(200);
        let storage = storage(&exec);

        storage
            .remove("images", &["uploads/1_a.png".to_string()])
            .await
            .unwrap();

        let request = &exec.requests.lock().unwrap()[0];
        assert_eq!(request.method, RestMethod::Delete);
        let body: Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"prefixes": ["uploads/1_a.png"]}));
    }

    #[tokio::test]
    async fn test_upload_failure_maps_to_backend_error() {
        let exec = FakeExec::with_status(403);
        let storage = storage(&exec);

        let result = storage
            .upload("images", "uploads/1_a.png", vec![], "image/png")
            .await;

        assert!(matches!(result, Err(RemoteError::Backend { status: 403, .. })));
    }
}

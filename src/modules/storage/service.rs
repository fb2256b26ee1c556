use chrono::Utc;
use std::sync::Arc;
use tracing::{error, warn};

use crate::modules::remote::StorageClient;

const PUBLIC_MARKER: &str = "/storage/v1/object/public/";

/// One file to store, as handed over by an upload form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct StorageService {
    storage: Arc<dyn StorageClient>,
    bucket: String,
}

impl StorageService {
    pub fn new(storage: Arc<dyn StorageClient>, bucket: &str) -> Self {
        Self {
            storage,
            bucket: bucket.to_string(),
        }
    }

    /// Stores the file under a timestamped object name and returns its public
    /// URL. The timestamp keeps repeated uploads of one file name distinct.
    pub async fn upload_public(&self, prefix: &str, file: UploadFile) -> Option<String> {
        let path = format!(
            "{}/{}_{}",
            prefix.trim_matches('/'),
            Utc::now().timestamp_millis(),
            file.name
        );
        match self
            .storage
            .upload(&self.bucket, &path, file.bytes, &file.content_type)
            .await
        {
            Ok(stored) => Some(self.storage.public_url(&self.bucket, &stored)),
            Err(e) => {
                error!("Failed to upload {}: {}", file.name, e);
                None
            }
        }
    }

    /// Sequential multi-upload; failed files are skipped, successes keep
    /// their order.
    pub async fn upload_many_public(
        &self,
        prefix: &str,
        files: Vec<UploadFile>,
    ) -> Vec<String> {
        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            if let Some(url) = self.upload_public(prefix, file).await {
                urls.push(url);
            }
        }
        urls
    }

    /// Deletes the object a public URL points at. URLs that do not follow the
    /// public-object convention are not deletable and cause no remote call.
    pub async fn delete_public_url(&self, url: &str) -> bool {
        let Some(marker_at) = url.find(PUBLIC_MARKER) else {
            warn!("Not a public storage URL, skipping delete: {}", url);
            return false;
        };
        let remainder = &url[marker_at + PUBLIC_MARKER.len()..];
        let Some((bucket, path)) = remainder.split_once('/') else {
            warn!("Public storage URL carries no object path: {}", url);
            return false;
        };
        if path.is_empty() {
            return false;
        }
        match self.storage.remove(bucket, &[path.to_string()]).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete {}: {}", url, e);
                false
            }
        }
    }
}

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::remote::{decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery};

use super::entity::{derive_slug, BlogPost, BlogPostDraft, BlogPostPatch, PostStatus};

pub struct BlogService {
    client: Arc<dyn TableClient>,
}

impl BlogService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Vec<BlogPost> {
        let query = TableQuery::new("blog_posts").order(OrderBy::desc("created_at"));
        self.collect(query).await
    }

    pub async fn published(&self) -> Vec<BlogPost> {
        let query = TableQuery::new("blog_posts")
            .filter(Filter::Eq("status".to_string(), json!(PostStatus::Published)))
            .order(OrderBy::desc("published_at"));
        self.collect(query).await
    }

    pub async fn by_tag(&self, tag: &str) -> Vec<BlogPost> {
        let query = TableQuery::new("blog_posts")
            .filter(Filter::Contains("tags".to_string(), vec![tag.to_string()]))
            .filter(Filter::Eq("status".to_string(), json!(PostStatus::Published)))
            .order(OrderBy::desc("published_at"));
        self.collect(query).await
    }

    pub async fn get(&self, id: Uuid) -> Option<BlogPost> {
        let query = TableQuery::new("blog_posts").filter(Filter::Eq("id".to_string(), json!(id)));
        match self.client.select_single(query).await.and_then(decode_row) {
            Ok(post) => Some(post),
            Err(e) => {
                error!("Failed to fetch post {}: {}", id, e);
                None
            }
        }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Option<BlogPost> {
        let query =
            TableQuery::new("blog_posts").filter(Filter::Eq("slug".to_string(), json!(slug)));
        match self.client.select_maybe_single(query).await {
            Ok(row) => row.and_then(|row| match decode_row(row) {
                Ok(post) => Some(post),
                Err(e) => {
                    error!("Failed to decode post {}: {}", slug, e);
                    None
                }
            }),
            Err(e) => {
                error!("Failed to fetch post {}: {}", slug, e);
                None
            }
        }
    }

    /// A missing slug is derived from the title.
    pub async fn create(&self, mut draft: BlogPostDraft) -> Option<BlogPost> {
        if draft.slug.as_deref().map_or(true, str::is_empty) {
            draft.slug = Some(derive_slug(&draft.title));
        }
        let row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize post draft: {}", e);
                return None;
            }
        };
        match self.client.insert("blog_posts", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create post: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: BlogPostPatch) -> Option<BlogPost> {
        let mut body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize post patch: {}", e);
                return None;
            }
        };
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        self.apply_update(id, body).await
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("blog_posts", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete post {}: {}", id, e);
                false
            }
        }
    }

    /// `draft → published`; stamps the publication time.
    pub async fn publish(&self, id: Uuid) -> Option<BlogPost> {
        let now = Utc::now();
        self.apply_update(
            id,
            json!({
                "status": PostStatus::Published,
                "published_at": now,
                "updated_at": now,
            }),
        )
        .await
    }

    /// `published → draft`; clears the publication time.
    pub async fn unpublish(&self, id: Uuid) -> Option<BlogPost> {
        self.apply_update(
            id,
            json!({
                "status": PostStatus::Draft,
                "published_at": null,
                "updated_at": Utc::now(),
            }),
        )
        .await
    }

    async fn apply_update(&self, id: Uuid, body: Value) -> Option<BlogPost> {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("blog_posts", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update post {}: {}", id, e);
                None
            }
        }
    }

    async fn collect(&self, query: TableQuery) -> Vec<BlogPost> {
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(posts) => posts,
            Err(e) => {
                error!("Failed to list posts: {}", e);
                Vec::new()
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<BlogPost> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(post) => Some(post),
        Err(e) => {
            error!("Failed to decode post row: {}", e);
            None
        }
    }
}

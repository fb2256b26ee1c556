use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{BlogPost, BlogPostDraft, BlogPostPatch};
use super::service::BlogService;

pub struct BlogStore {
    service: Arc<BlogService>,
    cache: QueryCache,
}

impl BlogStore {
    pub fn new(service: Arc<BlogService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("posts")
    }

    pub async fn posts(&self) -> QuerySnapshot<Vec<BlogPost>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn published(&self) -> QuerySnapshot<Vec<BlogPost>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("published"), move || {
                let service = service.clone();
                async move { Ok(service.published().await) }
            })
            .await
    }

    pub async fn post(&self, id: Uuid) -> QuerySnapshot<Option<BlogPost>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("detail").with(id), move || {
                let service = service.clone();
                async move { Ok(service.get(id).await) }
            })
            .await
    }

    pub async fn by_tag(&self, tag: &str) -> QuerySnapshot<Vec<BlogPost>> {
        let service = self.service.clone();
        let tag = tag.to_string();
        self.cache
            .query(Self::scope().with("tag").with(tag.as_str()), move || {
                let service = service.clone();
                let tag = tag.clone();
                async move { Ok(service.by_tag(&tag).await) }
            })
            .await
    }

    pub async fn create(&self, draft: BlogPostDraft) -> Option<BlogPost> {
        self.mutate(self.service.create(draft).await)
    }

    pub async fn update(&self, id: Uuid, patch: BlogPostPatch) -> Option<BlogPost> {
        self.mutate(self.service.update(id, patch).await)
    }

    pub async fn publish(&self, id: Uuid) -> Option<BlogPost> {
        self.mutate(self.service.publish(id).await)
    }

    pub async fn unpublish(&self, id: Uuid) -> Option<BlogPost> {
        self.mutate(self.service.unpublish(id).await)
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let deleted = self.service.delete(id).await;
        if deleted {
            self.cache.invalidate_prefix(&Self::scope());
        }
        deleted
    }

    fn mutate(&self, outcome: Option<BlogPost>) -> Option<BlogPost> {
        if outcome.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::cache::QueryCache;
    use crate::test_support::MockTableClient;
    use serde_json::json;

    const POST_ID: &str = "2c3d4e5f-6071-8293-a4b5-c6d7e8f90123";

    fn post_row(status: &str) -> serde_json::Value {
        json!({"id": POST_ID, "title": "Hello", "slug": "hello", "status": status})
    }

    #[tokio::test]
    async fn test_publish_invalidates_published_listing() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![])
                .on_write(vec![post_row("published")])
                .on_select(vec![post_row("published")]),
        );
        let store = BlogStore::new(
            Arc::new(BlogService::new(client.clone())),
            QueryCache::with_defaults(),
        );
        let id = Uuid::parse_str(POST_ID).unwrap();

        assert!(store.published().await.data.unwrap().is_empty());
        store.publish(id).await.unwrap();
        let after = store.published().await;

        assert_eq!(after.data.unwrap().len(), 1);
    }
}

use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{
    Review, ReviewDraft, ReviewPage, ReviewPageRequest, ReviewPatch, ReviewSort, ReviewStats,
};
use super::service::ReviewService;

pub struct ReviewStore {
    service: Arc<ReviewService>,
    cache: QueryCache,
}

impl ReviewStore {
    pub fn new(service: Arc<ReviewService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("reviews")
    }

    pub async fn by_project(&self, project_id: Uuid) -> QuerySnapshot<Vec<Review>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("project").with(project_id), move || {
                let service = service.clone();
                async move { Ok(service.by_project(project_id).await) }
            })
            .await
    }

    /// Each page/sort/filter combination caches under its own key, so paging
    /// back and forth does not refetch.
    pub async fn page(
        &self,
        project_id: Uuid,
        request: ReviewPageRequest,
    ) -> QuerySnapshot<ReviewPage> {
        let key = Self::scope()
            .with("page")
            .with(project_id)
            .with(i64::from(request.page))
            .with(i64::from(request.limit))
            .with(match request.sort_by {
                ReviewSort::Latest => "latest",
                ReviewSort::Rating => "rating",
            })
            .with(request.filter_type.clone().unwrap_or_default())
            .with(request.min_rating.unwrap_or(0));
        let service = self.service.clone();
        self.cache
            .query(key, move || {
                let service = service.clone();
                let request = request.clone();
                async move { Ok(service.page(project_id, request).await) }
            })
            .await
    }

    /// Pure aggregate over the project's cached review list.
    pub async fn stats(&self, project_id: Uuid) -> ReviewStats {
        let snapshot = self.by_project(project_id).await;
        snapshot
            .data
            .map(|reviews| ReviewStats::from_reviews(&reviews))
            .unwrap_or_default()
    }

    pub async fn create(&self, draft: ReviewDraft) -> Option<Review> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: ReviewPatch) -> Option<Review> {
        let updated = self.service.update(id, patch).await;
        if updated.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        updated
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let deleted = self.service.delete(id).await;
        if deleted {
            self.cache.invalidate_prefix(&Self::scope());
        }
        deleted
    }
}

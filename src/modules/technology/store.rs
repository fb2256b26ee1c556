use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{Technology, TechnologyDraft, TechnologyPatch};
use super::service::TechnologyService;

pub struct TechnologyStore {
    service: Arc<TechnologyService>,
    cache: QueryCache,
}

impl TechnologyStore {
    pub fn new(service: Arc<TechnologyService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("technologies")
    }

    pub async fn technologies(&self) -> QuerySnapshot<Vec<Technology>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn create(&self, draft: TechnologyDraft) -> Option<Technology> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: TechnologyPatch) -> Option<Technology> {
        let updated = self.service.update(id, patch).await;
        if updated.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
            // Flattened associations may carry the renamed technology.
            self.cache.invalidate_prefix(&QueryKey::scope("projects"));
        }
        updated
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let deleted = self.service.delete(id).await;
        if deleted {
            self.cache.invalidate_prefix(&Self::scope());
            self.cache.invalidate_prefix(&QueryKey::scope("projects"));
        }
        deleted
    }
}

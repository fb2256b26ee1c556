use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{CareerDraft, CareerEntry, CareerPatch};
use super::service::CareerService;

pub struct CareerStore {
    service: Arc<CareerService>,
    cache: QueryCache,
}

impl CareerStore {
    pub fn new(service: Arc<CareerService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("careers")
    }

    pub async fn entries(&self) -> QuerySnapshot<Vec<CareerEntry>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn create(&self, draft: CareerDraft) -> Option<CareerEntry> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: CareerPatch) -> Option<CareerEntry> {
        let updated = self.service.update(id, patch).await;
        if updated.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        updated
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.service.remove(id).await;
        if removed {
            self.cache.invalidate_prefix(&Self::scope());
        }
        removed
    }
}

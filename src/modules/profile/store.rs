use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{User, UserDraft, UserPatch};
use super::service::UserService;

/// Cache-aware facade over `UserService`.
pub struct ProfileStore {
    service: Arc<UserService>,
    cache: QueryCache,
}

impl ProfileStore {
    pub fn new(service: Arc<UserService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("users")
    }

    pub async fn users(&self) -> QuerySnapshot<Vec<User>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn user(&self, id: Uuid) -> QuerySnapshot<Option<User>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("detail").with(id), move || {
                let service = service.clone();
                async move { Ok(service.get(id).await) }
            })
            .await
    }

    pub async fn create(&self, draft: UserDraft) -> Option<User> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Option<User> {
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

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{CalendarEvent, EventDraft, EventPatch};
use super::service::{CalendarService, EventStats};

pub struct CalendarStore {
    service: Arc<CalendarService>,
    cache: QueryCache,
}

impl CalendarStore {
    pub fn new(service: Arc<CalendarService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("events")
    }

    pub async fn events(&self) -> QuerySnapshot<Vec<CalendarEvent>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn month(&self, year: i32, month: u32) -> QuerySnapshot<Vec<CalendarEvent>> {
        let service = self.service.clone();
        self.cache
            .query(
                Self::scope()
                    .with("month")
                    .with(i64::from(year))
                    .with(month),
                move || {
                    let service = service.clone();
                    async move { Ok(service.by_month(year, month).await) }
                },
            )
            .await
    }

    pub async fn range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QuerySnapshot<Vec<CalendarEvent>> {
        let service = self.service.clone();
        self.cache
            .query(
                Self::scope()
                    .with("range")
                    .with(from.timestamp())
                    .with(to.timestamp()),
                move || {
                    let service = service.clone();
                    async move { Ok(service.by_date_range(from, to).await) }
                },
            )
            .await
    }

    pub async fn by_project(&self, project_id: Uuid) -> QuerySnapshot<Vec<CalendarEvent>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("project").with(project_id), move || {
                let service = service.clone();
                async move { Ok(service.by_project(project_id).await) }
            })
            .await
    }

    pub async fn stats(&self) -> QuerySnapshot<EventStats> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("stats"), move || {
                let service = service.clone();
                async move { Ok(service.stats().await) }
            })
            .await
    }

    pub async fn create(&self, draft: EventDraft) -> Option<CalendarEvent> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: EventPatch) -> Option<CalendarEvent> {
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

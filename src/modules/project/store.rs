use std::sync::Arc;
use uuid::Uuid;

use crate::modules::cache::{QueryCache, QueryKey, QuerySnapshot};

use super::entity::{
    Project, ProjectDraft, ProjectPatch, ProjectStats, ProjectTemplate,
    ProjectWithTechnologies, TechnologySelection, TechnologyUsage,
};
use super::service::ProjectService;

/// Cache-aware facade over `ProjectService`: reads go through the query
/// cache, successful mutations invalidate the whole project scope.
pub struct ProjectStore {
    service: Arc<ProjectService>,
    cache: QueryCache,
}

impl ProjectStore {
    pub fn new(service: Arc<ProjectService>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    fn scope() -> QueryKey {
        QueryKey::scope("projects")
    }

    pub async fn projects(&self) -> QuerySnapshot<Vec<Project>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("list"), move || {
                let service = service.clone();
                async move { Ok(service.list().await) }
            })
            .await
    }

    pub async fn project(&self, id: Uuid) -> QuerySnapshot<Option<Project>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("detail").with(id), move || {
                let service = service.clone();
                async move { Ok(service.get(id).await) }
            })
            .await
    }

    pub async fn with_technologies(&self) -> QuerySnapshot<Vec<ProjectWithTechnologies>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("with-technologies"), move || {
                let service = service.clone();
                async move { Ok(service.list_with_technologies().await) }
            })
            .await
    }

    pub async fn technologies_of(&self, project_id: Uuid) -> QuerySnapshot<Vec<TechnologyUsage>> {
        let service = self.service.clone();
        self.cache
            .query(
                Self::scope().with("technologies").with(project_id),
                move || {
                    let service = service.clone();
                    async move { Ok(service.technologies_of(project_id).await) }
                },
            )
            .await
    }

    pub async fn stats(&self) -> QuerySnapshot<ProjectStats> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("stats"), move || {
                let service = service.clone();
                async move { Ok(service.stats().await) }
            })
            .await
    }

    pub async fn templates(&self) -> QuerySnapshot<Vec<ProjectTemplate>> {
        let service = self.service.clone();
        self.cache
            .query(Self::scope().with("templates"), move || {
                let service = service.clone();
                async move { Ok(service.templates().await) }
            })
            .await
    }

    pub async fn create(&self, draft: ProjectDraft) -> Option<Project> {
        let created = self.service.create(draft).await;
        if created.is_some() {
            self.cache.invalidate_prefix(&Self::scope());
        }
        created
    }

    pub async fn update(&self, id: Uuid, patch: ProjectPatch) -> Option<Project> {
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

    pub async fn add_technology(
        &self,
        project_id: Uuid,
        technology_id: Uuid,
        usage_description: Option<&str>,
    ) -> bool {
        let ok = self
            .service
            .add_technology(project_id, technology_id, usage_description)
            .await;
        if ok {
            self.cache.invalidate_prefix(&Self::scope());
        }
        ok
    }

    pub async fn set_technologies(
        &self,
        project_id: Uuid,
        desired: Vec<TechnologySelection>,
    ) -> bool {
        let ok = self.service.set_technologies(project_id, desired).await;
        if ok {
            self.cache.invalidate_prefix(&Self::scope());
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::cache::QueryCache;
    use crate::modules::profile::Session;
    use crate::test_support::MockTableClient;
    use serde_json::json;

    const PROJECT_ID: &str = "7e3f4b9c-41c8-4b9e-9a35-0af1f6f9f6de";

    fn project_row(title: &str) -> serde_json::Value {
        json!({"id": PROJECT_ID, "title": title, "status": "planned"})
    }

    fn store(client: Arc<MockTableClient>) -> ProjectStore {
        let session = Arc::new(Session::new(client.clone(), "admin@example.com"));
        let service = Arc::new(ProjectService::new(client, session));
        ProjectStore::new(service, QueryCache::with_defaults())
    }

    #[tokio::test]
    async fn test_projects_read_is_cached() {
        let client = Arc::new(MockTableClient::new().on_select(vec![project_row("One")]));
        let store = store(client.clone());

        store.projects().await;
        store.projects().await;

        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_list_and_detail() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![project_row("Old")])
                .on_write(vec![project_row("New")])
                .on_select(vec![project_row("New")]),
        );
        let store = store(client.clone());
        let id = Uuid::parse_str(PROJECT_ID).unwrap();

        store.projects().await;
        store
            .update(
                id,
                ProjectPatch {
                    title: Some("New".to_string()),
                    ..ProjectPatch::default()
                },
            )
            .await
            .unwrap();
        let after = store.projects().await;

        assert_eq!(after.data.unwrap()[0].title, "New");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_cache_intact() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![project_row("One")])
                .fail_delete("boom"),
        );
        let store = store(client.clone());
        let id = Uuid::parse_str(PROJECT_ID).unwrap();

        store.projects().await;
        assert!(!store.delete(id).await);
        store.projects().await;

        // Initial select, failed delete; the second read stayed cached.
        assert_eq!(client.calls().len(), 2);
    }
}

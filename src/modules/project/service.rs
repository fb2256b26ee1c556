use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::profile::Session;
use crate::modules::remote::{
    decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery,
};
use crate::modules::technology::Technology;

use super::entity::{
    Project, ProjectDraft, ProjectPatch, ProjectStats, ProjectStatus, ProjectTemplate,
    ProjectWithTechnologies, TechnologySelection, TechnologyUsage,
};

pub struct ProjectService {
    client: Arc<dyn TableClient>,
    session: Arc<Session>,
}

/// Embedded-resource shape of one `project_technologies` row.
#[derive(Deserialize)]
struct AssociationRow {
    #[serde(default)]
    usage_description: Option<String>,
    technologies: Technology,
}

#[derive(Deserialize)]
struct AssociationId {
    technology_id: Uuid,
}

#[derive(Deserialize)]
struct StatusRow {
    status: ProjectStatus,
}

impl ProjectService {
    pub fn new(client: Arc<dyn TableClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    pub async fn list(&self) -> Vec<Project> {
        let query = TableQuery::new("projects")
            .order(OrderBy::asc("start_date"))
            .order(OrderBy::asc("end_date"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(projects) => projects,
            Err(e) => {
                error!("Failed to list projects: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Project> {
        let query = TableQuery::new("projects").filter(Filter::Eq("id".to_string(), json!(id)));
        match self.client.select_single(query).await.and_then(decode_row) {
            Ok(project) => Some(project),
            Err(e) => {
                error!("Failed to fetch project {}: {}", id, e);
                None
            }
        }
    }

    /// The backend assigns the id; the configured session user becomes the
    /// owner.
    pub async fn create(&self, draft: ProjectDraft) -> Option<Project> {
        let user_id = match self.session.user_id().await {
            Ok(user_id) => user_id,
            Err(e) => {
                error!("Failed to resolve session user: {}", e);
                return None;
            }
        };
        let mut row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize project draft: {}", e);
                return None;
            }
        };
        if let Some(fields) = row.as_object_mut() {
            fields.insert("user_id".to_string(), json!(user_id));
        }
        match self.client.insert("projects", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create project: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: ProjectPatch) -> Option<Project> {
        let mut body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize project patch: {}", e);
                return None;
            }
        };
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("projects", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update project {}: {}", id, e);
                None
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("projects", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete project {}: {}", id, e);
                false
            }
        }
    }

    /// Technologies attached to one project, flattened out of the embedded
    /// join rows.
    pub async fn technologies_of(&self, project_id: Uuid) -> Vec<TechnologyUsage> {
        let query = TableQuery::new("project_technologies")
            .columns("usage_description, technologies(id, name, category, icon_url, created_at)")
            .filter(Filter::Eq("project_id".to_string(), json!(project_id)));
        let rows: Result<Vec<AssociationRow>, _> =
            self.client.select(query).await.and_then(decode_rows);
        match rows {
            Ok(rows) => rows
                .into_iter()
                .map(|row| TechnologyUsage {
                    technology: row.technologies,
                    usage_description: row.usage_description,
                })
                .collect(),
            Err(e) => {
                error!(
                    "Failed to fetch technologies of project {}: {}",
                    project_id, e
                );
                Vec::new()
            }
        }
    }

    /// Best-effort single attachment; `set_technologies` is the authoritative
    /// replacement path.
    pub async fn add_technology(
        &self,
        project_id: Uuid,
        technology_id: Uuid,
        usage_description: Option<&str>,
    ) -> bool {
        let row = json!({
            "project_id": project_id,
            "technology_id": technology_id,
            "usage_description": usage_description,
        });
        match self.client.insert("project_technologies", vec![row]).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to attach technology {} to project {}: {}",
                    technology_id, project_id, e
                );
                false
            }
        }
    }

    /// Replaces the project's technology set with `desired`: associations no
    /// longer wanted are deleted in one call, the wanted set is upserted
    /// keyed by (project_id, technology_id) so usage notes update in place.
    pub async fn set_technologies(
        &self,
        project_id: Uuid,
        desired: Vec<TechnologySelection>,
    ) -> bool {
        let current_query = TableQuery::new("project_technologies")
            .columns("technology_id")
            .filter(Filter::Eq("project_id".to_string(), json!(project_id)));
        let current: Vec<AssociationId> =
            match self.client.select(current_query).await.and_then(decode_rows) {
                Ok(rows) => rows,
                Err(e) => {
                    error!(
                        "Failed to fetch current technologies of project {}: {}",
                        project_id, e
                    );
                    return false;
                }
            };

        let desired_ids: HashSet<Uuid> =
            desired.iter().map(|s| s.technology_id).collect();
        let removed: Vec<Value> = current
            .iter()
            .filter(|row| !desired_ids.contains(&row.technology_id))
            .map(|row| json!(row.technology_id))
            .collect();

        if !removed.is_empty() {
            let filters = vec![
                Filter::Eq("project_id".to_string(), json!(project_id)),
                Filter::In("technology_id".to_string(), removed),
            ];
            if let Err(e) = self.client.delete("project_technologies", filters).await {
                error!(
                    "Failed to remove technologies from project {}: {}",
                    project_id, e
                );
                return false;
            }
        }

        if !desired.is_empty() {
            let rows: Vec<Value> = desired
                .iter()
                .map(|selection| {
                    json!({
                        "project_id": project_id,
                        "technology_id": selection.technology_id,
                        "usage_description": selection.usage_description,
                    })
                })
                .collect();
            if let Err(e) = self
                .client
                .upsert("project_technologies", rows, "project_id,technology_id")
                .await
            {
                error!(
                    "Failed to upsert technologies of project {}: {}",
                    project_id, e
                );
                return false;
            }
        }
        true
    }

    /// Project list with each project's technologies fetched concurrently.
    pub async fn list_with_technologies(&self) -> Vec<ProjectWithTechnologies> {
        let projects = self.list().await;
        let technologies = join_all(
            projects
                .iter()
                .map(|project| self.technologies_of(project.id)),
        )
        .await;
        projects
            .into_iter()
            .zip(technologies)
            .map(|(project, technologies)| ProjectWithTechnologies {
                project,
                technologies,
            })
            .collect()
    }

    pub async fn stats(&self) -> ProjectStats {
        let query = TableQuery::new("projects").columns("status");
        let rows: Result<Vec<StatusRow>, _> =
            self.client.select(query).await.and_then(decode_rows);
        match rows {
            Ok(rows) => {
                let mut stats = ProjectStats {
                    total: rows.len() as u64,
                    ..ProjectStats::default()
                };
                for row in rows {
                    *stats.by_status.entry(row.status).or_insert(0) += 1;
                }
                stats
            }
            Err(e) => {
                error!("Failed to fetch project stats: {}", e);
                ProjectStats::default()
            }
        }
    }

    /// Active templates, default template first.
    pub async fn templates(&self) -> Vec<ProjectTemplate> {
        let query = TableQuery::new("project_templates")
            .filter(Filter::Eq("is_active".to_string(), json!(true)))
            .order(OrderBy::desc("is_default"))
            .order(OrderBy::asc("name"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(templates) => templates,
            Err(e) => {
                error!("Failed to list project templates: {}", e);
                Vec::new()
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<Project> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(project) => Some(project),
        Err(e) => {
            error!("Failed to decode project row: {}", e);
            None
        }
    }
}

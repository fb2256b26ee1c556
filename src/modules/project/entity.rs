use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::modules::technology::Technology;
use crate::shared::media;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
    OnHold,
}

/// Structured detail blob stored as JSON on the project row. Versioned so the
/// shape can evolve; deserialization is lenient and a malformed blob reads as
/// absent rather than failing the whole row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
    /// Markdown body shown on the project page.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProjectDetail {
    /// Explicit thumbnail, else the first gallery image; relative values are
    /// rewritten under the assets root.
    pub fn thumbnail_url(&self) -> Option<String> {
        media::thumbnail_url(self.thumbnail.as_deref(), &self.images)
    }
}

fn lenient_detail<'de, D>(deserializer: D) -> Result<Option<ProjectDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|blob| serde_json::from_value(blob).ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_detail")]
    pub detail: Option<ProjectDetail>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn thumbnail_url(&self) -> Option<String> {
        self.detail.as_ref().and_then(ProjectDetail::thumbnail_url)
    }
}

/// Fields a caller supplies when creating a project; the backend assigns the
/// identity and the service fills in the owner.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProjectDetail>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProjectDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
}

/// One technology attached to a project, with the per-association usage note.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyUsage {
    pub technology: Technology,
    pub usage_description: Option<String>,
}

/// Desired association when replacing a project's technology set.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologySelection {
    pub technology_id: Uuid,
    pub usage_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWithTechnologies {
    pub project: Project,
    pub technologies: Vec<TechnologyUsage>,
}

/// Per-status project counts for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStats {
    pub total: u64,
    pub by_status: HashMap<ProjectStatus, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_detail")]
    pub detail: Option<ProjectDetail>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
}

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::modules::blog::{BlogPost, PostStatus};
use crate::modules::project::Project;
use crate::modules::remote::{decode_rows, Filter, RemoteError, TableClient, TableQuery};
use crate::modules::technology::Technology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEntity {
    Project,
    BlogPost,
    Technology,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entity: SearchEntity,
    pub id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub post_status: Option<PostStatus>,
    pub tag: Option<String>,
}

/// Cross-entity term search. Unlike the entity services this one propagates
/// remote errors: the cache retains them per key and the palette UI shows
/// the failure next to the last good result set.
pub struct SearchService {
    client: Arc<dyn TableClient>,
    per_type_limit: u32,
}

impl SearchService {
    pub fn new(client: Arc<dyn TableClient>, per_type_limit: u32) -> Self {
        Self {
            client,
            per_type_limit,
        }
    }

    pub async fn search(
        &self,
        term: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchHit>, RemoteError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", term);

        let (projects, posts, technologies) = tokio::try_join!(
            self.projects(&pattern),
            self.posts(&pattern, filters),
            self.technologies(&pattern),
        )?;

        let mut hits = projects;
        hits.extend(posts);
        hits.extend(technologies);
        Ok(hits)
    }

    async fn projects(&self, pattern: &str) -> Result<Vec<SearchHit>, RemoteError> {
        let query = TableQuery::new("projects")
            .filter(Filter::Ilike("title".to_string(), pattern.to_string()))
            .limit(self.per_type_limit);
        let projects: Vec<Project> = decode_rows(self.client.select(query).await?)?;
        Ok(projects
            .into_iter()
            .map(|project| SearchHit {
                entity: SearchEntity::Project,
                id: project.id,
                title: project.title.clone(),
                slug: None,
                thumbnail: project.thumbnail_url(),
            })
            .collect())
    }

    async fn posts(
        &self,
        pattern: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchHit>, RemoteError> {
        let mut query = TableQuery::new("blog_posts")
            .filter(Filter::Or(vec![
                Filter::Ilike("title".to_string(), pattern.to_string()),
                Filter::Ilike("slug".to_string(), pattern.to_string()),
            ]))
            .limit(self.per_type_limit);
        if let Some(status) = filters.post_status {
            query = query.filter(Filter::Eq("status".to_string(), json!(status)));
        }
        if let Some(tag) = &filters.tag {
            query = query.filter(Filter::Contains("tags".to_string(), vec![tag.clone()]));
        }
        let posts: Vec<BlogPost> = decode_rows(self.client.select(query).await?)?;
        Ok(posts
            .into_iter()
            .map(|post| SearchHit {
                entity: SearchEntity::BlogPost,
                id: post.id,
                title: post.title,
                slug: Some(post.slug),
                thumbnail: None,
            })
            .collect())
    }

    async fn technologies(&self, pattern: &str) -> Result<Vec<SearchHit>, RemoteError> {
        let query = TableQuery::new("technologies")
            .filter(Filter::Ilike("name".to_string(), pattern.to_string()))
            .limit(self.per_type_limit);
        let technologies: Vec<Technology> = decode_rows(self.client.select(query).await?)?;
        Ok(technologies
            .into_iter()
            .map(|technology| SearchHit {
                entity: SearchEntity::Technology,
                id: technology.id,
                title: technology.name,
                slug: None,
                thumbnail: technology.icon_url,
            })
            .collect())
    }
}

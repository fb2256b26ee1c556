use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::profile::Session;
use crate::modules::remote::{decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery};

use super::entity::{CareerDraft, CareerEntry, CareerPatch};

pub struct CareerService {
    client: Arc<dyn TableClient>,
    session: Arc<Session>,
}

impl CareerService {
    pub fn new(client: Arc<dyn TableClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    /// Career history of the configured user, oldest position first.
    pub async fn list(&self) -> Vec<CareerEntry> {
        let user_id = match self.session.user_id().await {
            Ok(user_id) => user_id,
            Err(e) => {
                error!("Failed to resolve session user: {}", e);
                return Vec::new();
            }
        };
        let query = TableQuery::new("career_timeline")
            .filter(Filter::Eq("user_id".to_string(), json!(user_id)))
            .order(OrderBy::asc("start_date"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list career entries: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn create(&self, draft: CareerDraft) -> Option<CareerEntry> {
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
                error!("Failed to serialize career draft: {}", e);
                return None;
            }
        };
        if let Some(fields) = row.as_object_mut() {
            fields.insert("user_id".to_string(), json!(user_id));
        }
        match self.client.insert("career_timeline", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create career entry: {}", e);
                None
            }
        }
    }

    // career_timeline carries no updated_at column, so nothing gets stamped.
    pub async fn update(&self, id: Uuid, patch: CareerPatch) -> Option<CareerEntry> {
        let body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize career patch: {}", e);
                return None;
            }
        };
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("career_timeline", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update career entry {}: {}", id, e);
                None
            }
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("career_timeline", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete career entry {}: {}", id, e);
                false
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<CareerEntry> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(entry) => Some(entry),
        Err(e) => {
            error!("Failed to decode career row: {}", e);
            None
        }
    }
}

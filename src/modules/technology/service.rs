use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::remote::{decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery};

use super::entity::{
    normalized_category, normalized_color, Technology, TechnologyDraft, TechnologyPatch,
};

pub struct TechnologyService {
    client: Arc<dyn TableClient>,
}

impl TechnologyService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Vec<Technology> {
        let query = TableQuery::new("technologies").order(OrderBy::asc("created_at"));
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(technologies) => technologies,
            Err(e) => {
                error!("Failed to list technologies: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn create(&self, mut draft: TechnologyDraft) -> Option<Technology> {
        draft.category = normalized_category(draft.category.as_deref());
        draft.color = normalized_color(draft.color.as_deref());
        let row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize technology draft: {}", e);
                return None;
            }
        };
        match self.client.insert("technologies", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create technology: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, mut patch: TechnologyPatch) -> Option<Technology> {
        if let Some(category) = patch.category.take() {
            patch.category = Some(normalized_category(category.as_deref()));
        }
        if let Some(color) = patch.color.take() {
            patch.color = Some(normalized_color(color.as_deref()));
        }
        let body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize technology patch: {}", e);
                return None;
            }
        };
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("technologies", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update technology {}: {}", id, e);
                None
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("technologies", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete technology {}: {}", id, e);
                false
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<Technology> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(technology) => Some(technology),
        Err(e) => {
            error!("Failed to decode technology row: {}", e);
            None
        }
    }
}

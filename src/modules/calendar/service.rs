use chrono::{DateTime, Datelike, Days, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::modules::remote::{decode_row, decode_rows, Filter, OrderBy, TableClient, TableQuery};

use super::entity::{month_window, CalendarEvent, EventDraft, EventPatch};

/// Event counts per `event_type` for the calendar sidebar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStats {
    pub total: u64,
    pub by_type: HashMap<String, u64>,
}

#[derive(Deserialize)]
struct TypeRow {
    #[serde(default)]
    event_type: Option<String>,
}

pub struct CalendarService {
    client: Arc<dyn TableClient>,
}

impl CalendarService {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Vec<CalendarEvent> {
        let query = TableQuery::new("project_schedules").order(OrderBy::asc("created_at"));
        self.collect(query, "list events").await
    }

    /// Union of closed events overlapping `[from, to]` and open-ended events
    /// starting inside it, sorted by start time.
    pub async fn by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<CalendarEvent> {
        let closed = TableQuery::new("project_schedules")
            .filter(Filter::NotNull("end_time".to_string()))
            .filter(Filter::Lte("start_time".to_string(), json!(to)))
            .filter(Filter::Gte("end_time".to_string(), json!(from)));
        let open = TableQuery::new("project_schedules")
            .filter(Filter::IsNull("end_time".to_string()))
            .filter(Filter::Gte("start_time".to_string(), json!(from)))
            .filter(Filter::Lte("start_time".to_string(), json!(to)));

        let (closed, open) = tokio::join!(
            self.collect(closed, "fetch ranged events"),
            self.collect(open, "fetch open-ended events"),
        );

        let mut events = closed;
        events.extend(open);
        events.sort_by_key(|event| event.start_time);
        events
    }

    pub async fn by_month(&self, year: i32, month: u32) -> Vec<CalendarEvent> {
        match month_window(year, month) {
            Some((from, to)) => self.by_date_range(from, to).await,
            None => {
                error!("Invalid calendar month: {}-{}", year, month);
                Vec::new()
            }
        }
    }

    pub async fn today(&self) -> Vec<CalendarEvent> {
        let date = Utc::now().date_naive();
        self.day_span(date, date).await
    }

    pub async fn this_week(&self) -> Vec<CalendarEvent> {
        let today = Utc::now().date_naive();
        let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        let sunday = monday + Days::new(6);
        self.day_span(monday, sunday).await
    }

    pub async fn get(&self, id: Uuid) -> Option<CalendarEvent> {
        let query =
            TableQuery::new("project_schedules").filter(Filter::Eq("id".to_string(), json!(id)));
        match self.client.select_single(query).await.and_then(decode_row) {
            Ok(event) => Some(event),
            Err(e) => {
                error!("Failed to fetch event {}: {}", id, e);
                None
            }
        }
    }

    pub async fn by_project(&self, project_id: Uuid) -> Vec<CalendarEvent> {
        let query = TableQuery::new("project_schedules")
            .filter(Filter::Eq("project_id".to_string(), json!(project_id)))
            .order(OrderBy::asc("start_time"));
        self.collect(query, "fetch project events").await
    }

    pub async fn create(&self, draft: EventDraft) -> Option<CalendarEvent> {
        let row = match serde_json::to_value(&draft) {
            Ok(row) => row,
            Err(e) => {
                error!("Failed to serialize event draft: {}", e);
                return None;
            }
        };
        match self.client.insert("project_schedules", vec![row]).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to create event: {}", e);
                None
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: EventPatch) -> Option<CalendarEvent> {
        let mut body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize event patch: {}", e);
                return None;
            }
        };
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.update("project_schedules", body, filters).await {
            Ok(rows) => first_row(rows),
            Err(e) => {
                error!("Failed to update event {}: {}", id, e);
                None
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let filters = vec![Filter::Eq("id".to_string(), json!(id))];
        match self.client.delete("project_schedules", filters).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete event {}: {}", id, e);
                false
            }
        }
    }

    pub async fn stats(&self) -> EventStats {
        let query = TableQuery::new("project_schedules").columns("event_type");
        let rows: Result<Vec<TypeRow>, _> = self.client.select(query).await.and_then(decode_rows);
        match rows {
            Ok(rows) => {
                let mut stats = EventStats {
                    total: rows.len() as u64,
                    ..EventStats::default()
                };
                for row in rows {
                    // Untyped rows count as plain tasks.
                    let key = row.event_type.unwrap_or_else(|| "task".to_string());
                    *stats.by_type.entry(key).or_insert(0) += 1;
                }
                stats
            }
            Err(e) => {
                error!("Failed to fetch event stats: {}", e);
                EventStats::default()
            }
        }
    }

    async fn day_span(
        &self,
        first: chrono::NaiveDate,
        last: chrono::NaiveDate,
    ) -> Vec<CalendarEvent> {
        let (Some(from), Some(to)) = (
            first.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            last.and_hms_opt(23, 59, 59).map(|dt| dt.and_utc()),
        ) else {
            return Vec::new();
        };
        self.by_date_range(from, to).await
    }

    async fn collect(&self, query: TableQuery, what: &str) -> Vec<CalendarEvent> {
        match self.client.select(query).await.and_then(decode_rows) {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to {}: {}", what, e);
                Vec::new()
            }
        }
    }
}

fn first_row(rows: Vec<Value>) -> Option<CalendarEvent> {
    let row = rows.into_iter().next()?;
    match decode_row(row) {
        Ok(event) => Some(event),
        Err(e) => {
            error!("Failed to decode event row: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClientCall, MockTableClient};
    use maplit::hashmap;

    const EVENT_ID: &str = "3d4e5f60-7182-93a4-b5c6-d7e8f9012345";

    fn event_row(id: &str, start: &str, end: Option<&str>) -> Value {
        json!({
            "id": id,
            "title": "Milestone",
            "start_time": start,
            "end_time": end,
        })
    }

    #[tokio::test]
    async fn test_date_range_unions_closed_and_open_events() {
        let client = Arc::new(
            MockTableClient::new()
                .on_select(vec![event_row(
                    EVENT_ID,
                    "2025-01-10T09:00:00Z",
                    Some("2025-01-12T17:00:00Z"),
                )])
                .on_select(vec![event_row(
                    "4e5f6071-8293-a4b5-c6d7-e8f901234567",
                    "2025-01-05T09:00:00Z",
                    None,
                )]),
        );
        let service = CalendarService::new(client.clone());

        let events = service
            .by_date_range(
                "2025-01-01T00:00:00Z".parse().unwrap(),
                "2025-01-31T23:59:59Z".parse().unwrap(),
            )
            .await;

        // Sorted by start time: the open-ended event starts first.
        assert_eq!(events.len(), 2);
        assert!(events[0].end_time.is_none());
        assert!(events[1].end_time.is_some());

        let calls = client.calls();
        match &calls[0] {
            ClientCall::Select(query) => {
                assert!(query
                    .filters
                    .contains(&Filter::NotNull("end_time".to_string())));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
        match &calls[1] {
            ClientCall::Select(query) => {
                assert!(query.filters.contains(&Filter::IsNull("end_time".to_string())));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overlap_bounds_are_inclusive() {
        let client = Arc::new(MockTableClient::new().on_select(vec![]).on_select(vec![]));
        let service = CalendarService::new(client.clone());
        let from: DateTime<Utc> = "2025-01-11T00:00:00Z".parse().unwrap();
        let to: DateTime<Utc> = "2025-01-20T23:59:59Z".parse().unwrap();

        service.by_date_range(from, to).await;

        match &client.calls()[0] {
            ClientCall::Select(query) => {
                // start <= to AND end >= from.
                assert!(query
                    .filters
                    .contains(&Filter::Lte("start_time".to_string(), json!(to))));
                assert!(query
                    .filters
                    .contains(&Filter::Gte("end_time".to_string(), json!(from))));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_by_month_uses_padded_window() {
        let client = Arc::new(MockTableClient::new().on_select(vec![]).on_select(vec![]));
        let service = CalendarService::new(client.clone());

        service.by_month(2025, 3).await;

        match &client.calls()[0] {
            ClientCall::Select(query) => {
                let to: DateTime<Utc> = "2025-04-01T23:59:59Z".parse().unwrap();
                assert!(query
                    .filters
                    .contains(&Filter::Lte("start_time".to_string(), json!(to))));
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_month_returns_empty_without_calls() {
        let client = Arc::new(MockTableClient::new());
        let service = CalendarService::new(client.clone());

        let events = service.by_month(2025, 13).await;

        assert!(events.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stats_counts_untyped_events_as_tasks() {
        let client = Arc::new(MockTableClient::new().on_select(vec![
            json!({"event_type": "meeting"}),
            json!({"event_type": "meeting"}),
            json!({"event_type": null}),
        ]));
        let service = CalendarService::new(client);

        let stats = service.stats().await;

        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_type,
            hashmap! {
                "meeting".to_string() => 2,
                "task".to_string() => 1,
            }
        );
    }

    #[tokio::test]
    async fn test_by_project_orders_by_start() {
        let client = Arc::new(MockTableClient::new().on_select(vec![]));
        let service = CalendarService::new(client.clone());
        let project_id = Uuid::parse_str("7e3f4b9c-41c8-4b9e-9a35-0af1f6f9f6de").unwrap();

        service.by_project(project_id).await;

        match &client.calls()[0] {
            ClientCall::Select(query) => {
                assert_eq!(query.order, vec![OrderBy::asc("start_time")]);
            }
            other => panic!("Unexpected call: {:?}", other),
        }
    }
}

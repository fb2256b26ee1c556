use serde_json::Value;

/// A single predicate in the hosted backend's filter grammar.
///
/// String patterns for `Ilike` are passed through verbatim, so callers wrap
/// their term in `%` themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Lte(String, Value),
    Gte(String, Value),
    IsNull(String),
    NotNull(String),
    Ilike(String, String),
    /// Array-column membership: every listed element must be contained.
    Contains(String, Vec<String>),
    /// Scalar-column set membership.
    In(String, Vec<Value>),
    /// Logical OR over the nested filters (nested `Or` is not supported).
    Or(Vec<Filter>),
}

impl Filter {
    pub(crate) fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Or(parts) => {
                let rendered: Vec<String> =
                    parts.iter().map(|f| f.to_inline_condition()).collect();
                ("or".to_string(), format!("({})", rendered.join(",")))
            }
            other => {
                let (column, condition) = other.split_condition();
                (column, condition)
            }
        }
    }

    /// `column.op.value` form used inside an `or=(...)` group.
    fn to_inline_condition(&self) -> String {
        let (column, condition) = self.split_condition();
        format!("{column}.{condition}")
    }

    fn split_condition(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", literal(value))),
            Filter::Lte(column, value) => (column.clone(), format!("lte.{}", literal(value))),
            Filter::Gte(column, value) => (column.clone(), format!("gte.{}", literal(value))),
            Filter::IsNull(column) => (column.clone(), "is.null".to_string()),
            Filter::NotNull(column) => (column.clone(), "not.is.null".to_string()),
            Filter::Ilike(column, pattern) => (column.clone(), format!("ilike.{pattern}")),
            Filter::Contains(column, elements) => {
                (column.clone(), format!("cs.{{{}}}", elements.join(",")))
            }
            Filter::In(column, values) => {
                let rendered: Vec<String> = values.iter().map(literal).collect();
                (column.clone(), format!("in.({})", rendered.join(",")))
            }
            Filter::Or(_) => unreachable!("Or is rendered by to_query_pair"),
        }
    }
}

/// Renders a JSON value as a filter literal. Strings are passed raw; the HTTP
/// layer percent-encodes the final query string.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
    pub nulls_last: bool,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
            nulls_last: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
            nulls_last: false,
        }
    }

    pub fn desc_nulls_last(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
            nulls_last: true,
        }
    }

    fn render(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        if self.nulls_last {
            format!("{}.{}.nullslast", self.column, direction)
        } else {
            format!("{}.{}", self.column, direction)
        }
    }
}

/// A table-scoped read request: projection, filters, ordering and an optional
/// inclusive row window for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<u32>,
    pub window: Option<(u32, u32)>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            window: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Inclusive row window `from..=to` (zero-based).
    pub fn window(mut self, from: u32, to: u32) -> Self {
        self.window = Some((from, to));
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        for filter in &self.filters {
            pairs.push(filter.to_query_pair());
        }
        if !self.order.is_empty() {
            let rendered: Vec<String> = self.order.iter().map(OrderBy::render).collect();
            pairs.push(("order".to_string(), rendered.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some((from, to)) = self.window {
            pairs.push(("offset".to_string(), from.to_string()));
            pairs.push(("limit".to_string(), to.saturating_sub(from).saturating_add(1).to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_with_filters_and_order() {
        let query = TableQuery::new("projects")
            .filter(Filter::Eq("status".to_string(), json!("completed")))
            .filter(Filter::Gte("rating".to_string(), json!(3)))
            .order(OrderBy::asc("start_date"))
            .order(OrderBy::asc("end_date"));

        let pairs = query.query_pairs();

        assert_eq!(pairs[0], ("select".to_string(), "*".to_string()));
        assert_eq!(pairs[1], ("status".to_string(), "eq.completed".to_string()));
        assert_eq!(pairs[2], ("rating".to_string(), "gte.3".to_string()));
        assert_eq!(
            pairs[3],
            ("order".to_string(), "start_date.asc,end_date.asc".to_string())
        );
    }

    #[test]
    fn test_null_filters() {
        let query = TableQuery::new("project_schedules")
            .filter(Filter::NotNull("end_time".to_string()))
            .filter(Filter::IsNull("project_id".to_string()));

        let pairs = query.query_pairs();

        assert_eq!(pairs[1], ("end_time".to_string(), "not.is.null".to_string()));
        assert_eq!(pairs[2], ("project_id".to_string(), "is.null".to_string()));
    }

    #[test]
    fn test_or_group_renders_inline_conditions() {
        let query = TableQuery::new("blog_posts").filter(Filter::Or(vec![
            Filter::Ilike("title".to_string(), "%rust%".to_string()),
            Filter::Ilike("slug".to_string(), "%rust%".to_string()),
        ]));

        let pairs = query.query_pairs();

        assert_eq!(
            pairs[1],
            (
                "or".to_string(),
                "(title.ilike.%rust%,slug.ilike.%rust%)".to_string()
            )
        );
    }

    #[test]
    fn test_contains_and_in_filters() {
        let query = TableQuery::new("blog_posts")
            .filter(Filter::Contains("tags".to_string(), vec!["rust".to_string()]))
            .filter(Filter::In(
                "technology_id".to_string(),
                vec![json!("a"), json!("b")],
            ));

        let pairs = query.query_pairs();

        assert_eq!(pairs[1], ("tags".to_string(), "cs.{rust}".to_string()));
        assert_eq!(
            pairs[2],
            ("technology_id".to_string(), "in.(a,b)".to_string())
        );
    }

    #[test]
    fn test_window_renders_offset_and_limit() {
        let query = TableQuery::new("project_reviews").window(10, 19);

        let pairs = query.query_pairs();

        assert!(pairs.contains(&("offset".to_string(), "10".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "10".to_string())));
    }

    #[test]
    fn test_nulls_last_ordering() {
        let query = TableQuery::new("project_reviews")
            .order(OrderBy::desc_nulls_last("rating"))
            .order(OrderBy::desc("created_at"));

        let pairs = query.query_pairs();

        assert_eq!(
            pairs[1],
            (
                "order".to_string(),
                "rating.desc.nullslast,created_at.desc".to_string()
            )
        );
    }
}

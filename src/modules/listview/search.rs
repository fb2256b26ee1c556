use serde::Serialize;
use serde_json::Value;

/// Which fields a text search looks at, and how it compares.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub fields: Vec<String>,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: vec![
                "name".to_string(),
                "title".to_string(),
                "description".to_string(),
            ],
            case_sensitive: false,
        }
    }
}

impl SearchOptions {
    pub fn fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }
}

/// Returns the items where at least one of the named fields contains the
/// query as a substring. A blank query keeps the collection unchanged.
pub fn apply_search<T>(items: &[T], query: &str, options: &SearchOptions) -> Vec<T>
where
    T: Serialize + Clone,
{
    let query = query.trim();
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = if options.case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };

    items
        .iter()
        .filter(|item| {
            let value = match serde_json::to_value(item) {
                Ok(value) => value,
                Err(_) => return false,
            };
            options.fields.iter().any(|field| {
                field_text(&value, field).is_some_and(|text| {
                    if options.case_sensitive {
                        text.contains(&needle)
                    } else {
                        text.to_lowercase().contains(&needle)
                    }
                })
            })
        })
        .cloned()
        .collect()
}

/// Natural string form of one field of a serialized item. Missing and null
/// fields yield `None` so they never match anything.
pub(crate) fn field_text(item: &Value, field: &str) -> Option<String> {
    scalar_text(item.get(field)?)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(elements) => Some(
            elements
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => None,
    }
}

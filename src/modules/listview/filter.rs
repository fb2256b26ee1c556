use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::search::field_text;

/// Current value of one filter control.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Flag(bool),
    TextList(Vec<String>),
    NumberList(Vec<f64>),
}

impl FilterValue {
    /// A blank text value behaves like an unset filter.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(text) => !text.trim().is_empty(),
            _ => true,
        }
    }
}

/// How one filter compares an item's field against the filter value.
pub enum FilterMode<T> {
    /// Strict equality.
    Equals,
    /// Membership for list values, case-insensitive substring for text,
    /// equality otherwise.
    Includes,
    /// Inclusive numeric `[min, max]` window.
    Range,
    /// Caller-supplied predicate over the whole item.
    Custom(Arc<dyn Fn(&T, &FilterValue) -> bool + Send + Sync>),
}

impl<T> Clone for FilterMode<T> {
    fn clone(&self) -> Self {
        match self {
            FilterMode::Equals => FilterMode::Equals,
            FilterMode::Includes => FilterMode::Includes,
            FilterMode::Range => FilterMode::Range,
            FilterMode::Custom(predicate) => FilterMode::Custom(predicate.clone()),
        }
    }
}

/// Target field plus comparison mode for one filter key.
#[derive(Clone)]
pub struct FilterSpec<T> {
    pub field: String,
    pub mode: FilterMode<T>,
}

impl<T> FilterSpec<T> {
    pub fn equals(field: &str) -> Self {
        Self {
            field: field.to_string(),
            mode: FilterMode::Equals,
        }
    }

    pub fn includes(field: &str) -> Self {
        Self {
            field: field.to_string(),
            mode: FilterMode::Includes,
        }
    }

    pub fn range(field: &str) -> Self {
        Self {
            field: field.to_string(),
            mode: FilterMode::Range,
        }
    }

    pub fn custom(
        field: &str,
        predicate: impl Fn(&T, &FilterValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.to_string(),
            mode: FilterMode::Custom(Arc::new(predicate)),
        }
    }
}

/// A declarative set of filters: every active filter must match for an item
/// to survive (logical AND). Inactive filters exclude nothing.
#[derive(Clone, Default)]
pub struct FilterSet<T> {
    specs: HashMap<String, FilterSpec<T>>,
    values: HashMap<String, FilterValue>,
}

impl<T> FilterSet<T> {
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
            values: HashMap::new(),
        }
    }

    pub fn define(mut self, key: &str, spec: FilterSpec<T>) -> Self {
        self.specs.insert(key.to_string(), spec);
        self
    }

    pub fn set(&mut self, key: &str, value: FilterValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn value(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    pub fn active_count(&self) -> usize {
        self.values
            .iter()
            .filter(|(key, value)| value.is_active() && self.specs.contains_key(*key))
            .count()
    }

    pub fn apply(&self, items: &[T]) -> Vec<T>
    where
        T: Serialize + Clone,
    {
        let active: Vec<(&FilterSpec<T>, &FilterValue)> = self
            .values
            .iter()
            .filter(|(_, value)| value.is_active())
            .filter_map(|(key, value)| Some((self.specs.get(key)?, value)))
            .collect();
        if active.is_empty() {
            return items.to_vec();
        }

        items
            .iter()
            .filter(|item| {
                let serialized = serde_json::to_value(item).unwrap_or(Value::Null);
                active
                    .iter()
                    .all(|(spec, value)| matches_filter(*item, &serialized, *spec, value))
            })
            .cloned()
            .collect()
    }
}

fn matches_filter<T>(
    item: &T,
    serialized: &Value,
    spec: &FilterSpec<T>,
    value: &FilterValue,
) -> bool {
    match &spec.mode {
        FilterMode::Custom(predicate) => predicate(item, value),
        FilterMode::Equals => equals_match(serialized.get(&spec.field), value),
        FilterMode::Includes => includes_match(serialized, &spec.field, value),
        FilterMode::Range => range_match(serialized.get(&spec.field), value),
    }
}

fn equals_match(field: Option<&Value>, value: &FilterValue) -> bool {
    let Some(field) = field else { return false };
    match value {
        FilterValue::Text(text) => field.as_str() == Some(text.as_str()),
        FilterValue::Number(number) => field.as_f64() == Some(*number),
        FilterValue::Flag(flag) => field.as_bool() == Some(*flag),
        FilterValue::TextList(_) | FilterValue::NumberList(_) => false,
    }
}

fn includes_match(serialized: &Value, field: &str, value: &FilterValue) -> bool {
    match value {
        FilterValue::TextList(allowed) => field_text(serialized, field)
            .is_some_and(|text| allowed.iter().any(|candidate| candidate == &text)),
        FilterValue::NumberList(allowed) => serialized
            .get(field)
            .and_then(Value::as_f64)
            .is_some_and(|number| allowed.contains(&number)),
        FilterValue::Text(needle) => match serialized.get(field) {
            Some(Value::String(haystack)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            other => equals_match(other, value),
        },
        _ => equals_match(serialized.get(field), value),
    }
}

fn range_match(field: Option<&Value>, value: &FilterValue) -> bool {
    let FilterValue::NumberList(bounds) = value else {
        return false;
    };
    let (Some(min), Some(max)) = (bounds.first(), bounds.get(1)) else {
        return false;
    };
    field
        .and_then(Value::as_f64)
        .is_some_and(|number| *min <= number && number <= *max)
}

use uuid::Uuid;

/// One primitive component of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Text(String),
    Int(i64),
    Flag(bool),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Flag(value)
    }
}

impl From<Uuid> for KeyPart {
    fn from(value: Uuid) -> Self {
        KeyPart::Text(value.to_string())
    }
}

/// An ordered tuple of primitive values identifying one cached read.
/// Equality is structural, value by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Starts a key at an entity scope, e.g. `QueryKey::scope("projects")`.
    pub fn scope(name: &str) -> Self {
        QueryKey(vec![KeyPart::from(name)])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

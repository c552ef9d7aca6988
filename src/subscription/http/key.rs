use std::fmt;

use serde::Serialize;

/// Structured cache key: an operation name plus its serialized parameters.
///
/// Invalidation by name reaches every parameter variant of an operation, so
/// invalidating `scraping-history` refreshes every page of the history.
///
/// # Example
///
/// ```rust
/// use mediawatch::subscription::http::QueryKey;
///
/// let key = QueryKey::new("articles").with_params(&serde_json::json!({"days": 7}));
/// assert_eq!(key.name(), "articles");
/// assert_eq!(key.to_string(), r#"articles {"days":7}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    name: String,
    params: Option<String>,
}

impl QueryKey {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    /// Attaches parameters. Parameters that serialize to `null` (e.g. `None`)
    /// leave the key unparameterized.
    #[must_use]
    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        self.params = serde_json::to_value(params)
            .ok()
            .filter(|value| !value.is_null())
            .map(|value| value.to_string());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    /// Returns `true` if this key belongs to the operation `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) => write!(f, "{} {params}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for QueryKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QueryKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Page {
        limit: Option<u32>,
        offset: u32,
    }

    #[test]
    fn test_plain_key() {
        let key = QueryKey::from("stats");
        assert_eq!(key.name(), "stats");
        assert_eq!(key.params(), None);
        assert_eq!(key.to_string(), "stats");
    }

    #[test]
    fn test_params_distinguish_keys() {
        let first = QueryKey::new("scraping-history").with_params(&Page { limit: Some(10), offset: 0 });
        let second = QueryKey::new("scraping-history").with_params(&Page { limit: Some(10), offset: 10 });
        assert_ne!(first, second);
        assert!(first.matches("scraping-history"));
        assert!(second.matches("scraping-history"));
        assert!(!first.matches("scraping"));
    }

    #[test]
    fn test_null_params_are_ignored() {
        assert_eq!(QueryKey::new("medias").with_params(&None::<u32>), QueryKey::new("medias"));
    }

    #[test]
    fn test_params_serialization_is_stable() {
        let a = QueryKey::new("articles").with_params(&serde_json::json!({"limit": 5, "days": 7}));
        let b = QueryKey::new("articles").with_params(&serde_json::json!({"days": 7, "limit": 5}));
        assert_eq!(a, b);
    }
}

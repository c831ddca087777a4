//! Transport-neutral view of one inbound request.

use std::collections::BTreeMap;

/// Multi-valued request parameters (query string and form fields).
///
/// Values keep arrival order; lookups read the first value of a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(BTreeMap<String, Vec<String>>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// First value supplied for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

impl<K, V> Extend<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.push(name, value);
        }
    }
}

/// What the ingestion handler gets to look at for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    /// Raw, non-form body text.
    pub body: Option<String>,
    /// Query-string and form-field parameters.
    pub parameters: Parameters,
}

impl InboundRequest {
    /// A request carrying a raw body and no parameters.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            parameters: Parameters::new(),
        }
    }

    /// A request carrying only parameters.
    pub fn with_parameters<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            body: None,
            parameters: pairs.into_iter().collect(),
        }
    }

    /// The body, if it holds any text at all.
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_wins() {
        let params: Parameters = [("name", "a"), ("name", "b"), ("email", "x@y.z")]
            .into_iter()
            .collect();
        assert_eq!(params.first("name"), Some("a"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.first("phone"), None);
    }

    #[test]
    fn test_empty_body_is_no_body() {
        assert_eq!(InboundRequest::with_body("").raw_body(), None);
        assert_eq!(InboundRequest::with_body("{}").raw_body(), Some("{}"));
    }
}

//! Form payloads
//!
//! Every request the client sends is an `application/x-www-form-urlencoded`
//! body. `FormPayload` keeps the pairs in insertion order and allows repeated
//! keys (the grant flows send one `scope` pair per scope).

use serde::Serialize;
use trusted_oauth_domain::{ClientError, Result};
use url::form_urlencoded;

/// Ordered list of form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pairs: Vec<(String, String)>,
}

impl FormPayload {
    /// Empty payload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from the present fields of a presence-encoded DTO
    ///
    /// `None` fields (skipped by `skip_serializing_if`) are omitted; `Some("")`
    /// is kept as an empty value.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the value is not a flat struct of
    /// scalar fields.
    pub fn from_fields<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| ClientError::Config(format!("cannot encode form payload: {e}")))?;
        let pairs = form_urlencoded::parse(encoded.as_bytes()).into_owned().collect();
        Ok(Self { pairs })
    }

    /// Append a field
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Append one pair per value under the same key
    #[must_use]
    pub fn with_all<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.push(key, value);
        }
        self
    }

    /// Append a field in place
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Append all fields of another payload
    pub fn extend(&mut self, other: Self) {
        self.pairs.extend(other.pairs);
    }

    /// First value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Field names, in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encoded body
    #[must_use]
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.pairs).finish()
    }
}

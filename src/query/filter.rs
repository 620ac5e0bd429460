use std::collections::BTreeMap;

use serde::Serialize;

use crate::guard::{END_DATE, START_DATE};

use super::error::QueryError;
use super::types::FilterValue;

/// Field names whose values are timestamps and stay textual until normalized.
pub const DATE_FIELDS: [&str; 2] = [START_DATE, END_DATE];

/// Filter fields supplied through the `filter` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Filter {
    fields: BTreeMap<String, FilterValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a url-encoded `key=value&key=value` filter string.
    pub fn from_raw(raw: &str) -> Result<Self, QueryError> {
        let mut filter = Self::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let key = key.trim();
            if key.is_empty() {
                return Err(QueryError::InvalidFilter(format!("empty field name in '{}'", raw)));
            }
            let value = Self::coerce(key, value.trim());
            filter.put(key, value);
        }
        Ok(filter)
    }

    fn coerce(key: &str, value: &str) -> FilterValue {
        if DATE_FIELDS.iter().any(|f| *f == key) {
            return FilterValue::Text(value.to_string());
        }
        match value.parse::<i64>() {
            Ok(n) => FilterValue::Integer(n),
            Err(_) => FilterValue::Text(value.to_string()),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields.get(field)
    }

    pub fn put(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

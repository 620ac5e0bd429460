use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single filter value. Date fields arrive as `Text` and become `Integer`
/// epoch seconds once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FilterValue::Integer(n) => Some(*n),
            FilterValue::Text(_) => None,
        }
    }

    /// Equality against a record field rendered as JSON.
    pub fn matches_json(&self, value: &Value) -> bool {
        match (self, value) {
            (FilterValue::Integer(n), Value::Number(num)) => num.as_i64() == Some(*n),
            (FilterValue::Text(s), Value::String(v)) => s == v,
            (FilterValue::Text(s), Value::Bool(b)) => s.eq_ignore_ascii_case(&b.to_string()),
            (FilterValue::Text(s), Value::Number(num)) => s == &num.to_string(),
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Integer(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub field: String,
    pub direction: SortDirection,
}
